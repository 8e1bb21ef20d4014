use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::Comment;

/// A forum post. The comment tree is owned exclusively by the post and is
/// always persisted as a single field replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub created_at: Timestamp,
    #[serde(default)]
    pub likes: Vec<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Post {
    pub fn new(
        id: String,
        author_id: String,
        title: String,
        content: String,
        image_urls: Vec<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            author_id,
            title,
            content,
            image_urls,
            created_at,
            likes: Vec::new(),
            comments: Vec::new(),
        }
    }

    /// Add the user to the like set, or remove them if already present.
    /// Returns whether the post is liked by the user afterwards.
    pub fn toggle_like(&mut self, user_id: &str) -> bool {
        if let Some(pos) = self.likes.iter().position(|id| id == user_id) {
            self.likes.remove(pos);
            false
        } else {
            self.likes.push(user_id.to_string());
            true
        }
    }
}
