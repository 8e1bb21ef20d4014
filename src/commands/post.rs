use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use jiff::Timestamp;

use crate::db::{Database, PostPage, UPLOADS_DIR};
use crate::helpers::find_similar_id;
use crate::id::generate_id;
use crate::models::Post;
use crate::session::Session;
use crate::watch::{Subscription, subscribe_to_post};

/// Fetch a post or fail with a did-you-mean hint.
pub fn fetch(post_id: &str, db: &Database) -> Result<Post> {
    if let Some(post) = db.get_post(post_id) {
        return Ok(post.clone());
    }

    let all_ids = db.all_post_ids();
    let candidates: Vec<&str> = all_ids.iter().map(String::as_str).collect();
    if let Some(suggestion) = find_similar_id(post_id, &candidates) {
        Err(anyhow!("Post not found: {post_id}\nDid you mean: {suggestion}"))
    } else {
        Err(anyhow!("Post not found: {post_id}"))
    }
}

/// Author-or-admin gate shared by post and comment mutations.
pub(crate) fn ensure_can_modify(session: &Session, author_id: &str, what: &str) -> Result<()> {
    if session.user_id == author_id || session.role.can_moderate() {
        Ok(())
    } else {
        Err(anyhow!("Only the {what} author or an admin can do that."))
    }
}

pub fn create(
    title: String,
    content: String,
    images: Vec<String>,
    session: &Session,
    db: &mut Database,
) -> Result<Post> {
    let now = Timestamp::now();
    let mut image_urls = Vec::new();
    for image in &images {
        image_urls.push(store_upload(Path::new(image), now, db)?);
    }

    let post = Post::new(
        generate_id(),
        session.user_id.clone(),
        title,
        content,
        image_urls,
        now,
    );

    db.create_post(post.clone())?;
    Ok(post)
}

/// Copy an attachment into the uploads area under a timestamped name,
/// returning the stored relative path.
fn store_upload(source: &Path, now: Timestamp, db: &Database) -> Result<String> {
    let file_name = source
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("Invalid image path: {}", source.display()))?;
    let stored_name = format!("{}-{}", now.as_millisecond(), file_name);
    let target = db.base_path().join(UPLOADS_DIR).join(&stored_name);

    fs::copy(source, &target)
        .with_context(|| format!("Failed to copy image {}", source.display()))?;

    Ok(format!("{UPLOADS_DIR}/{stored_name}"))
}

pub fn list(limit: usize, after: Option<&str>, db: &Database) -> PostPage {
    db.list_posts(limit, after)
}

pub fn show(post_id: &str, db: &Database) -> Result<Post> {
    fetch(post_id, db)
}

pub fn edit(post_id: &str, content: String, session: &Session, db: &mut Database) -> Result<Post> {
    let mut post = fetch(post_id, db)?;
    ensure_can_modify(session, &post.author_id, "post")?;

    post.content = content;
    db.update_post(post.clone())?;
    Ok(post)
}

pub fn delete(post_id: &str, session: &Session, db: &mut Database) -> Result<Post> {
    let post = fetch(post_id, db)?;
    ensure_can_modify(session, &post.author_id, "post")?;

    db.delete_post(post_id)?;
    Ok(post)
}

/// Toggle the session user in the post's like set. Returns the updated post
/// and whether it is now liked.
pub fn like(post_id: &str, session: &Session, db: &mut Database) -> Result<(Post, bool)> {
    let mut post = fetch(post_id, db)?;
    let liked = post.toggle_like(&session.user_id);
    db.update_post(post.clone())?;
    Ok((post, liked))
}

/// Subscribe to a post's document. Fails up front when the post does not
/// exist so the watcher never spins on a missing file.
pub fn watch(post_id: &str, interval_ms: u64, db: &Database) -> Result<Subscription> {
    fetch(post_id, db)?;
    Ok(subscribe_to_post(
        db.post_path(post_id),
        Duration::from_millis(interval_ms),
    ))
}
