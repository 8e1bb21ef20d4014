use anyhow::{Result, anyhow};
use jiff::Timestamp;

use crate::commands::post::{ensure_can_modify, fetch};
use crate::db::Database;
use crate::id::comment_id;
use crate::models::{Comment, Post, contains_id, find_comment, insert_reply, remove_node,
    update_content};
use crate::session::Session;

/// Add a comment to a post, as a reply to `reply_to` when given. The updated
/// tree replaces the post's `comments` field wholesale.
pub fn add(
    post_id: &str,
    text: String,
    reply_to: Option<&str>,
    session: &Session,
    db: &mut Database,
) -> Result<(Post, Comment)> {
    let mut post = fetch(post_id, db)?;

    // The engine treats a missing parent as a silent no-op; check here so a
    // stale or mistyped id surfaces to the user instead of dropping the
    // comment.
    if let Some(parent_id) = reply_to {
        if find_comment(&post.comments, parent_id).is_none() {
            return Err(anyhow!("Comment not found on post {post_id}: {parent_id}"));
        }
    }

    let now = Timestamp::now();
    let mut id = comment_id(now);
    // Id uniqueness within the tree is the caller's contract with the
    // engine; a collision is astronomically unlikely but cheap to rule out.
    while contains_id(&post.comments, &id) {
        id = comment_id(now);
    }

    let comment = Comment::new(id, session.user_id.clone(), text, now);
    post.comments = insert_reply(std::mem::take(&mut post.comments), reply_to, comment.clone());
    db.update_post(post.clone())?;

    Ok((post, comment))
}

pub fn edit(
    post_id: &str,
    comment_id: &str,
    text: &str,
    session: &Session,
    db: &mut Database,
) -> Result<Post> {
    let mut post = fetch(post_id, db)?;

    let comment = find_comment(&post.comments, comment_id)
        .ok_or_else(|| anyhow!("Comment not found on post {post_id}: {comment_id}"))?;
    ensure_can_modify(session, &comment.author_id, "comment")?;

    post.comments = update_content(std::mem::take(&mut post.comments), comment_id, text);
    db.update_post(post.clone())?;
    Ok(post)
}

pub fn delete(
    post_id: &str,
    comment_id: &str,
    session: &Session,
    db: &mut Database,
) -> Result<Post> {
    let mut post = fetch(post_id, db)?;

    let comment = find_comment(&post.comments, comment_id)
        .ok_or_else(|| anyhow!("Comment not found on post {post_id}: {comment_id}"))?;
    ensure_can_modify(session, &comment.author_id, "comment")?;

    post.comments = remove_node(std::mem::take(&mut post.comments), comment_id);
    db.update_post(post.clone())?;
    Ok(post)
}
