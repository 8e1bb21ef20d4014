use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A single node in a post's comment tree. Replies live in `children`, in
/// insertion order; a node's parent is implicit in tree position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author_id: String,
    pub content: String,
    pub created_at: Timestamp,
    #[serde(default)]
    pub children: Vec<Comment>,
}

impl Comment {
    pub fn new(id: String, author_id: String, content: String, created_at: Timestamp) -> Self {
        Self {
            id,
            author_id,
            content,
            created_at,
            children: Vec::new(),
        }
    }
}

/// Attach `reply` to the comment identified by `parent_id`, or to the top
/// level when `parent_id` is `None`.
///
/// The tree is searched pre-order, depth-first; the reply is appended to the
/// children of the first matching node. A missing parent is a silent no-op:
/// the caller may be working from a stale snapshot, and the returned tree is
/// then structurally equal to the input.
///
/// The reply's id must be unique within the tree; the engine trusts the
/// caller on this (see [`contains_id`]).
pub fn insert_reply(
    mut tree: Vec<Comment>,
    parent_id: Option<&str>,
    reply: Comment,
) -> Vec<Comment> {
    match parent_id {
        None => tree.push(reply),
        Some(parent_id) => {
            // attach hands the reply back when no node matched; dropping it
            // realizes the no-op.
            let _unattached = attach(&mut tree, parent_id, reply);
        }
    }
    tree
}

fn attach(nodes: &mut [Comment], parent_id: &str, reply: Comment) -> Option<Comment> {
    let mut pending = Some(reply);
    for node in nodes.iter_mut() {
        let Some(reply) = pending.take() else {
            break;
        };
        if node.id == parent_id {
            node.children.push(reply);
            return None;
        }
        pending = attach(&mut node.children, parent_id, reply);
    }
    pending
}

/// Replace the `content` of the comment identified by `target_id`, leaving
/// `id`, `author_id`, `created_at`, and the subtree untouched.
///
/// Exactly one node is rewritten: the first match in pre-order, depth-first
/// traversal (relevant only for malformed trees with duplicated ids). A
/// missing target is a silent no-op.
pub fn update_content(mut tree: Vec<Comment>, target_id: &str, new_content: &str) -> Vec<Comment> {
    rewrite_first(&mut tree, target_id, new_content);
    tree
}

fn rewrite_first(nodes: &mut [Comment], target_id: &str, new_content: &str) -> bool {
    for node in nodes.iter_mut() {
        if node.id == target_id {
            node.content = new_content.to_string();
            return true;
        }
        if rewrite_first(&mut node.children, target_id, new_content) {
            return true;
        }
    }
    false
}

/// Remove the comment identified by `target_id` together with its entire
/// subtree. Descendants are never promoted.
///
/// The filter is applied at every level of the tree, so every occurrence of
/// a (malformed) duplicated id is removed. A missing target is a silent
/// no-op, which also makes removal idempotent.
pub fn remove_node(tree: Vec<Comment>, target_id: &str) -> Vec<Comment> {
    tree.into_iter()
        .filter(|comment| comment.id != target_id)
        .map(|mut comment| {
            comment.children = remove_node(std::mem::take(&mut comment.children), target_id);
            comment
        })
        .collect()
}

/// Find the comment identified by `target_id` anywhere in the tree, using
/// the same pre-order traversal as the mutation operations.
pub fn find_comment<'a>(tree: &'a [Comment], target_id: &str) -> Option<&'a Comment> {
    for comment in tree {
        if comment.id == target_id {
            return Some(comment);
        }
        if let Some(found) = find_comment(&comment.children, target_id) {
            return Some(found);
        }
    }
    None
}

/// Whether any node in the tree carries `id`. Used to enforce id uniqueness
/// before inserting a freshly generated comment.
pub fn contains_id(tree: &[Comment], id: &str) -> bool {
    find_comment(tree, id).is_some()
}

/// Total number of comments in the tree, at every depth.
pub fn count_comments(tree: &[Comment]) -> usize {
    tree.iter()
        .map(|comment| 1 + count_comments(&comment.children))
        .sum()
}
