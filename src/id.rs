use jiff::Timestamp;
use nanoid::nanoid;

/// Short random id for documents (posts, users, modules, appointments).
pub fn generate_id() -> String {
    nanoid!(8)
}

/// Comment ids combine the creation time in milliseconds with a random
/// suffix, unique within one post's tree with overwhelming probability.
pub fn comment_id(created_at: Timestamp) -> String {
    format!("comment_{}_{}", created_at.as_millisecond(), nanoid!(9))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_id_is_random() {
        assert_ne!(generate_id(), generate_id());
        assert_eq!(generate_id().len(), 8);
    }

    #[test]
    fn comment_id_embeds_timestamp() {
        let at = Timestamp::from_millisecond(1_234).unwrap();
        let id = comment_id(at);
        assert!(id.starts_with("comment_1234_"));
        assert_ne!(comment_id(at), comment_id(at));
    }
}
