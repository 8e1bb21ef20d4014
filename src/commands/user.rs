use anyhow::{Result, anyhow};
use jiff::Timestamp;

use crate::db::Database;
use crate::id::generate_id;
use crate::models::{Role, User, validate_password};

pub fn register(
    name: String,
    email: String,
    password: String,
    role: &str,
    db: &mut Database,
) -> Result<User> {
    let role: Role = role
        .parse()
        .map_err(|_| anyhow!("Unknown role: {role}. Expected user, expert, or admin."))?;
    if role == Role::Guest {
        return Err(anyhow!("Guests are not registered accounts."));
    }

    validate_password(&password).map_err(|message| anyhow!(message))?;

    if db.find_user_by_email(&email).is_some() {
        return Err(anyhow!("An account already exists for {email}"));
    }

    let password_hash = bcrypt::hash(&password, bcrypt::DEFAULT_COST)
        .map_err(|err| anyhow!("Failed to hash password: {err}"))?;

    let user = User::new(
        generate_id(),
        name,
        email,
        password_hash,
        role,
        Timestamp::now(),
    );

    db.create_user(user.clone())?;
    Ok(user)
}

pub fn list(db: &Database) -> Vec<User> {
    db.list_users().into_iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn empty_db() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let calma = dir.path().join(".calma");
        std::fs::create_dir_all(&calma).unwrap();
        let db = Database::open(&calma).unwrap();
        db.init_schema().unwrap();
        (dir, db)
    }

    #[rstest]
    fn register_hashes_password_and_stores_role() {
        let (_dir, mut db) = empty_db();
        let user = register(
            "Ada".to_string(),
            "ada@example.com".to_string(),
            "Abcdefg1".to_string(),
            "expert",
            &mut db,
        )
        .unwrap();

        assert_eq!(user.role, Role::Expert);
        let hash = user.password_hash.unwrap();
        assert_ne!(hash, "Abcdefg1");
        assert!(bcrypt::verify("Abcdefg1", &hash).unwrap());
    }

    #[rstest]
    fn register_rejects_weak_password_and_bad_role() {
        let (_dir, mut db) = empty_db();
        assert!(
            register(
                "Ada".to_string(),
                "ada@example.com".to_string(),
                "short".to_string(),
                "user",
                &mut db,
            )
            .is_err()
        );
        assert!(
            register(
                "Ada".to_string(),
                "ada@example.com".to_string(),
                "Abcdefg1".to_string(),
                "wizard",
                &mut db,
            )
            .is_err()
        );
        assert!(
            register(
                "Ada".to_string(),
                "ada@example.com".to_string(),
                "Abcdefg1".to_string(),
                "guest",
                &mut db,
            )
            .is_err()
        );
    }

    #[rstest]
    fn register_rejects_duplicate_email() {
        let (_dir, mut db) = empty_db();
        register(
            "Ada".to_string(),
            "ada@example.com".to_string(),
            "Abcdefg1".to_string(),
            "user",
            &mut db,
        )
        .unwrap();
        assert!(
            register(
                "Imposter".to_string(),
                "ada@example.com".to_string(),
                "Abcdefg1".to_string(),
                "user",
                &mut db,
            )
            .is_err()
        );
    }
}
