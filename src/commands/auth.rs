use anyhow::{Result, anyhow};

use crate::db::Database;
use crate::models::User;
use crate::session::Session;

pub fn login(email: &str, password: &str, db: &Database) -> Result<(Session, User)> {
    let user = db
        .find_user_by_email(email)
        .ok_or_else(|| anyhow!("No account found for {email}"))?;

    let hash = user
        .password_hash
        .as_deref()
        .ok_or_else(|| anyhow!("Account has no password set: {email}"))?;

    let verified =
        bcrypt::verify(password, hash).map_err(|err| anyhow!("Failed to verify password: {err}"))?;
    if !verified {
        return Err(anyhow!("Incorrect password for {email}"));
    }

    let session = Session::new(user.id.clone(), user.role);
    session.save(db.base_path())?;
    Ok((session, user.clone()))
}

pub fn logout(db: &Database) -> Result<()> {
    Session::clear(db.base_path())
}

/// The signed-in user, re-fetched from the store so a stale session (user
/// document deleted underneath it) surfaces as an error.
pub fn whoami(db: &Database) -> Result<User> {
    let session = Session::require(db.base_path())?;
    db.get_user(&session.user_id)
        .cloned()
        .ok_or_else(|| anyhow!("Signed-in user no longer exists: {}", session.user_id))
}
