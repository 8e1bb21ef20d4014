use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::db::atomic_write;
use crate::models::Role;

pub const SESSION_FILE: &str = "session.json";

/// The signed-in identity, threaded explicitly through commands instead of
/// living in ambient global state. Acquired by `login`, torn down by
/// `logout`. The role is snapshotted at sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub role: Role,
    pub signed_in_at: Timestamp,
}

impl Session {
    pub fn new(user_id: String, role: Role) -> Self {
        Self {
            user_id,
            role,
            signed_in_at: Timestamp::now(),
        }
    }

    fn path(base: &Path) -> PathBuf {
        base.join(SESSION_FILE)
    }

    /// Load the current session, if anyone is signed in.
    pub fn load(base: &Path) -> Result<Option<Session>> {
        let path = Self::path(base);
        if !path.is_file() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let session = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(session))
    }

    /// Load the current session or fail with a sign-in hint. Guests (no
    /// session) can only browse.
    pub fn require(base: &Path) -> Result<Session> {
        Self::load(base)?.ok_or_else(|| anyhow!("Not signed in. Run 'calma login' first."))
    }

    pub fn save(&self, base: &Path) -> Result<()> {
        let content = serde_json::to_vec_pretty(self).context("Failed to serialize session")?;
        atomic_write(&Self::path(base), &content)
    }

    /// Tear the session down. Idempotent: signing out twice is fine.
    pub fn clear(base: &Path) -> Result<()> {
        let path = Self::path(base);
        if path.is_file() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
        Ok(())
    }
}
