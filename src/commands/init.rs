use anyhow::{Context, Result};
use std::fs;

use crate::CALMA_DIR;
use crate::db::Database;

pub fn run() -> Result<()> {
    let calma_dir = std::path::PathBuf::from(CALMA_DIR);

    if calma_dir.exists() {
        println!("Calma already initialized in {}", calma_dir.display());
        return Ok(());
    }

    fs::create_dir_all(&calma_dir).context("Failed to create .calma directory")?;

    let db = Database::open(&calma_dir)?;
    db.init_schema()?;

    println!("Initialized calma in {}", calma_dir.display());
    Ok(())
}
