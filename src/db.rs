use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use fs2::FileExt;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::models::{Appointment, Module, Post, User};

pub const POSTS_DIR: &str = "posts";
pub const USERS_DIR: &str = "users";
pub const MODULES_DIR: &str = "modules";
pub const APPOINTMENTS_DIR: &str = "appointments";
pub const UPLOADS_DIR: &str = "uploads";

const COLLECTIONS: [&str; 5] = [POSTS_DIR, USERS_DIR, MODULES_DIR, APPOINTMENTS_DIR, UPLOADS_DIR];

/// Atomically write content to a file using a temporary file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let temp = path.with_extension("json.tmp");
    let mut file = File::create(&temp)
        .with_context(|| format!("Failed to create temporary file: {}", temp.display()))?;
    file.lock_exclusive()
        .context("Failed to acquire file lock")?;
    file.write_all(content)
        .context("Failed to write file content")?;
    file.sync_all().context("Failed to sync file")?;
    file.unlock().context("Failed to unlock file")?;
    fs::rename(&temp, path).with_context(|| format!("Failed to rename to {}", path.display()))?;
    Ok(())
}

/// One page of posts, newest first. `has_more` signals that another page
/// exists after `posts.last()`.
#[derive(Debug, Serialize)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub has_more: bool,
}

/// Document store backed by one JSON file per entity under the `.calma/`
/// directory. All documents are loaded into memory on open; writes go to
/// disk first and then update the in-memory map.
pub struct Database {
    path: PathBuf,
    posts: HashMap<String, Post>,
    users: HashMap<String, User>,
    modules: HashMap<String, Module>,
    appointments: HashMap<String, Appointment>,
}

impl Database {
    /// Open an existing store from the given directory.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            bail!("Data directory does not exist: {}", path.display());
        }

        let mut db = Self {
            path,
            posts: HashMap::new(),
            users: HashMap::new(),
            modules: HashMap::new(),
            appointments: HashMap::new(),
        };

        db.load()?;
        Ok(db)
    }

    /// Create the per-collection subdirectories. The `.calma/` directory
    /// itself must already exist.
    pub fn init_schema(&self) -> Result<()> {
        for collection in COLLECTIONS {
            fs::create_dir_all(self.path.join(collection))
                .with_context(|| format!("Failed to create {collection} directory"))?;
        }
        Ok(())
    }

    /// The base path for the `.calma/` directory.
    pub fn base_path(&self) -> &Path {
        &self.path
    }

    /// Where the document for a post lives on disk (used by `post watch`).
    pub fn post_path(&self, post_id: &str) -> PathBuf {
        self.path.join(POSTS_DIR).join(format!("{post_id}.json"))
    }

    fn load(&mut self) -> Result<()> {
        self.posts = load_collection(&self.path.join(POSTS_DIR), |p: &Post| p.id.clone())?;
        self.users = load_collection(&self.path.join(USERS_DIR), |u: &User| u.id.clone())?;
        self.modules = load_collection(&self.path.join(MODULES_DIR), |m: &Module| m.id.clone())?;
        self.appointments =
            load_collection(&self.path.join(APPOINTMENTS_DIR), |a: &Appointment| {
                a.id.clone()
            })?;
        Ok(())
    }

    fn write_doc<T: Serialize>(&self, collection: &str, id: &str, doc: &T) -> Result<()> {
        let path = self.path.join(collection).join(format!("{id}.json"));
        let content = serde_json::to_vec_pretty(doc).context("Failed to serialize document")?;
        atomic_write(&path, &content)
    }

    fn remove_doc(&self, collection: &str, id: &str) -> Result<()> {
        let path = self.path.join(collection).join(format!("{id}.json"));
        fs::remove_file(&path).with_context(|| format!("Failed to remove {}", path.display()))
    }

    // Post operations

    pub fn create_post(&mut self, post: Post) -> Result<()> {
        if self.posts.contains_key(&post.id) {
            bail!("Post already exists: {}", post.id);
        }
        self.write_doc(POSTS_DIR, &post.id, &post)?;
        self.posts.insert(post.id.clone(), post);
        Ok(())
    }

    pub fn get_post(&self, id: &str) -> Option<&Post> {
        self.posts.get(id)
    }

    /// Persist the whole post document, comment tree included, as a single
    /// replacement. Last writer wins; there is no version check.
    pub fn update_post(&mut self, post: Post) -> Result<()> {
        if !self.posts.contains_key(&post.id) {
            bail!("Post not found: {}", post.id);
        }
        self.write_doc(POSTS_DIR, &post.id, &post)?;
        self.posts.insert(post.id.clone(), post);
        Ok(())
    }

    pub fn delete_post(&mut self, id: &str) -> Result<()> {
        if self.posts.remove(id).is_none() {
            bail!("Post not found: {id}");
        }
        self.remove_doc(POSTS_DIR, id)
    }

    /// Posts newest-first, paginated with an exclusive `after` cursor (the
    /// id of the last post of the previous page).
    pub fn list_posts(&self, limit: usize, after: Option<&str>) -> PostPage {
        let mut posts: Vec<&Post> = self.posts.values().collect();
        posts.sort_by_key(|p| (std::cmp::Reverse(p.created_at), p.id.clone()));

        let start = match after {
            Some(cursor) => match posts.iter().position(|p| p.id == cursor) {
                Some(pos) => pos + 1,
                None => posts.len(),
            },
            None => 0,
        };

        let remaining = &posts[start.min(posts.len())..];
        PostPage {
            posts: remaining.iter().take(limit).map(|p| (*p).clone()).collect(),
            has_more: remaining.len() > limit,
        }
    }

    pub fn all_post_ids(&self) -> Vec<String> {
        self.posts.keys().cloned().collect()
    }

    // User operations

    pub fn create_user(&mut self, user: User) -> Result<()> {
        if self.users.contains_key(&user.id) {
            bail!("User already exists: {}", user.id);
        }
        if self.find_user_by_email(&user.email).is_some() {
            bail!("An account already exists for {}", user.email);
        }
        self.write_doc(USERS_DIR, &user.id, &user)?;
        self.users.insert(user.id.clone(), user);
        Ok(())
    }

    pub fn get_user(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|u| u.email == email)
    }

    pub fn list_users(&self) -> Vec<&User> {
        let mut users: Vec<&User> = self.users.values().collect();
        users.sort_by_key(|u| (u.created_at, u.id.clone()));
        users
    }

    // Module operations

    pub fn create_module(&mut self, module: Module) -> Result<()> {
        if self.modules.contains_key(&module.id) {
            bail!("Module already exists: {}", module.id);
        }
        self.write_doc(MODULES_DIR, &module.id, &module)?;
        self.modules.insert(module.id.clone(), module);
        Ok(())
    }

    pub fn get_module(&self, id: &str) -> Option<&Module> {
        self.modules.get(id)
    }

    pub fn list_modules(&self) -> Vec<&Module> {
        let mut modules: Vec<&Module> = self.modules.values().collect();
        modules.sort_by_key(|m| (m.created_at, m.id.clone()));
        modules
    }

    pub fn all_module_ids(&self) -> Vec<String> {
        self.modules.keys().cloned().collect()
    }

    // Appointment operations

    pub fn create_appointment(&mut self, appointment: Appointment) -> Result<()> {
        if self.appointments.contains_key(&appointment.id) {
            bail!("Appointment already exists: {}", appointment.id);
        }
        self.write_doc(APPOINTMENTS_DIR, &appointment.id, &appointment)?;
        self.appointments.insert(appointment.id.clone(), appointment);
        Ok(())
    }

    pub fn get_appointment(&self, id: &str) -> Option<&Appointment> {
        self.appointments.get(id)
    }

    pub fn update_appointment(&mut self, appointment: Appointment) -> Result<()> {
        if !self.appointments.contains_key(&appointment.id) {
            bail!("Appointment not found: {}", appointment.id);
        }
        self.write_doc(APPOINTMENTS_DIR, &appointment.id, &appointment)?;
        self.appointments.insert(appointment.id.clone(), appointment);
        Ok(())
    }

    /// Appointments where the user is a participant, soonest first.
    pub fn list_appointments(&self, user_id: &str) -> Vec<&Appointment> {
        let mut appointments: Vec<&Appointment> = self
            .appointments
            .values()
            .filter(|a| a.is_participant(user_id))
            .collect();
        appointments.sort_by_key(|a| (a.start_time, a.id.clone()));
        appointments
    }
}

fn load_collection<T, F>(dir: &Path, key: F) -> Result<HashMap<String, T>>
where
    T: DeserializeOwned,
    F: Fn(&T) -> String,
{
    let mut docs = HashMap::new();

    if !dir.exists() {
        return Ok(docs);
    }

    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;

    for entry in entries {
        let entry = entry.context("Failed to read directory entry")?;
        let path = entry.path();

        if path.extension() != Some(std::ffi::OsStr::new("json")) {
            continue;
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let doc: T = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        docs.insert(key(&doc), doc);
    }

    Ok(docs)
}
