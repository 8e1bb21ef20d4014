use serde_json::Value;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// Helper struct to manage test environment
struct TestEnv {
    _temp_dir: TempDir,
    work_dir: PathBuf,
    binary_path: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let work_dir = temp_dir.path().to_path_buf();

        // Get the path to the compiled binary
        let mut binary_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        binary_path.push("target");
        binary_path.push("debug");
        binary_path.push("calma");

        Self {
            _temp_dir: temp_dir,
            work_dir,
            binary_path,
        }
    }

    /// Run a calma command and return the output
    fn run(&self, args: &[&str]) -> Result<String, String> {
        let output = Command::new(&self.binary_path)
            .args(args)
            .current_dir(&self.work_dir)
            .output()
            .expect("Failed to execute calma command");

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            Err(String::from_utf8_lossy(&output.stderr).to_string())
        }
    }

    fn calma_dir_exists(&self) -> bool {
        self.work_dir.join(".calma").exists()
    }

    /// Initialize and register + sign in a default user
    fn init_and_login(&self) {
        self.run(&["init"]).expect("Init failed");
        self.register("Ada", "ada@example.com", "user");
        self.login("ada@example.com");
    }

    fn register(&self, name: &str, email: &str, role: &str) {
        self.run(&[
            "user", "register", name, "--email", email, "--password", "Abcdefg1", "--role", role,
        ])
        .expect("Register failed");
    }

    fn login(&self, email: &str) {
        self.run(&["login", email, "--password", "Abcdefg1"])
            .expect("Login failed");
    }

    /// Create a post and return its id (from post list --json)
    fn create_post(&self, title: &str) -> String {
        self.run(&["post", "create", title, "--content", "post body"])
            .expect("Post create failed");
        let page: Value =
            serde_json::from_str(&self.run(&["post", "list", "--json"]).unwrap()).unwrap();
        page["posts"][0]["id"].as_str().unwrap().to_string()
    }

    fn show_post(&self, post_id: &str) -> Value {
        serde_json::from_str(&self.run(&["post", "show", post_id, "--json"]).unwrap()).unwrap()
    }
}

#[test]
fn test_init_creates_data_directory() {
    let env = TestEnv::new();

    assert!(!env.calma_dir_exists());

    let output = env.run(&["init"]).expect("Init command failed");
    assert!(output.contains("Initialized calma"));
    assert!(env.calma_dir_exists());

    for collection in ["posts", "users", "modules", "appointments", "uploads"] {
        assert!(
            env.work_dir.join(".calma").join(collection).is_dir(),
            "{collection} directory should exist after init"
        );
    }

    // init is idempotent
    let output = env.run(&["init"]).expect("Second init failed");
    assert!(output.contains("already initialized"));
}

#[test]
fn test_commands_fail_before_init() {
    let env = TestEnv::new();
    let err = env.run(&["post", "list"]).unwrap_err();
    assert!(err.contains("not initialized"));
}

#[test]
fn test_register_login_whoami_logout() {
    let env = TestEnv::new();
    env.run(&["init"]).unwrap();
    env.register("Ada", "ada@example.com", "expert");

    // whoami before login fails
    assert!(env.run(&["whoami"]).is_err());

    env.login("ada@example.com");
    let me: Value = serde_json::from_str(&env.run(&["whoami", "--json"]).unwrap()).unwrap();
    assert_eq!(me["full_name"], "Ada");
    assert_eq!(me["role"], "expert");
    // the password hash never leaves the user document
    assert!(me.get("password_hash").is_some());
    assert_ne!(me["password_hash"], "Abcdefg1");

    env.run(&["logout"]).unwrap();
    assert!(env.run(&["whoami"]).is_err());
}

#[test]
fn test_login_rejects_wrong_password() {
    let env = TestEnv::new();
    env.run(&["init"]).unwrap();
    env.register("Ada", "ada@example.com", "user");

    let err = env
        .run(&["login", "ada@example.com", "--password", "WrongPass1"])
        .unwrap_err();
    assert!(err.contains("Incorrect password"));
}

#[test]
fn test_post_create_requires_login() {
    let env = TestEnv::new();
    env.run(&["init"]).unwrap();
    let err = env
        .run(&["post", "create", "hello", "--content", "body"])
        .unwrap_err();
    assert!(err.contains("Not signed in"));
}

#[test]
fn test_post_lifecycle() {
    let env = TestEnv::new();
    env.init_and_login();

    let post_id = env.create_post("First post");

    let post = env.show_post(&post_id);
    assert_eq!(post["title"], "First post");
    assert_eq!(post["content"], "post body");

    env.run(&["post", "edit", &post_id, "--content", "edited body"])
        .unwrap();
    assert_eq!(env.show_post(&post_id)["content"], "edited body");

    let output = env.run(&["post", "like", &post_id]).unwrap();
    assert!(output.contains("Liked"));
    let output = env.run(&["post", "like", &post_id]).unwrap();
    assert!(output.contains("Unliked"));

    env.run(&["post", "delete", &post_id]).unwrap();
    assert!(env.run(&["post", "show", &post_id]).is_err());
}

#[test]
fn test_post_delete_gated_to_author_or_admin() {
    let env = TestEnv::new();
    env.init_and_login();
    let post_id = env.create_post("Ada's post");

    env.register("Bob", "bob@example.com", "user");
    env.login("bob@example.com");
    let err = env.run(&["post", "delete", &post_id]).unwrap_err();
    assert!(err.contains("author or an admin"));

    env.register("Root", "root@example.com", "admin");
    env.login("root@example.com");
    env.run(&["post", "delete", &post_id]).unwrap();
}

#[test]
fn test_post_list_pagination() {
    let env = TestEnv::new();
    env.init_and_login();
    for title in ["one", "two", "three"] {
        env.run(&["post", "create", title, "--content", "body"])
            .unwrap();
    }

    let page: Value = serde_json::from_str(
        &env.run(&["post", "list", "--limit", "2", "--json"]).unwrap(),
    )
    .unwrap();
    assert_eq!(page["posts"].as_array().unwrap().len(), 2);
    assert_eq!(page["has_more"], true);

    let cursor = page["posts"][1]["id"].as_str().unwrap();
    let next: Value = serde_json::from_str(
        &env.run(&["post", "list", "--limit", "2", "--after", cursor, "--json"])
            .unwrap(),
    )
    .unwrap();
    assert_eq!(next["posts"].as_array().unwrap().len(), 1);
    assert_eq!(next["has_more"], false);
}

#[test]
fn test_nested_comment_tree_through_cli() {
    let env = TestEnv::new();
    env.init_and_login();
    let post_id = env.create_post("Discussion");

    env.run(&["comment", "add", &post_id, "top level"]).unwrap();
    let top_id = env.show_post(&post_id)["comments"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(top_id.starts_with("comment_"));

    env.run(&["comment", "add", &post_id, "a reply", "--reply-to", &top_id])
        .unwrap();
    let post = env.show_post(&post_id);
    let reply = &post["comments"][0]["children"][0];
    assert_eq!(reply["content"], "a reply");
    let reply_id = reply["id"].as_str().unwrap().to_string();

    // edit the nested reply
    env.run(&["comment", "edit", &post_id, &reply_id, "edited reply"])
        .unwrap();
    let post = env.show_post(&post_id);
    assert_eq!(post["comments"][0]["children"][0]["content"], "edited reply");

    // deleting the top comment removes the reply subtree too
    env.run(&["comment", "delete", &post_id, &top_id]).unwrap();
    let post = env.show_post(&post_id);
    assert!(post["comments"].as_array().unwrap().is_empty());
}

#[test]
fn test_reply_to_unknown_comment_fails() {
    let env = TestEnv::new();
    env.init_and_login();
    let post_id = env.create_post("Discussion");

    let err = env
        .run(&["comment", "add", &post_id, "orphan", "--reply-to", "nonexistent"])
        .unwrap_err();
    assert!(err.contains("Comment not found"));
}

#[test]
fn test_module_creation_gated_and_quiz_graded() {
    let env = TestEnv::new();
    env.run(&["init"]).unwrap();
    env.register("Sam", "sam@example.com", "user");
    env.login("sam@example.com");

    let err = env
        .run(&[
            "module", "create", "Sleep", "--description", "d", "--content", "c",
        ])
        .unwrap_err();
    assert!(err.contains("experts and admins"));

    env.register("Dr. Lin", "lin@example.com", "expert");
    env.login("lin@example.com");
    env.run(&[
        "module",
        "create",
        "Sleep",
        "--description",
        "basics",
        "--content",
        "long form",
        "--question",
        "How many hours?|6,8,12|8",
        "--question",
        "Screens before bed?|yes,no|no",
    ])
    .unwrap();

    let modules: Value =
        serde_json::from_str(&env.run(&["module", "list", "--json"]).unwrap()).unwrap();
    let module_id = modules[0]["id"].as_str().unwrap();

    let output = env
        .run(&["module", "quiz", module_id, "--answers", "8,yes"])
        .unwrap();
    assert!(output.contains("1/2"));
}

#[test]
fn test_appointment_booking_and_chat() {
    let env = TestEnv::new();
    env.run(&["init"]).unwrap();
    env.register("Dr. Lin", "lin@example.com", "expert");
    env.register("Sam", "sam@example.com", "user");
    env.login("lin@example.com");
    let expert: Value = serde_json::from_str(&env.run(&["whoami", "--json"]).unwrap()).unwrap();
    let expert_id = expert["id"].as_str().unwrap().to_string();

    env.login("sam@example.com");
    env.run(&[
        "appointment", "book", &expert_id, "--start", "2026-09-01T10:00:00Z",
    ])
    .unwrap();

    let appointments: Value =
        serde_json::from_str(&env.run(&["appointment", "list", "--json"]).unwrap()).unwrap();
    let appointment_id = appointments[0]["id"].as_str().unwrap().to_string();
    assert_eq!(appointments[0]["status"], "scheduled");

    let output = env
        .run(&["appointment", "chat", &appointment_id, "hello doctor"])
        .unwrap();
    assert!(output.contains("Sam: hello doctor"));

    // the expert sees the same appointment and can chat back
    env.login("lin@example.com");
    let output = env
        .run(&["appointment", "chat", &appointment_id, "hello Sam"])
        .unwrap();
    assert!(output.contains("Dr. Lin: hello Sam"));

    env.run(&["appointment", "finish", &appointment_id]).unwrap();
    let appointments: Value =
        serde_json::from_str(&env.run(&["appointment", "list", "--json"]).unwrap()).unwrap();
    assert_eq!(appointments[0]["status"], "finished");
}

#[test]
fn test_post_watch_prints_current_snapshot() {
    let env = TestEnv::new();
    env.init_and_login();
    let post_id = env.create_post("Watched");

    let output = env
        .run(&["post", "watch", &post_id, "--count", "1", "--interval-ms", "10"])
        .unwrap();
    assert!(output.contains("snapshot 1"));
    assert!(output.contains("Watched"));
    assert!(output.contains("Watch ended"));
}
