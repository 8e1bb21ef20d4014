use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::models::Post;

/// A cancellable subscription to one post document, yielding a snapshot of
/// the post whenever its file changes on disk.
///
/// The first snapshot is delivered immediately with the current state. The
/// subscription ends when it is cancelled, dropped, or the document is
/// deleted.
pub struct Subscription {
    rx: Receiver<Post>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

/// Watch the post document at `path`, polling at `interval`.
pub fn subscribe_to_post(path: PathBuf, interval: Duration) -> Subscription {
    let stop = Arc::new(AtomicBool::new(false));
    let (tx, rx) = channel();

    let watcher_stop = Arc::clone(&stop);
    let handle = thread::spawn(move || {
        let mut last_seen: Option<String> = None;

        while !watcher_stop.load(Ordering::Relaxed) {
            let Ok(content) = fs::read_to_string(&path) else {
                // document deleted (or unreadable): end the stream
                break;
            };

            if last_seen.as_deref() != Some(content.as_str()) {
                // A torn write never shows up here: documents are replaced
                // by rename. A parse failure means a foreign file; skip it.
                if let Ok(post) = serde_json::from_str::<Post>(&content) {
                    if tx.send(post).is_err() {
                        break;
                    }
                    last_seen = Some(content);
                }
            }

            thread::sleep(interval);
        }
    });

    Subscription {
        rx,
        stop,
        handle: Some(handle),
    }
}

impl Subscription {
    /// Wait up to `timeout` for the next snapshot. `None` once the stream
    /// has ended or nothing changed within the timeout.
    pub fn next_snapshot(&self, timeout: Duration) -> Option<Post> {
        match self.rx.recv_timeout(timeout) {
            Ok(post) => Some(post),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Explicit unsubscribe. Equivalent to dropping the handle.
    pub fn cancel(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.shutdown();
    }
}
