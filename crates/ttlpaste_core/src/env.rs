//! Process-global environment mutation helpers.

use std::sync::{Mutex, OnceLock};

/// Return the global lock used to serialize environment mutations in tests.
///
/// # Returns
/// A process-wide mutex for synchronizing environment mutation.
pub fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

#[allow(unused_unsafe)]
fn set_env_var(key: &str, value: &str) {
    // SAFETY: Callers hold `env_lock` while test threads may run in parallel.
    unsafe {
        std::env::set_var(key, value);
    }
}

#[allow(unused_unsafe)]
fn remove_env_var(key: &str) {
    // SAFETY: Callers hold `env_lock` while test threads may run in parallel.
    unsafe {
        std::env::remove_var(key);
    }
}

/// Restores an environment variable value on drop.
pub struct EnvGuard {
    key: String,
    previous: Option<String>,
}

impl EnvGuard {
    /// Set `key=value` and restore the previous value when dropped.
    pub fn set(key: &str, value: &str) -> Self {
        let previous = std::env::var(key).ok();
        set_env_var(key, value);
        Self {
            key: key.to_string(),
            previous,
        }
    }

    /// Remove `key` and restore the previous value when dropped.
    pub fn remove(key: &str) -> Self {
        let previous = std::env::var(key).ok();
        remove_env_var(key);
        Self {
            key: key.to_string(),
            previous,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.previous.as_deref() {
            Some(previous) => set_env_var(&self.key, previous),
            None => remove_env_var(&self.key),
        }
    }
}
