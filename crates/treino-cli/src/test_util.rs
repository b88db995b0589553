//! Helpers shared by the binary's unit tests.

use std::ffi::{OsStr, OsString};
use std::sync::{Mutex, MutexGuard};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Serialize tests that read or mutate process environment variables.
pub fn lock_env() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Records env vars as they are changed and restores them on drop.
///
/// Only use while holding [`lock_env`].
#[derive(Default)]
pub struct EnvGuard {
    saved: Vec<(OsString, Option<OsString>)>,
}

impl EnvGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl AsRef<OsStr>, value: impl AsRef<OsStr>) {
        self.save(name.as_ref());
        unsafe { std::env::set_var(name, value) };
    }

    pub fn remove(&mut self, name: impl AsRef<OsStr>) {
        self.save(name.as_ref());
        unsafe { std::env::remove_var(name) };
    }

    fn save(&mut self, name: &OsStr) {
        if self.saved.iter().any(|(n, _)| n == name) {
            return;
        }
        self.saved.push((name.to_owned(), std::env::var_os(name)));
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (name, value) in self.saved.drain(..).rev() {
            match value {
                Some(v) => unsafe { std::env::set_var(&name, v) },
                None => unsafe { std::env::remove_var(&name) },
            }
        }
    }
}
