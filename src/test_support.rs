//! Test-only utilities for safely mutating process-global state in tests.

/// RAII guard for temporarily setting an environment variable.
///
/// The variable is restored to its previous state (or removed if it was
/// not set) when the guard is dropped. Use with `#[serial(env)]`.
pub struct EnvGuard {
    key: &'static str,
    prev: Option<String>,
}

impl EnvGuard {
    #[must_use]
    pub fn set(key: &'static str, val: &str) -> Self {
        let prev = std::env::var(key).ok();
        // SAFETY: callers serialize env access with `#[serial(env)]`.
        unsafe { std::env::set_var(key, val) };
        Self { key, prev }
    }

    #[must_use]
    pub fn remove(key: &'static str) -> Self {
        let prev = std::env::var(key).ok();
        // SAFETY: callers serialize env access with `#[serial(env)]`.
        unsafe { std::env::remove_var(key) };
        Self { key, prev }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        // SAFETY: see `EnvGuard::set`.
        match &self.prev {
            Some(v) => unsafe { std::env::set_var(self.key, v) },
            None => unsafe { std::env::remove_var(self.key) },
        }
    }
}
