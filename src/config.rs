//! Environment configuration for the terminal layer.

use std::env;
use std::path::PathBuf;

pub const WRITE_LOG_ENV: &str = "COG_TUI_WRITE_LOG";
pub const ALT_SCREEN_ENV: &str = "COG_TUI_ALT_SCREEN";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuiConfig {
    /// Appends every byte written to the terminal to this file.
    pub write_log: Option<PathBuf>,
    /// Draws on the alternate screen so the shell scrollback survives.
    pub alternate_screen: bool,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            write_log: None,
            alternate_screen: true,
        }
    }
}

impl TuiConfig {
    pub fn from_env() -> Self {
        Self {
            write_log: env_string_opt(WRITE_LOG_ENV).map(PathBuf::from),
            alternate_screen: env::var(ALT_SCREEN_ENV)
                .map(|value| value.trim() != "0")
                .unwrap_or(true),
        }
    }
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.previous {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env lock poisoned")
    }

    fn set_env_guard(key: &'static str, value: Option<&str>) -> EnvGuard {
        let previous = env::var(key).ok();
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
        EnvGuard { key, previous }
    }

    #[test]
    fn defaults_use_alternate_screen_without_write_log() {
        let _lock = env_lock();
        let _g1 = set_env_guard(WRITE_LOG_ENV, None);
        let _g2 = set_env_guard(ALT_SCREEN_ENV, None);

        assert_eq!(TuiConfig::from_env(), TuiConfig::default());
    }

    #[test]
    fn env_overrides_apply() {
        let _lock = env_lock();
        let _g1 = set_env_guard(WRITE_LOG_ENV, Some("/tmp/cog-writes.log"));
        let _g2 = set_env_guard(ALT_SCREEN_ENV, Some("0"));

        let config = TuiConfig::from_env();
        assert_eq!(config.write_log, Some(PathBuf::from("/tmp/cog-writes.log")));
        assert!(!config.alternate_screen);
    }

    #[test]
    fn blank_write_log_is_ignored() {
        let _lock = env_lock();
        let _g1 = set_env_guard(WRITE_LOG_ENV, Some("  "));
        assert!(TuiConfig::from_env().write_log.is_none());
    }
}
