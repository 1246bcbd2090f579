//! Environment configuration.

use std::env;

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub write_log: Option<String>,
    pub debug: bool,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            write_log: env_string_opt("TICK_TUI_LOG"),
            debug: env_flag("TICK_TUI_DEBUG"),
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
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
    use super::EnvConfig;
    use std::env;
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
    fn env_defaults_are_off() {
        let _lock = env_lock();
        let _g1 = set_env_guard("TICK_TUI_LOG", None);
        let _g2 = set_env_guard("TICK_TUI_DEBUG", None);

        let config = EnvConfig::from_env();
        assert!(config.write_log.is_none());
        assert!(!config.debug);
    }

    #[test]
    fn env_values_are_picked_up() {
        let _lock = env_lock();
        let _g1 = set_env_guard("TICK_TUI_LOG", Some("/tmp/tick.log"));
        let _g2 = set_env_guard("TICK_TUI_DEBUG", Some("1"));

        let config = EnvConfig::from_env();
        assert_eq!(config.write_log.as_deref(), Some("/tmp/tick.log"));
        assert!(config.debug);
    }

    #[test]
    fn empty_write_log_is_ignored() {
        let _lock = env_lock();
        let _g1 = set_env_guard("TICK_TUI_LOG", Some(""));
        let config = EnvConfig::from_env();
        assert!(config.write_log.is_none());
    }
}
