//! Append-only debug log sink configured from the environment.
//!
//! The terminal owns stdout, so diagnostics go to the file named by
//! `TICK_TUI_LOG` instead; without that variable every call is a no-op.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::EnvConfig;

#[derive(Debug, Default)]
pub struct DebugLogger {
    file: Option<File>,
}

impl DebugLogger {
    pub fn from_env(config: &EnvConfig) -> Self {
        let file = config.write_log.as_deref().and_then(|path| {
            OpenOptions::new().create(true).append(true).open(path).ok()
        });
        Self { file }
    }

    pub fn disabled() -> Self {
        Self { file: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    pub fn log(&self, message: &str) {
        let Some(file) = self.file.as_ref() else {
            return;
        };
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or(0);
        // Writes through &File; failures are swallowed, logging must not
        // take down the tick loop.
        let mut writer: &File = file;
        let _ = writeln!(writer, "[{stamp}] {message}");
    }
}

#[cfg(test)]
mod tests {
    use super::DebugLogger;
    use crate::config::EnvConfig;

    #[test]
    fn disabled_logger_swallows_messages() {
        let logger = DebugLogger::disabled();
        assert!(!logger.is_enabled());
        logger.log("dropped");
    }

    #[test]
    fn logger_writes_timestamped_lines() {
        let file = std::env::temp_dir().join(format!("tick-tui-log-{}", std::process::id()));
        let path = file.to_string_lossy().to_string();
        let config = EnvConfig {
            write_log: Some(path.clone()),
            debug: false,
        };

        let logger = DebugLogger::from_env(&config);
        assert!(logger.is_enabled());
        logger.log("hello");

        let contents = std::fs::read_to_string(&path).expect("log file readable");
        assert!(contents.contains("] hello"));
        let _ = std::fs::remove_file(&path);
    }
}
