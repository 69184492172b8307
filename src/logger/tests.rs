//! Tests for the logger module

use crate::logger::config::*;

#[cfg(test)]
mod config_tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_default_config_creation() {
        let config = LoggerConfig::default();
        assert!(config.colored);
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Full);
        assert_eq!(config.target, LogTarget::Stderr);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let config = LoggerConfig {
            level: "loud".to_string(),
            ..LoggerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_warning_alias() {
        let config = LoggerConfig {
            level: "WARNING".to_string(),
            ..LoggerConfig::default()
        };
        assert_eq!(config.parse_level().unwrap(), tracing::Level::WARN);
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::from_str("full").unwrap(), LogFormat::Full);
        assert_eq!(LogFormat::from_str("Compact").unwrap(), LogFormat::Compact);
        assert_eq!(LogFormat::from_str("json").unwrap(), LogFormat::Json);
        assert!(LogFormat::from_str("invalid").is_err());
        assert_eq!(LogFormat::Json.as_str(), "json");
    }

    #[test]
    fn test_builder_pattern() {
        let config = LoggerConfigBuilder::new()
            .level("debug")
            .colored(false)
            .format(LogFormat::Json)
            .target(LogTarget::Stdout)
            .build()
            .unwrap();

        assert_eq!(config.level, "debug");
        assert!(!config.colored);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.target, LogTarget::Stdout);

        assert!(LoggerConfigBuilder::new().level("nope").build().is_err());
    }

    #[test]
    fn test_deserialize_config() {
        let config: LoggerConfig = serde_json::from_str(
            r#"{"level": "warn", "colored": false, "format": "compact", "target": "stdout", "with_target": true}"#,
        )
        .unwrap();
        assert_eq!(config.format, LogFormat::Compact);
        assert_eq!(config.target, LogTarget::Stdout);
        assert!(config.with_target);
    }
}

#[cfg(test)]
mod init_tests {
    use super::*;
    use crate::logger::{LOG_ENV, build_filter, init_logger};
    use std::sync::Mutex;

    static TEST_MUTEX: Mutex<()> = Mutex::new(());

    /// Restores the environment variables it touched
    struct EnvGuard {
        vars_to_restore: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new() -> Self {
            Self {
                vars_to_restore: Vec::new(),
            }
        }

        fn set(&mut self, key: &str, value: &str) {
            let original = std::env::var(key).ok();
            self.vars_to_restore.push((key.to_string(), original));
            unsafe {
                std::env::set_var(key, value);
            }
        }

        fn remove(&mut self, key: &str) {
            let original = std::env::var(key).ok();
            self.vars_to_restore.push((key.to_string(), original));
            unsafe {
                std::env::remove_var(key);
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, original) in self.vars_to_restore.drain(..).rev() {
                unsafe {
                    match original {
                        Some(value) => std::env::set_var(&key, value),
                        None => std::env::remove_var(&key),
                    }
                }
            }
        }
    }

    #[test]
    fn test_filter_uses_configured_level() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.remove(LOG_ENV);

        let config = LoggerConfig {
            level: "debug".to_string(),
            ..LoggerConfig::default()
        };
        assert_eq!(build_filter(&config).to_string(), "debug");
    }

    #[test]
    fn test_filter_env_override() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.set(LOG_ENV, "notist=trace");

        let filter = build_filter(&LoggerConfig::default());
        assert_eq!(filter.to_string(), "notist=trace");
    }

    #[test]
    fn test_second_init_fails() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let config = LoggerConfigBuilder::new().colored(false).build().unwrap();

        // Only this test installs a subscriber; the second call finds it.
        let _ = init_logger(config.clone());
        assert!(init_logger(config).is_err());
    }

    #[test]
    fn test_init_rejects_invalid_config() {
        let config = LoggerConfig {
            level: "loud".to_string(),
            ..LoggerConfig::default()
        };
        assert!(init_logger(config).is_err());
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Every known level validates regardless of case
        #[test]
        fn property_known_levels_validate(
            index in 0usize..5,
            upper in any::<bool>(),
            colored in any::<bool>(),
        ) {
            let level = ["trace", "debug", "info", "warn", "error"][index];
            let level = if upper { level.to_uppercase() } else { level.to_string() };
            let config = LoggerConfig { level, colored, ..LoggerConfig::default() };
            prop_assert!(config.validate().is_ok());
        }

        /// Anything outside the known set is rejected
        #[test]
        fn property_unknown_levels_fail(level in "[a-z]{6,12}") {
            prop_assume!(level != "warning");
            let config = LoggerConfig { level, ..LoggerConfig::default() };
            prop_assert!(config.parse_level().is_err());
        }
    }
}
