//! crates/logging/src/config.rs
//! Verbosity configuration and its rendering as a tracing filter.

use std::fmt::Write as _;

use super::levels::{DebugFlag, DebugLevels};

/// Combined verbosity configuration.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct VerbosityConfig {
    /// Number of `-v` flags the configuration was derived from.
    pub verbose: u8,
    /// Debug flag levels.
    pub debug: DebugLevels,
}

impl VerbosityConfig {
    /// Create a new configuration from a verbose level (0-4).
    ///
    /// Level 0 only reports warnings, level 1 adds per-command summaries,
    /// level 2 enables matching and signature debugging, level 3 enables
    /// debugging for every subsystem and level 4 adds per-block tracing.
    pub fn from_verbose_level(level: u8) -> Self {
        let mut config = Self {
            verbose: level,
            ..Self::default()
        };

        match level {
            0 | 1 => {}
            2 => {
                config.debug.genr = 1;
                config.debug.delta = 1;
                config.debug.recv = 1;
            }
            3 => {
                for flag in DebugFlag::ALL {
                    config.debug.set(flag, 2);
                }
            }
            _ => {
                for flag in DebugFlag::ALL {
                    config.debug.set(flag, 3);
                }
            }
        }

        config
    }

    /// Apply a debug flag token such as `delta2` or `io`.
    ///
    /// A token without a trailing number sets the flag to level 1.
    pub fn apply_debug_flag(&mut self, token: &str) -> Result<(), String> {
        let (name, level) = parse_flag_token(token)?;
        let flag = name.parse::<DebugFlag>()?;
        self.debug.set(flag, level);
        Ok(())
    }

    /// Renders the configuration as an `EnvFilter` directive string.
    ///
    /// Debug level 1 maps to `debug`, level 2 and above to `trace`.
    #[must_use]
    pub fn filter_directives(&self) -> String {
        let base = if self.verbose == 0 { "warn" } else { "info" };
        let mut directives = String::from(base);

        for flag in DebugFlag::ALL {
            let level = match self.debug.get(flag) {
                0 => continue,
                1 => "debug",
                _ => "trace",
            };
            let _ = write!(directives, ",{}={level}", flag.target());
        }

        directives
    }
}

/// Parse a flag token like "delta2" into ("delta", 2) or "io" into ("io", 1).
fn parse_flag_token(token: &str) -> Result<(&str, u8), String> {
    if token.is_empty() {
        return Err("empty flag token".to_string());
    }

    match token.find(|c: char| c.is_ascii_digit()) {
        Some(0) => Err(format!("missing flag name in: {token}")),
        Some(pos) => {
            let level = token[pos..]
                .parse::<u8>()
                .map_err(|_| format!("invalid level in flag: {token}"))?;
            Ok((&token[..pos], level))
        }
        None => Ok((token, 1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_configuration_only_reports_warnings() {
        let config = VerbosityConfig::from_verbose_level(0);
        assert_eq!(config.filter_directives(), "warn");
    }

    #[test]
    fn level_two_enables_matching_diagnostics() {
        let config = VerbosityConfig::from_verbose_level(2);
        let directives = config.filter_directives();
        assert!(directives.starts_with("info"));
        assert!(directives.contains("rdelta::delta=debug"));
        assert!(directives.contains("rdelta::genr=debug"));
        assert!(!directives.contains("rdelta::io"));
    }

    #[test]
    fn high_levels_trace_everything() {
        let config = VerbosityConfig::from_verbose_level(9);
        for flag in DebugFlag::ALL {
            assert_eq!(config.debug.get(flag), 3);
        }
        assert!(config.filter_directives().contains("rdelta::io=trace"));
    }

    #[test]
    fn debug_tokens_override_levels() {
        let mut config = VerbosityConfig::default();
        config.apply_debug_flag("recv").expect("flag without level");
        config.apply_debug_flag("io4").expect("flag with level");
        assert_eq!(config.debug.recv, 1);
        assert_eq!(config.debug.io, 4);
    }

    #[test]
    fn malformed_debug_tokens_are_rejected() {
        let mut config = VerbosityConfig::default();
        assert!(config.apply_debug_flag("").is_err());
        assert!(config.apply_debug_flag("2").is_err());
        assert!(config.apply_debug_flag("delta999").is_err());
        assert!(config.apply_debug_flag("hlink").is_err());
    }
}
