use thiserror::Error;

pub const MAX_CALL_DEPTH_VAR: &str = "LOX_MAX_CALL_DEPTH";
pub const DEFAULT_MAX_CALL_DEPTH: usize = 4096;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Calls deeper than this abort the run with a stack overflow.
    pub max_call_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got `{value}`")]
    InvalidCallDepth { var: &'static str, value: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = lookup(MAX_CALL_DEPTH_VAR) {
            config.max_call_depth = match raw.trim().parse::<usize>() {
                Ok(depth) if depth > 0 => depth,
                _ => {
                    return Err(ConfigError::InvalidCallDepth {
                        var: MAX_CALL_DEPTH_VAR,
                        value: raw,
                    })
                }
            };
        }
        Ok(config)
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_overrides() {
        let config = Config::from_lookup(|_| None).expect("default config");
        assert_eq!(config.max_call_depth, DEFAULT_MAX_CALL_DEPTH);
    }

    #[test]
    fn reads_call_depth_override() {
        let config = Config::from_lookup(|key| (key == MAX_CALL_DEPTH_VAR).then(|| " 64 ".to_string()))
            .expect("valid override");
        assert_eq!(config.max_call_depth, 64);
    }

    #[test]
    fn rejects_zero_and_garbage() {
        for raw in ["0", "-3", "lots"] {
            let err = Config::from_lookup(|_| Some(raw.to_string())).expect_err("should reject");
            assert_eq!(
                err,
                ConfigError::InvalidCallDepth {
                    var: MAX_CALL_DEPTH_VAR,
                    value: raw.to_string(),
                }
            );
        }
    }
}
