//! Bridge configuration from environment variables.
//!
//! Every setting has a default; unparsable values fall back silently, as do
//! map dimensions outside `1..=MAP_DIM_MAX`. A `.env` file in the working
//! directory is read first when present.

use std::env;
use std::path::PathBuf;

use crate::adapter::{SerializerOptions, StringStyle};
use crate::term::PipeOptions;
use crate::types::{MAP_DIM_MAX, MAP_HEIGHT, MAP_WIDTH};

pub const ENV_LOG: &str = "SIL_BRIDGE_LOG";
pub const ENV_LOG_PATH: &str = "SIL_BRIDGE_LOG_PATH";
pub const ENV_RAW_STRINGS: &str = "SIL_BRIDGE_RAW_STRINGS";
pub const ENV_FORWARD_NEWLINE: &str = "SIL_BRIDGE_FORWARD_NEWLINE";
pub const ENV_MAP_WIDTH: &str = "SIL_BRIDGE_MAP_WIDTH";
pub const ENV_MAP_HEIGHT: &str = "SIL_BRIDGE_MAP_HEIGHT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// `tracing` filter directive.
    pub log_filter: String,
    /// Log to this file instead of stderr.
    pub log_path: Option<PathBuf>,
    pub raw_strings: bool,
    pub forward_newline: bool,
    pub map_width: u16,
    pub map_height: u16,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            log_filter: "warn".to_string(),
            log_path: None,
            raw_strings: false,
            forward_newline: false,
            map_width: MAP_WIDTH,
            map_height: MAP_HEIGHT,
        }
    }
}

impl BridgeConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Used by `from_env` and by tests.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let log_filter = lookup(ENV_LOG)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.log_filter);

        let log_path = lookup(ENV_LOG_PATH)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let dimension = |key: &str, default: u16| {
            lookup(key)
                .and_then(|s| s.trim().parse::<u16>().ok())
                .filter(|&v| (1..=MAP_DIM_MAX).contains(&v))
                .unwrap_or(default)
        };

        Self {
            log_filter,
            log_path,
            raw_strings: lookup(ENV_RAW_STRINGS).is_some_and(|v| is_truthy(&v)),
            forward_newline: lookup(ENV_FORWARD_NEWLINE).is_some_and(|v| is_truthy(&v)),
            map_width: dimension(ENV_MAP_WIDTH, defaults.map_width),
            map_height: dimension(ENV_MAP_HEIGHT, defaults.map_height),
        }
    }

    pub fn pipe_options(&self) -> PipeOptions {
        PipeOptions {
            forward_newline: self.forward_newline,
            serializer: SerializerOptions {
                style: if self.raw_strings {
                    StringStyle::Raw
                } else {
                    StringStyle::Escaped
                },
                map_width: self.map_width,
                map_height: self.map_height,
            },
        }
    }
}

fn is_truthy(v: &str) -> bool {
    let v = v.trim();
    v == "1" || v.eq_ignore_ascii_case("true")
}
