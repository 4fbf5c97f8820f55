//! Configuration APIs for memview
//!
//! The raw memory kernels are tunable: the widest chunk they move per step,
//! the buffer length below which chunking is skipped, and whether single
//! byte search scans a word at a time. [`RawOpsConfig`] carries these knobs
//! and [`crate::memory::init_raw_ops`] installs a configured dispatcher as
//! the process-wide default.
//!
//! # Configuration Traits
//!
//! The [`Config`] trait provides validation, environment initialization,
//! presets and JSON persistence.
//!
//! ```rust
//! use memview::config::{Config, RawOpsConfig};
//! use memview::memory::ChunkWidth;
//!
//! let config = RawOpsConfig::performance_preset();
//! assert!(config.validate().is_ok());
//!
//! let narrow = RawOpsConfig {
//!     max_chunk_width: ChunkWidth::W16,
//!     ..RawOpsConfig::default()
//! };
//! assert!(narrow.validate().is_ok());
//! ```
//!
//! # Environment Initialization
//!
//! ```rust
//! use memview::config::{Config, RawOpsConfig};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Reads MEMVIEW_RAW_OPS_MAX_CHUNK_WIDTH and friends
//! let config = RawOpsConfig::from_env()?;
//!
//! // Same variables under a custom prefix
//! let config = RawOpsConfig::from_env_with_prefix("MYAPP_")?;
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use std::env;
use std::fmt;
use std::path::Path;

pub mod raw_ops;


pub use raw_ops::RawOpsConfig;

/// Common configuration trait providing validation, environment initialization,
/// and preset management functionality.
pub trait Config: Clone + fmt::Debug {
    /// Validate the configuration for correctness and consistency.
    fn validate(&self) -> Result<()>;

    /// Initialize configuration from environment variables.
    ///
    /// Environment variables use the format `MEMVIEW_{COMPONENT}_{FIELD}`,
    /// for example `MEMVIEW_RAW_OPS_WORD_SEARCH=false`. Unset variables keep
    /// their default values.
    fn from_env() -> Result<Self>
    where
        Self: Default,
    {
        Self::from_env_with_prefix("MEMVIEW_")
    }

    /// Initialize configuration from environment variables with a custom prefix.
    fn from_env_with_prefix(prefix: &str) -> Result<Self>
    where
        Self: Default;

    /// Preset tuned for throughput on large buffers.
    fn performance_preset() -> Self;

    /// Preset that keeps code paths and footprint small.
    fn memory_preset() -> Self;

    /// Preset with predictable per-call cost.
    fn realtime_preset() -> Self;

    /// Balanced preset; the default configuration.
    fn balanced_preset() -> Self
    where
        Self: Default,
    {
        Self::default()
    }

    /// Save configuration to a JSON file.
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()>;

    /// Load and validate configuration from a JSON file.
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self>;
}

/// Parse an environment variable, falling back to `default` when it is unset
/// or does not parse.
pub fn parse_env_var<T>(var_name: &str, default: T) -> T
where
    T: std::str::FromStr + Clone,
{
    env::var(var_name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Parse a boolean environment variable.
///
/// Accepts "true", "1", "yes", "on" (case-insensitive) as true,
/// everything else as false.
pub fn parse_env_bool(var_name: &str, default: bool) -> bool {
    env::var(var_name)
        .ok()
        .map(|s| {
            let s = s.trim().to_lowercase();
            matches!(s.as_str(), "true" | "1" | "yes" | "on")
        })
        .unwrap_or(default)
}
