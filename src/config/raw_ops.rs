//! Raw memory operations configuration.

use super::{parse_env_bool, parse_env_var, Config};
use crate::error::{MemoryError, Result};
use crate::memory::chunk::ChunkWidth;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest accepted `chunk_threshold`, in bytes
pub const MAX_CHUNK_THRESHOLD: usize = 4096;

/// Tuning for [`RawMemOps`](crate::memory::RawMemOps).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOpsConfig {
    /// Widest chunk the kernels move per step
    pub max_chunk_width: ChunkWidth,
    /// Buffers shorter than this many bytes are processed byte by byte
    pub chunk_threshold: usize,
    /// Scan a word at a time when searching for a single byte
    pub word_search: bool,
}

impl Default for RawOpsConfig {
    fn default() -> Self {
        Self {
            max_chunk_width: ChunkWidth::native(),
            chunk_threshold: 16,
            word_search: true,
        }
    }
}

impl Config for RawOpsConfig {
    fn validate(&self) -> Result<()> {
        if self.chunk_threshold > MAX_CHUNK_THRESHOLD {
            return Err(MemoryError::configuration(format!(
                "chunk_threshold {} exceeds the maximum of {} bytes",
                self.chunk_threshold, MAX_CHUNK_THRESHOLD
            )));
        }
        if self.max_chunk_width > ChunkWidth::native() {
            return Err(MemoryError::configuration(format!(
                "max_chunk_width {} is wider than the native width {}",
                self.max_chunk_width,
                ChunkWidth::native()
            )));
        }
        Ok(())
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let mut config = Self::default();
        config.max_chunk_width = parse_env_var(
            &format!("{}RAW_OPS_MAX_CHUNK_WIDTH", prefix),
            config.max_chunk_width,
        );
        config.chunk_threshold = parse_env_var(
            &format!("{}RAW_OPS_CHUNK_THRESHOLD", prefix),
            config.chunk_threshold,
        );
        config.word_search =
            parse_env_bool(&format!("{}RAW_OPS_WORD_SEARCH", prefix), config.word_search);
        config.validate()?;
        Ok(config)
    }

    fn performance_preset() -> Self {
        Self {
            max_chunk_width: ChunkWidth::native(),
            chunk_threshold: 8,
            word_search: true,
        }
    }

    fn memory_preset() -> Self {
        Self {
            max_chunk_width: ChunkWidth::W8,
            chunk_threshold: 0,
            word_search: false,
        }
    }

    fn realtime_preset() -> Self {
        Self {
            max_chunk_width: ChunkWidth::native(),
            chunk_threshold: 0,
            word_search: true,
        }
    }

    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self).map_err(|e| {
            MemoryError::configuration(format!("Failed to serialize raw ops config: {}", e))
        })?;
        std::fs::write(path, serialized).map_err(|e| {
            MemoryError::configuration(format!("Failed to write raw ops config file: {}", e))
        })?;
        Ok(())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MemoryError::configuration(format!("Failed to read raw ops config file: {}", e))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            MemoryError::configuration(format!("Failed to parse raw ops config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }
}
