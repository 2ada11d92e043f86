//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`EmbedSettings::default()`]
//! 2. If `~/.llembed/settings.json` exists, deep-merge user values over defaults
//! 3. Apply `LLEMBED_*` environment overrides (highest priority)
//! 4. Validate
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::EmbedSettings;

/// Resolve the path to the settings file (`~/.llembed/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".llembed").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<EmbedSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<EmbedSettings> {
    let mut settings = load_file_layer(path)?;
    apply_overrides_from(&mut settings, |key| std::env::var(key).ok());
    settings.validate()?;
    Ok(settings)
}

fn load_file_layer(path: &Path) -> Result<EmbedSettings> {
    let defaults = serde_json::to_value(EmbedSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `LLEMBED_*` overrides read through `lookup`.
///
/// `lookup` is `std::env::var` in production and a map in tests. Invalid
/// values are ignored with a warning (falling back to file/default).
pub fn apply_overrides_from<F>(settings: &mut EmbedSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let env = EnvReader { lookup };

    // ── Model ───────────────────────────────────────────────────────
    if let Some(v) = env.string("LLEMBED_MODEL") {
        settings.model.path = Some(v);
    }
    if let Some(v) = env.u32_range("LLEMBED_CONTEXT_SIZE", 1, 1 << 20) {
        settings.model.context_size = v;
    }
    if let Some(v) = env.u32_range("LLEMBED_GPU_LAYERS", 0, 10_000) {
        settings.model.gpu_layers = v;
    }
    if let Some(v) = env.bool("LLEMBED_F16_MEMORY") {
        settings.model.f16_memory = v;
    }

    // ── Inference ───────────────────────────────────────────────────
    if let Some(v) = env.usize_range("LLEMBED_THREADS", 1, 4096) {
        settings.inference.threads = v;
    }
    if let Some(v) = env.usize_range("LLEMBED_DIMENSION_HINT", 1, 1 << 20) {
        settings.inference.dimension_hint = Some(v);
    }

    // ── Process ─────────────────────────────────────────────────────
    if let Some(v) = env.string("LLEMBED_EMBEDDING_BIN") {
        settings.process.binary = Some(v);
    }
    if let Some(v) = env.parsed("LLEMBED_PROCESS_OUTPUT") {
        settings.process.output = v;
    }

    // ── Output / logging ────────────────────────────────────────────
    if let Some(v) = env.parsed("LLEMBED_FORMAT") {
        settings.output.format = v;
    }
    if let Some(v) = env.string("LLEMBED_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = env.parsed("LLEMBED_LOG_FORMAT") {
        settings.logging.format = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u32` within a range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `usize` within a range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Env readers ─────────────────────────────────────────────────────────────

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.is_empty())
    }

    fn bool(&self, name: &str) -> Option<bool> {
        let val = self.string(name)?;
        let result = parse_bool(&val);
        if result.is_none() {
            warn!(key = name, value = %val, "invalid boolean env var, ignoring");
        }
        result
    }

    fn u32_range(&self, name: &str, min: u32, max: u32) -> Option<u32> {
        let val = self.string(name)?;
        let result = parse_u32_range(&val, min, max);
        if result.is_none() {
            warn!(key = name, value = %val, "invalid u32 env var, ignoring");
        }
        result
    }

    fn usize_range(&self, name: &str, min: usize, max: usize) -> Option<usize> {
        let val = self.string(name)?;
        let result = parse_usize_range(&val, min, max);
        if result.is_none() {
            warn!(key = name, value = %val, "invalid usize env var, ignoring");
        }
        result
    }

    /// Lowercase enum values via their serde representation.
    fn parsed<T: serde::de::DeserializeOwned>(&self, name: &str) -> Option<T> {
        let val = self.string(name)?;
        match serde_json::from_value(Value::String(val.to_lowercase())) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(key = name, value = %val, "invalid env var value, ignoring");
                None
            }
        }
    }
}
