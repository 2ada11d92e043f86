//! # llembed-settings
//!
//! Configuration for the llembed programs, loaded from three layers
//! (in priority order):
//! 1. **Compiled defaults**: [`EmbedSettings::default()`]
//! 2. **User file**: `~/.llembed/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `LLEMBED_*` overrides (highest priority)
//!
//! Command-line flags are applied on top by the binaries.
//!
//! # Usage
//!
//! ```no_run
//! let settings = llembed_settings::load_settings().unwrap_or_default();
//! println!("threads: {}", settings.inference.threads);
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{apply_overrides_from, deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_exports_work() {
        let _settings = EmbedSettings::default();
        let path = settings_path();
        assert!(path.ends_with(".llembed/settings.json"));
    }

    #[test]
    fn default_settings_are_valid() {
        let settings = EmbedSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.model.context_size, 2048);
        assert!(settings.model.f16_memory);
        assert_eq!(settings.model.gpu_layers, 0);
        assert_eq!(settings.output.precision, 6);
        assert_eq!(settings.logging.level, "info");
    }
}
