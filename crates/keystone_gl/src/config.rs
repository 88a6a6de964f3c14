//! Context configuration, loaded once at startup.
//!
//! ```toml
//! viewport_width = 1920
//! viewport_height = 1080
//! debug_output = true   # optional, routes driver messages to tracing
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GlError, GlResult};

/// Settings for [`Context::from_config`](crate::state::Context::from_config).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContextConfig {
    /// Width of the window-system framebuffer.
    pub viewport_width: u32,
    /// Height of the window-system framebuffer.
    pub viewport_height: u32,
    /// Enable driver debug output at startup.
    #[serde(default)]
    pub debug_output: bool,
}

impl ContextConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`GlError::InvalidConfig`] on malformed TOML or a zero dimension.
    pub fn from_toml_str(source: &str) -> GlResult<Self> {
        let config: Self = toml::from_str(source).map_err(|e| GlError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`GlError::InvalidConfig`] when the file cannot be read or is invalid.
    pub fn load<P: AsRef<Path>>(path: P) -> GlResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| GlError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Checks that both dimensions are non-zero.
    ///
    /// # Errors
    ///
    /// [`GlError::InvalidConfig`] naming the zero dimension.
    pub fn validate(&self) -> GlResult<()> {
        if self.viewport_width == 0 {
            return Err(GlError::InvalidConfig("viewport_width must be non-zero".to_owned()));
        }
        if self.viewport_height == 0 {
            return Err(GlError::InvalidConfig("viewport_height must be non-zero".to_owned()));
        }
        Ok(())
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            viewport_width: 800,
            viewport_height: 600,
            debug_output: false,
        }
    }
}
