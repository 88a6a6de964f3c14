//! UI configuration, loaded once at startup.
//!
//! ```toml
//! width = 1280
//! height = 720
//! default_element_width = 32
//! default_element_height = 32
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::element::DEFAULT_ELEMENT_SIZE;
use crate::error::{ConstraintError, ConstraintResult};

const fn default_element_width() -> u32 {
    DEFAULT_ELEMENT_SIZE.0
}

const fn default_element_height() -> u32 {
    DEFAULT_ELEMENT_SIZE.1
}

/// Settings for [`Ui::from_config`](crate::Ui::from_config).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UiConfig {
    /// Root container width.
    pub width: u32,
    /// Root container height.
    pub height: u32,
    /// Size given to elements created through [`Ui::element_state`](crate::Ui::element_state).
    #[serde(default = "default_element_width")]
    pub default_element_width: u32,
    /// See `default_element_width`.
    #[serde(default = "default_element_height")]
    pub default_element_height: u32,
}

impl UiConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// [`ConstraintError::Config`] on malformed TOML or a zero root size.
    pub fn from_toml_str(source: &str) -> ConstraintResult<Self> {
        let config: Self = toml::from_str(source).map_err(|e| ConstraintError::Config(e.to_string()))?;
        if config.width == 0 || config.height == 0 {
            return Err(ConstraintError::Config("width and height must be non-zero".to_owned()));
        }
        Ok(config)
    }

    /// Reads a TOML file.
    ///
    /// # Errors
    ///
    /// [`ConstraintError::Config`] when the file cannot be read or is invalid.
    pub fn load<P: AsRef<Path>>(path: P) -> ConstraintResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| ConstraintError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            default_element_width: DEFAULT_ELEMENT_SIZE.0,
            default_element_height: DEFAULT_ELEMENT_SIZE.1,
        }
    }
}
