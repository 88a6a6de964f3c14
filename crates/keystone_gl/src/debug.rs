//! # Driver Debug Output
//!
//! Messages from `GL_KHR_debug`, polled from the driver's message log and
//! routed into `tracing` by severity:
//!
//! ```text
//! ┌──────────────┬─────────┐
//! │ HIGH         │ error!  │
//! │ MEDIUM       │ warn!   │
//! │ LOW          │ info!   │
//! │ NOTIFICATION │ debug!  │
//! └──────────────┴─────────┘
//! ```
//!
//! Debug output needs a context created with the debug flag. See
//! [`Context::enable_debug_output`](crate::state::Context::enable_debug_output)
//! and [`Context::flush_debug_messages`](crate::state::Context::flush_debug_messages).

use std::fmt;

use tracing::Level;

/// Messages pulled from the driver per backend call.
pub const DEBUG_LOG_BATCH: u32 = 64;

/// Component that produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum DebugSource {
    Api = glow::DEBUG_SOURCE_API,
    WindowSystem = glow::DEBUG_SOURCE_WINDOW_SYSTEM,
    ShaderCompiler = glow::DEBUG_SOURCE_SHADER_COMPILER,
    ThirdParty = glow::DEBUG_SOURCE_THIRD_PARTY,
    Application = glow::DEBUG_SOURCE_APPLICATION,
    Other = glow::DEBUG_SOURCE_OTHER,
}

impl DebugSource {
    /// Maps a raw enumerant; unknown values become [`Other`](Self::Other).
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        match raw {
            glow::DEBUG_SOURCE_API => Self::Api,
            glow::DEBUG_SOURCE_WINDOW_SYSTEM => Self::WindowSystem,
            glow::DEBUG_SOURCE_SHADER_COMPILER => Self::ShaderCompiler,
            glow::DEBUG_SOURCE_THIRD_PARTY => Self::ThirdParty,
            glow::DEBUG_SOURCE_APPLICATION => Self::Application,
            _ => Self::Other,
        }
    }

    /// Upper-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Api => "API",
            Self::WindowSystem => "WINDOW_SYSTEM",
            Self::ShaderCompiler => "SHADER_COMPILER",
            Self::ThirdParty => "THIRD_PARTY",
            Self::Application => "APPLICATION",
            Self::Other => "OTHER",
        }
    }
}

/// What a message is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum DebugType {
    Error = glow::DEBUG_TYPE_ERROR,
    DeprecatedBehavior = glow::DEBUG_TYPE_DEPRECATED_BEHAVIOR,
    UndefinedBehavior = glow::DEBUG_TYPE_UNDEFINED_BEHAVIOR,
    Portability = glow::DEBUG_TYPE_PORTABILITY,
    Performance = glow::DEBUG_TYPE_PERFORMANCE,
    Marker = glow::DEBUG_TYPE_MARKER,
    PushGroup = glow::DEBUG_TYPE_PUSH_GROUP,
    PopGroup = glow::DEBUG_TYPE_POP_GROUP,
    Other = glow::DEBUG_TYPE_OTHER,
}

impl DebugType {
    /// Maps a raw enumerant; unknown values become [`Other`](Self::Other).
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        match raw {
            glow::DEBUG_TYPE_ERROR => Self::Error,
            glow::DEBUG_TYPE_DEPRECATED_BEHAVIOR => Self::DeprecatedBehavior,
            glow::DEBUG_TYPE_UNDEFINED_BEHAVIOR => Self::UndefinedBehavior,
            glow::DEBUG_TYPE_PORTABILITY => Self::Portability,
            glow::DEBUG_TYPE_PERFORMANCE => Self::Performance,
            glow::DEBUG_TYPE_MARKER => Self::Marker,
            glow::DEBUG_TYPE_PUSH_GROUP => Self::PushGroup,
            glow::DEBUG_TYPE_POP_GROUP => Self::PopGroup,
            _ => Self::Other,
        }
    }

    /// Upper-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::DeprecatedBehavior => "DEPRECATED_BEHAVIOR",
            Self::UndefinedBehavior => "UNDEFINED_BEHAVIOR",
            Self::Portability => "PORTABILITY",
            Self::Performance => "PERFORMANCE",
            Self::Marker => "MARKER",
            Self::PushGroup => "PUSH_GROUP",
            Self::PopGroup => "POP_GROUP",
            Self::Other => "OTHER",
        }
    }
}

/// How much a message matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum DebugSeverity {
    High = glow::DEBUG_SEVERITY_HIGH,
    Medium = glow::DEBUG_SEVERITY_MEDIUM,
    Low = glow::DEBUG_SEVERITY_LOW,
    Notification = glow::DEBUG_SEVERITY_NOTIFICATION,
}

impl DebugSeverity {
    /// Maps a raw enumerant; unknown values become
    /// [`Notification`](Self::Notification).
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        match raw {
            glow::DEBUG_SEVERITY_HIGH => Self::High,
            glow::DEBUG_SEVERITY_MEDIUM => Self::Medium,
            glow::DEBUG_SEVERITY_LOW => Self::Low,
            _ => Self::Notification,
        }
    }

    /// Upper-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
            Self::Notification => "NOTIFICATION",
        }
    }

    /// `tracing` level messages of this severity are logged at.
    #[must_use]
    pub const fn level(self) -> Level {
        match self {
            Self::High => Level::ERROR,
            Self::Medium => Level::WARN,
            Self::Low => Level::INFO,
            Self::Notification => Level::DEBUG,
        }
    }
}

/// One driver debug message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugMessage {
    /// Driver-specific message id.
    pub id: u32,
    /// Producer.
    pub source: DebugSource,
    /// Category.
    pub kind: DebugType,
    /// Importance.
    pub severity: DebugSeverity,
    /// Message text.
    pub text: String,
}

impl DebugMessage {
    /// Builds a message from raw `GL_DEBUG_*` enumerants.
    #[must_use]
    pub fn from_raw(source: u32, kind: u32, id: u32, severity: u32, text: impl Into<String>) -> Self {
        Self {
            id,
            source: DebugSource::from_raw(source),
            kind: DebugType::from_raw(kind),
            severity: DebugSeverity::from_raw(severity),
            text: text.into(),
        }
    }

    /// Logs the message at the level its severity maps to.
    pub fn route(&self) {
        let (id, source, kind) = (self.id, self.source.as_str(), self.kind.as_str());
        match self.severity {
            DebugSeverity::High => tracing::error!(id, source, kind, "GL: {}", self.text),
            DebugSeverity::Medium => tracing::warn!(id, source, kind, "GL: {}", self.text),
            DebugSeverity::Low => tracing::info!(id, source, kind, "GL: {}", self.text),
            DebugSeverity::Notification => tracing::debug!(id, source, kind, "GL: {}", self.text),
        }
    }
}

impl fmt::Display for DebugMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} {} {} #{}] {}",
            self.severity.as_str(),
            self.source.as_str(),
            self.kind.as_str(),
            self.id,
            self.text
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_levels() {
        assert_eq!(DebugSeverity::High.level(), Level::ERROR);
        assert_eq!(DebugSeverity::Medium.level(), Level::WARN);
        assert_eq!(DebugSeverity::Low.level(), Level::INFO);
        assert_eq!(DebugSeverity::Notification.level(), Level::DEBUG);
    }

    #[test]
    fn test_from_raw() {
        let message = DebugMessage::from_raw(
            glow::DEBUG_SOURCE_SHADER_COMPILER,
            glow::DEBUG_TYPE_PERFORMANCE,
            7,
            glow::DEBUG_SEVERITY_MEDIUM,
            "recompiling shader",
        );

        assert_eq!(message.source, DebugSource::ShaderCompiler);
        assert_eq!(message.kind, DebugType::Performance);
        assert_eq!(message.severity, DebugSeverity::Medium);
        assert_eq!(message.to_string(), "[MEDIUM SHADER_COMPILER PERFORMANCE #7] recompiling shader");
    }

    #[test]
    fn test_unknown_enumerants_fall_back() {
        let message = DebugMessage::from_raw(0, 0, 0, 0, "");
        assert_eq!(message.source, DebugSource::Other);
        assert_eq!(message.kind, DebugType::Other);
        assert_eq!(message.severity, DebugSeverity::Notification);
    }

    #[test]
    fn test_raw_round_trip() {
        for severity in [
            DebugSeverity::High,
            DebugSeverity::Medium,
            DebugSeverity::Low,
            DebugSeverity::Notification,
        ] {
            assert_eq!(DebugSeverity::from_raw(severity as u32), severity);
        }
        assert_eq!(DebugSource::from_raw(DebugSource::Api as u32), DebugSource::Api);
        assert_eq!(DebugType::from_raw(DebugType::PopGroup as u32), DebugType::PopGroup);
    }
}
