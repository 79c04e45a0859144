//! Graphics error types.

use std::fmt;

/// Errors that can occur in the graphics system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphicsError {
    /// The graphics context is missing or has been lost.
    InvalidContext,
    /// A shader stage failed to compile; carries the compiler log.
    ShaderCompilation(String),
    /// A program failed to link; carries the linker log.
    ProgramLink(String),
    /// A texture could not be loaded or uploaded.
    Texture(TextureError),
    /// Failed to create a resource.
    ResourceCreationFailed(String),
    /// An invalid parameter was provided.
    InvalidParameter(String),
}

impl fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidContext => write!(f, "invalid graphics context"),
            Self::ShaderCompilation(log) => write!(f, "shader compilation failed: {log}"),
            Self::ProgramLink(log) => write!(f, "program link failed: {log}"),
            Self::Texture(err) => write!(f, "texture error: {err}"),
            Self::ResourceCreationFailed(msg) => write!(f, "resource creation failed: {msg}"),
            Self::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
        }
    }
}

impl std::error::Error for GraphicsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Texture(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TextureError> for GraphicsError {
    fn from(err: TextureError) -> Self {
        Self::Texture(err)
    }
}

/// Failure of an asynchronous texture load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureError {
    /// The image source reported an error for `name`.
    LoadFailed { name: String, reason: String },
    /// The load was dropped before it produced an image.
    Cancelled { name: String },
}

impl TextureError {
    /// Name of the texture that failed.
    pub fn name(&self) -> &str {
        match self {
            Self::LoadFailed { name, .. } | Self::Cancelled { name } => name,
        }
    }
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadFailed { name, reason } => write!(f, "failed to load '{name}': {reason}"),
            Self::Cancelled { name } => write!(f, "load of '{name}' was cancelled"),
        }
    }
}

impl std::error::Error for TextureError {}
