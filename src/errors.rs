// SPDX-License-Identifier: MPL-2.0

//! Error types for the substitution engine

use std::fmt;

/// Result type alias using HookError
pub type HookResult<T> = Result<T, HookError>;

/// Main error type
#[derive(Debug, Clone)]
pub enum HookError {
    /// Interception-point installation errors
    Install(InstallError),
    /// Image engine errors
    Engine(EngineError),
    /// Storage/filesystem errors
    Storage(StorageError),
    /// Configuration errors
    Config(ConfigError),
    /// A registered policy failed during dispatch
    Policy(String),
    /// Generic error with message
    Other(String),
}

/// Interception-point installation and delivery errors
#[derive(Debug, Clone)]
pub enum InstallError {
    /// The call site does not exist in this host process
    SiteUnavailable(String),
    /// The provider failed to arm the call site
    ProviderFailure(String),
    /// Result delivery to the original caller failed
    DeliveryFailed(String),
}

/// Image engine errors
#[derive(Debug, Clone)]
pub enum EngineError {
    /// No image loaded for the active channel
    NoImage,
    /// Transform or enhancement processing failed
    ProcessingFailed(String),
}

/// Storage errors
#[derive(Debug, Clone)]
pub enum StorageError {
    /// Filesystem error
    Io(String),
    /// Persisted image could not be decoded
    Decode(String),
    /// Image could not be encoded for persistence
    Encode(String),
    /// No usable persistence directory
    NoDirectory,
}

/// Configuration errors
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Settings file could not be read
    Io(String),
    /// Settings file could not be parsed
    Parse(String),
}

impl fmt::Display for HookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookError::Install(e) => write!(f, "Install error: {}", e),
            HookError::Engine(e) => write!(f, "Engine error: {}", e),
            HookError::Storage(e) => write!(f, "Storage error: {}", e),
            HookError::Config(e) => write!(f, "Configuration error: {}", e),
            HookError::Policy(msg) => write!(f, "Policy error: {}", msg),
            HookError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for InstallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallError::SiteUnavailable(site) => write!(f, "Call site unavailable: {}", site),
            InstallError::ProviderFailure(msg) => write!(f, "Provider failure: {}", msg),
            InstallError::DeliveryFailed(msg) => write!(f, "Result delivery failed: {}", msg),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::NoImage => write!(f, "No image loaded for active channel"),
            EngineError::ProcessingFailed(msg) => write!(f, "Processing failed: {}", msg),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(msg) => write!(f, "I/O error: {}", msg),
            StorageError::Decode(msg) => write!(f, "Decode failed: {}", msg),
            StorageError::Encode(msg) => write!(f, "Encode failed: {}", msg),
            StorageError::NoDirectory => write!(f, "No usable persistence directory"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Failed to read settings: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Failed to parse settings: {}", msg),
        }
    }
}

impl std::error::Error for HookError {}
impl std::error::Error for InstallError {}
impl std::error::Error for EngineError {}
impl std::error::Error for StorageError {}
impl std::error::Error for ConfigError {}

// Conversions from sub-errors to HookError
impl From<InstallError> for HookError {
    fn from(err: InstallError) -> Self {
        HookError::Install(err)
    }
}

impl From<EngineError> for HookError {
    fn from(err: EngineError) -> Self {
        HookError::Engine(err)
    }
}

impl From<StorageError> for HookError {
    fn from(err: StorageError) -> Self {
        HookError::Storage(err)
    }
}

impl From<ConfigError> for HookError {
    fn from(err: ConfigError) -> Self {
        HookError::Config(err)
    }
}

impl From<String> for HookError {
    fn from(msg: String) -> Self {
        HookError::Other(msg)
    }
}

impl From<&str> for HookError {
    fn from(msg: &str) -> Self {
        HookError::Other(msg.to_string())
    }
}

// Conversions for I/O and codec errors
impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<image::ImageError> for StorageError {
    fn from(err: image::ImageError) -> Self {
        StorageError::Decode(err.to_string())
    }
}
