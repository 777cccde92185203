//! # Core Engine Module
//!
//! Shared configuration types used by the loop driver and applications.
//!
//! ## Organization
//!
//! - **Config**: Unified configuration for timing, display and error policy
//! - **Foundation**: Low-level utilities (math, time, logging)

pub mod config;

// Re-export foundation modules for convenience
pub use crate::foundation;

// Re-export commonly used config types
pub use config::{
    ApplicationConfig,
    EngineConfig,
    TimingConfig,
    WindowConfig,
    ErrorMode,
    Config,
    ConfigError,
};
