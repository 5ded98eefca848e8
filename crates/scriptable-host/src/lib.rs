//! Host runtime for scriptable containers
//!
//! This crate owns components in fixed-size containers and drives them by
//! slot index. Components themselves should depend on scriptable-api, not
//! this crate.

pub use scriptable_api as api;

pub mod config;
pub mod container;
pub mod error;
pub mod logging;
pub mod registry;

pub use config::{ConfigLoadError, ContainerConfig, LoggingConfig, ScriptableConfig, SlotConfig};
pub use container::{Container, RunPolicy, RunReport, SlotOutcome};
pub use error::HostError;
pub use logging::init_logging;
pub use registry::{ComponentFactory, ComponentRegistry};
