//! Built-in components for the scriptable CLI
//!
//! These demonstrate the component API and give the CLI something to drive
//! out of the box.

pub mod counter;
pub mod echo;
pub mod seeded;

use scriptable_api::ScriptError;
use scriptable_host::{register_components, ComponentRegistry};

/// Create a registry with all built-in components
pub fn create_registry() -> Result<ComponentRegistry, ScriptError> {
    let mut registry = ComponentRegistry::new();
    register_components!(
        registry,
        counter::CounterComponent,
        echo::EchoComponent,
        seeded::SeededComponent,
    )?;
    Ok(registry)
}
