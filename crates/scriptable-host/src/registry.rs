use std::collections::HashMap;
use std::sync::Arc;

use scriptable_api::{Behavior, Component, Reflected, ScriptError};
use tracing::{debug, warn};

use crate::config::ContainerConfig;
use crate::container::Container;
use crate::error::HostError;

/// Factory function type for creating component instances
pub type ComponentFactory = Box<dyn Fn() -> Box<dyn Component> + Send + Sync>;

/// Registry of available components, keyed by id
pub struct ComponentRegistry {
    factories: HashMap<String, ComponentFactory>,
}

impl ComponentRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a behavior under its id.
    ///
    /// The member table is built here, once, and shared by every instance the
    /// factory creates, so an ambiguous table fails registration.
    pub fn register<S: Behavior + Default>(&mut self) -> Result<(), ScriptError> {
        let table = Arc::new(S::member_table()?);
        self.register_factory(S::ID, move || {
            Box::new(Reflected::with_table(S::default(), Arc::clone(&table)))
        });
        Ok(())
    }

    /// Register an arbitrary factory, e.g. for components not built on `Behavior`
    pub fn register_factory<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Component> + Send + Sync + 'static,
    {
        let id = id.into();
        debug!(target: "scripting", "Registering component factory: {}", id);
        if self.factories.insert(id.clone(), Box::new(factory)).is_some() {
            warn!(target: "scripting", "Replaced existing component factory: {}", id);
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Create a fresh, not yet started, component instance
    pub fn create(&self, id: &str) -> Result<Box<dyn Component>, HostError> {
        let factory = self
            .factories
            .get(id)
            .ok_or_else(|| HostError::UnknownComponent { id: id.to_string() })?;
        debug!(target: "scripting", "Creating component instance: {}", id);
        Ok(factory())
    }

    /// Get the ids of all registered components, sorted
    pub fn available(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Build a container from config: one slot per configured slot, each
    /// configured component created and started with its `start` parameters.
    pub fn build_container(&self, config: &ContainerConfig) -> Result<Container, HostError> {
        let mut container = Container::new(config.slots.len()).with_run_policy(config.run_policy);

        for (index, slot) in config.slots.iter().enumerate() {
            let Some(id) = &slot.component else {
                debug!(target: "scripting", "Slot {} left empty", index);
                continue;
            };

            let component = self.create(id)?;
            container
                .set_slot(index, component, &slot.start)
                .map_err(|source| ScriptError::SlotFailure {
                    index,
                    source: Box::new(source),
                })?;
        }

        Ok(container)
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Macro to register multiple behaviors at once
///
/// # Example
/// ```ignore
/// let mut registry = ComponentRegistry::new();
/// register_components!(registry, CounterComponent, SeededComponent)?;
/// ```
#[macro_export]
macro_rules! register_components {
    ($registry:expr, $($component:ty),+ $(,)?) => {
        (|| -> ::std::result::Result<(), $crate::api::ScriptError> {
            $(
                $registry.register::<$component>()?;
            )+
            Ok(())
        })()
    };
}
