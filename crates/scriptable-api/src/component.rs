use std::any::Any;
use std::sync::Arc;

use crate::error::{Result, ScriptError};
use crate::members::{MemberInfo, MemberTable, MemberTableBuilder};
use crate::value::Value;

/// Trait that component authors implement.
///
/// A behavior declares its accessible members once in [`Behavior::describe`];
/// everything reachable by name from the outside has to be registered there.
pub trait Behavior: Send + Sized + 'static {
    /// Unique identifier for this component (e.g., "counter")
    const ID: &'static str;

    /// Register the members that can be read, written or invoked by name
    fn describe(members: &mut MemberTableBuilder<Self>);

    /// Called exactly once, before anything else touches the instance
    fn start(&mut self, parameters: &[Value]) -> anyhow::Result<()>;

    /// Called any number of times after `start`
    fn run(&mut self, parameters: &[Value]) -> anyhow::Result<()>;

    /// Build the member table for this behavior
    fn member_table() -> Result<MemberTable<Self>> {
        let mut builder = MemberTableBuilder::new();
        Self::describe(&mut builder);
        builder.build()
    }
}

/// Type-erased component, as held by a container slot
pub trait Component: Send + 'static {
    fn id(&self) -> &'static str;

    fn start(&mut self, parameters: &[Value]) -> Result<()>;

    fn run(&mut self, parameters: &[Value]) -> Result<()>;

    fn get_member(&self, name: &str) -> Result<Value>;

    fn set_member(&mut self, name: &str, value: Value) -> Result<()>;

    /// Invoke a method by name. Methods with no result return [`Value::Null`].
    fn invoke_method(&mut self, name: &str, parameters: &[Value]) -> Result<Value>;

    /// Registered members in name order
    fn members(&self) -> Vec<MemberInfo>;

    /// Allow downcasting to the concrete behavior
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Adapts a [`Behavior`] into a [`Component`] backed by its member table
pub struct Reflected<S: Behavior> {
    behavior: S,
    table: Arc<MemberTable<S>>,
}

impl<S: Behavior> Reflected<S> {
    /// Wrap a behavior, building its member table
    pub fn new(behavior: S) -> Result<Self> {
        Ok(Self::with_table(behavior, Arc::new(S::member_table()?)))
    }

    /// Wrap a behavior with an already built (usually shared) member table
    pub fn with_table(behavior: S, table: Arc<MemberTable<S>>) -> Self {
        Self { behavior, table }
    }

    /// Wrap and box in one step
    pub fn boxed(behavior: S) -> Result<Box<dyn Component>> {
        Ok(Box::new(Self::new(behavior)?))
    }

    pub fn behavior(&self) -> &S {
        &self.behavior
    }

    pub fn behavior_mut(&mut self) -> &mut S {
        &mut self.behavior
    }

    pub fn into_inner(self) -> S {
        self.behavior
    }
}

impl<S: Behavior> Component for Reflected<S> {
    fn id(&self) -> &'static str {
        S::ID
    }

    fn start(&mut self, parameters: &[Value]) -> Result<()> {
        self.behavior
            .start(parameters)
            .map_err(|e| ScriptError::invocation("start", e))
    }

    fn run(&mut self, parameters: &[Value]) -> Result<()> {
        self.behavior
            .run(parameters)
            .map_err(|e| ScriptError::invocation("run", e))
    }

    fn get_member(&self, name: &str) -> Result<Value> {
        self.table.get(&self.behavior, name)
    }

    fn set_member(&mut self, name: &str, value: Value) -> Result<()> {
        self.table.set(&mut self.behavior, name, value)
    }

    fn invoke_method(&mut self, name: &str, parameters: &[Value]) -> Result<Value> {
        self.table.invoke(&mut self.behavior, name, parameters)
    }

    fn members(&self) -> Vec<MemberInfo> {
        self.table.describe()
    }

    fn as_any(&self) -> &dyn Any {
        &self.behavior
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        &mut self.behavior
    }
}
