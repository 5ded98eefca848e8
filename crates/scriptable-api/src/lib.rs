//! Component API for scriptable containers
//!
//! Component authors implement [`Behavior`] and register the members they want
//! reachable by name. Hosts only ever see the erased [`Component`] trait and
//! talk to it through [`Value`]s.

pub mod args;
pub mod component;
pub mod error;
pub mod members;
pub mod value;

pub use args::{BindError, FromArgs};
pub use component::{Behavior, Component, Reflected};
pub use error::{Result, ScriptError};
pub use members::{Access, MemberInfo, MemberKind, MemberTable, MemberTableBuilder};
pub use value::{FromValue, Value, ValueKind};

/// Bind a parameter list to a typed tuple inside `start`/`run`.
///
/// ```ignore
/// let (seed,) = scriptable_api::bind::<(i64,)>("start", parameters)?;
/// ```
pub fn bind<A: FromArgs>(target: &str, parameters: &[Value]) -> Result<A> {
    A::from_args(parameters).map_err(|e| ScriptError::argument_mismatch(target, e.to_string()))
}
