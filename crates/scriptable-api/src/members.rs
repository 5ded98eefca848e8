use bitflags::bitflags;
use std::collections::{BTreeMap, HashMap};

use crate::args::{BindError, FromArgs};
use crate::error::{Result, ScriptError};
use crate::value::{FromValue, Value, ValueKind};

bitflags! {
    /// Access modes a data member supports
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Access: u8 {
        const READ = 0b01;
        const WRITE = 0b10;
    }
}

type Getter<S> = Box<dyn Fn(&S) -> Value + Send + Sync>;
type Setter<S> = Box<dyn Fn(&mut S, Value) -> Result<(), Value> + Send + Sync>;
type Invoker<S> = Box<dyn Fn(&mut S, &[Value]) -> Result<Value, InvokeError> + Send + Sync>;

enum InvokeError {
    Bind(BindError),
    Body(anyhow::Error),
}

struct DataMember<S> {
    kind: ValueKind,
    getter: Option<Getter<S>>,
    setter: Option<Setter<S>>,
}

impl<S> DataMember<S> {
    fn access(&self) -> Access {
        let mut access = Access::empty();
        if self.getter.is_some() {
            access |= Access::READ;
        }
        if self.setter.is_some() {
            access |= Access::WRITE;
        }
        access
    }
}

struct MethodMember<S> {
    arity: Option<usize>,
    invoker: Invoker<S>,
}

enum Entry<S> {
    Data(DataMember<S>),
    Method(MethodMember<S>),
}

/// What an inspector can learn about a registered member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    pub name: String,
    pub kind: MemberKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Data { value: ValueKind, access: Access },
    /// `arity` is `None` for variadic methods
    Method { arity: Option<usize> },
}

/// Explicit name -> accessor mapping for one component type.
///
/// Every name resolves to exactly one entry; ambiguity is rejected when the
/// table is built, so lookups only ever fail with "not found" or an access
/// mode error.
pub struct MemberTable<S> {
    entries: BTreeMap<String, Entry<S>>,
}

impl<S: 'static> MemberTable<S> {
    pub fn builder() -> MemberTableBuilder<S> {
        MemberTableBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Read a data member
    pub fn get(&self, target: &S, name: &str) -> Result<Value> {
        match self.entries.get(name) {
            Some(Entry::Data(member)) => match &member.getter {
                Some(getter) => Ok(getter(target)),
                None => Err(ScriptError::MemberNotReadable {
                    member: name.to_string(),
                }),
            },
            _ => Err(ScriptError::MemberNotFound {
                member: name.to_string(),
            }),
        }
    }

    /// Write a data member. On a type mismatch the member is left untouched.
    pub fn set(&self, target: &mut S, name: &str, value: Value) -> Result<()> {
        let member = match self.entries.get(name) {
            Some(Entry::Data(member)) => member,
            _ => {
                return Err(ScriptError::MemberNotFound {
                    member: name.to_string(),
                })
            }
        };

        let Some(setter) = &member.setter else {
            return Err(ScriptError::MemberNotWritable {
                member: name.to_string(),
            });
        };

        setter(target, value).map_err(|rejected| ScriptError::TypeMismatch {
            member: name.to_string(),
            expected: member.kind,
            found: rejected.kind(),
        })
    }

    /// Invoke a method, binding `parameters` positionally to its signature
    pub fn invoke(&self, target: &mut S, name: &str, parameters: &[Value]) -> Result<Value> {
        let method = match self.entries.get(name) {
            Some(Entry::Method(method)) => method,
            _ => {
                return Err(ScriptError::MethodNotFound {
                    method: name.to_string(),
                })
            }
        };

        (method.invoker)(target, parameters).map_err(|e| match e {
            InvokeError::Bind(bind) => ScriptError::argument_mismatch(name, bind.to_string()),
            InvokeError::Body(source) => ScriptError::invocation(name, source),
        })
    }

    /// Registered members in name order
    pub fn describe(&self) -> Vec<MemberInfo> {
        self.entries
            .iter()
            .map(|(name, entry)| MemberInfo {
                name: name.clone(),
                kind: match entry {
                    Entry::Data(member) => MemberKind::Data {
                        value: member.kind,
                        access: member.access(),
                    },
                    Entry::Method(method) => MemberKind::Method {
                        arity: method.arity,
                    },
                },
            })
            .collect()
    }
}

/// Collects member registrations for a component type
pub struct MemberTableBuilder<S> {
    entries: Vec<(String, Entry<S>)>,
}

impl<S: 'static> MemberTableBuilder<S> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a readable and writable field through a pair of projections
    pub fn field<F, G, M>(&mut self, name: &str, get: G, get_mut: M) -> &mut Self
    where
        F: FromValue + Into<Value> + Clone + 'static,
        G: Fn(&S) -> &F + Send + Sync + 'static,
        M: Fn(&mut S) -> &mut F + Send + Sync + 'static,
    {
        self.push_data(
            name,
            F::KIND,
            Some(Box::new(move |target: &S| -> Value {
                get(target).clone().into()
            })),
            Some(Box::new(move |target: &mut S, value: Value| -> Result<(), Value> {
                *get_mut(target) = F::from_value(value)?;
                Ok(())
            })),
        )
    }

    /// Register a member that can be read but not written
    pub fn read_only<F, G>(&mut self, name: &str, get: G) -> &mut Self
    where
        F: Into<Value> + 'static,
        G: Fn(&S) -> F + Send + Sync + 'static,
    {
        // Without a FromValue bound the declared kind is only known at read time
        self.push_data(
            name,
            ValueKind::Any,
            Some(Box::new(move |target: &S| -> Value { get(target).into() })),
            None,
        )
    }

    /// Register a member that can be written but not read
    pub fn write_only<F, W>(&mut self, name: &str, set: W) -> &mut Self
    where
        F: FromValue + 'static,
        W: Fn(&mut S, F) + Send + Sync + 'static,
    {
        self.push_data(
            name,
            F::KIND,
            None,
            Some(Box::new(move |target: &mut S, value: Value| -> Result<(), Value> {
                set(target, F::from_value(value)?);
                Ok(())
            })),
        )
    }

    /// Register a computed member with explicit typed getter and setter
    pub fn property<F, G, W>(&mut self, name: &str, get: G, set: W) -> &mut Self
    where
        F: FromValue + Into<Value> + 'static,
        G: Fn(&S) -> F + Send + Sync + 'static,
        W: Fn(&mut S, F) + Send + Sync + 'static,
    {
        self.push_data(
            name,
            F::KIND,
            Some(Box::new(move |target: &S| -> Value { get(target).into() })),
            Some(Box::new(move |target: &mut S, value: Value| -> Result<(), Value> {
                set(target, F::from_value(value)?);
                Ok(())
            })),
        )
    }

    /// Register a method taking a typed argument tuple
    pub fn method<A, R, F>(&mut self, name: &str, body: F) -> &mut Self
    where
        A: FromArgs + 'static,
        R: Into<Value> + 'static,
        F: Fn(&mut S, A) -> anyhow::Result<R> + Send + Sync + 'static,
    {
        let invoker: Invoker<S> = Box::new(
            move |target: &mut S, parameters: &[Value]| -> Result<Value, InvokeError> {
                let args = A::from_args(parameters).map_err(InvokeError::Bind)?;
                body(target, args).map(Into::into).map_err(InvokeError::Body)
            },
        );

        self.entries.push((
            name.to_string(),
            Entry::Method(MethodMember {
                arity: A::ARITY,
                invoker,
            }),
        ));
        self
    }

    fn push_data(
        &mut self,
        name: &str,
        kind: ValueKind,
        getter: Option<Getter<S>>,
        setter: Option<Setter<S>>,
    ) -> &mut Self {
        self.entries.push((
            name.to_string(),
            Entry::Data(DataMember {
                kind,
                getter,
                setter,
            }),
        ));
        self
    }

    /// Finish registration. Names must be unique, ignoring ASCII case.
    pub fn build(self) -> Result<MemberTable<S>> {
        let mut folded: HashMap<String, String> = HashMap::new();
        let mut entries = BTreeMap::new();

        for (name, entry) in self.entries {
            if let Some(previous) = folded.insert(name.to_ascii_lowercase(), name.clone()) {
                let name = if previous == name {
                    name
                } else {
                    format!("{}/{}", previous, name)
                };
                return Err(ScriptError::MemberAmbiguous { name });
            }
            entries.insert(name, entry);
        }

        Ok(MemberTable { entries })
    }
}

impl<S: 'static> Default for MemberTableBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Turret {
        heat: i64,
        label: String,
        target: Option<String>,
        secret: u32,
    }

    fn table() -> MemberTable<Turret> {
        let mut builder = MemberTable::builder();
        builder
            .field("heat", |t: &Turret| &t.heat, |t: &mut Turret| &mut t.heat)
            .read_only("label", |t: &Turret| t.label.clone())
            .write_only("secret", |t: &mut Turret, v: u32| t.secret = v)
            .property(
                "target",
                |t: &Turret| t.target.clone(),
                |t: &mut Turret, v: Option<String>| t.target = v,
            )
            .method("cool", |t: &mut Turret, (by,): (i64,)| {
                t.heat -= by;
                Ok(t.heat)
            })
            .method("jam", |_: &mut Turret, ()| -> anyhow::Result<()> {
                anyhow::bail!("mechanism jammed")
            });
        builder.build().expect("unique names")
    }

    #[test]
    fn test_field_round_trip() {
        let table = table();
        let mut turret = Turret::default();
        table.set(&mut turret, "heat", Value::Int(40)).unwrap();
        assert_eq!(table.get(&turret, "heat").unwrap(), Value::Int(40));
        assert_eq!(turret.heat, 40);
    }

    #[test]
    fn test_access_modes() {
        let table = table();
        let mut turret = Turret::default();

        assert!(matches!(
            table.set(&mut turret, "label", Value::from("x")),
            Err(ScriptError::MemberNotWritable { .. })
        ));
        assert!(matches!(
            table.get(&turret, "secret"),
            Err(ScriptError::MemberNotReadable { .. })
        ));
        table.set(&mut turret, "secret", Value::Int(9)).unwrap();
        assert_eq!(turret.secret, 9);
    }

    #[test]
    fn test_type_mismatch_leaves_member_untouched() {
        let table = table();
        let mut turret = Turret {
            heat: 5,
            ..Default::default()
        };

        let err = table
            .set(&mut turret, "heat", Value::from("hot"))
            .unwrap_err();
        match err {
            ScriptError::TypeMismatch {
                member,
                expected,
                found,
            } => {
                assert_eq!(member, "heat");
                assert_eq!(expected, ValueKind::Int);
                assert_eq!(found, ValueKind::Str);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(turret.heat, 5);
    }

    #[test]
    fn test_optional_property_accepts_null() {
        let table = table();
        let mut turret = Turret::default();
        table
            .set(&mut turret, "target", Value::from("drone"))
            .unwrap();
        assert_eq!(turret.target.as_deref(), Some("drone"));
        table.set(&mut turret, "target", Value::Null).unwrap();
        assert_eq!(table.get(&turret, "target").unwrap(), Value::Null);
    }

    #[test]
    fn test_methods_and_data_resolve_separately() {
        let table = table();
        let mut turret = Turret::default();

        assert!(matches!(
            table.get(&turret, "cool"),
            Err(ScriptError::MemberNotFound { .. })
        ));
        assert!(matches!(
            table.invoke(&mut turret, "heat", &[]),
            Err(ScriptError::MethodNotFound { .. })
        ));
        assert_eq!(
            table.invoke(&mut turret, "cool", &[Value::Int(3)]).unwrap(),
            Value::Int(-3)
        );
    }

    #[test]
    fn test_argument_mismatch() {
        let table = table();
        let mut turret = Turret::default();

        assert!(matches!(
            table.invoke(&mut turret, "cool", &[]),
            Err(ScriptError::ArgumentMismatch { .. })
        ));
        assert!(matches!(
            table.invoke(&mut turret, "cool", &[Value::Bool(true)]),
            Err(ScriptError::ArgumentMismatch { .. })
        ));
        assert_eq!(turret.heat, 0);
    }

    #[test]
    fn test_invocation_failure_keeps_cause() {
        let table = table();
        let mut turret = Turret::default();

        let err = table.invoke(&mut turret, "jam", &[]).unwrap_err();
        let ScriptError::InvocationFailure { target, source } = &err else {
            panic!("unexpected error: {err:?}");
        };
        assert_eq!(target, "jam");
        assert_eq!(source.to_string(), "mechanism jammed");
        assert_eq!(
            std::error::Error::source(&err).map(|e| e.to_string()),
            Some("mechanism jammed".to_string())
        );
    }

    #[test]
    fn test_duplicate_names_are_ambiguous() {
        let mut builder = MemberTable::<Turret>::builder();
        builder
            .field("heat", |t: &Turret| &t.heat, |t: &mut Turret| &mut t.heat)
            .method("heat", |_: &mut Turret, ()| Ok(()));
        assert!(matches!(
            builder.build(),
            Err(ScriptError::MemberAmbiguous { name }) if name == "heat"
        ));
    }

    #[test]
    fn test_case_clash_is_ambiguous() {
        let mut builder = MemberTable::<Turret>::builder();
        builder
            .field("heat", |t: &Turret| &t.heat, |t: &mut Turret| &mut t.heat)
            .read_only("Heat", |t: &Turret| t.heat);
        assert!(matches!(
            builder.build(),
            Err(ScriptError::MemberAmbiguous { name }) if name == "heat/Heat"
        ));
    }

    #[test]
    fn test_describe_reports_kinds() {
        let info = table().describe();
        let names: Vec<&str> = info.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["cool", "heat", "jam", "label", "secret", "target"]);
        assert_eq!(
            info[1].kind,
            MemberKind::Data {
                value: ValueKind::Int,
                access: Access::READ | Access::WRITE,
            }
        );
        assert_eq!(info[0].kind, MemberKind::Method { arity: Some(1) });
        assert_eq!(
            info[4].kind,
            MemberKind::Data {
                value: ValueKind::Int,
                access: Access::WRITE,
            }
        );
    }
}
