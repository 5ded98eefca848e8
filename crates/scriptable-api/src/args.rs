use crate::value::{FromValue, Value, ValueKind};

/// Why a parameter list failed to bind to a signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    Count { expected: usize, found: usize },
    Type {
        position: usize,
        expected: ValueKind,
        found: ValueKind,
    },
}

impl std::fmt::Display for BindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BindError::Count { expected, found } => {
                write!(f, "expected {} argument(s), got {}", expected, found)
            }
            BindError::Type {
                position,
                expected,
                found,
            } => write!(
                f,
                "argument {} expects {}, got {}",
                position, expected, found
            ),
        }
    }
}

/// Positional binding of a parameter list to a typed argument tuple
pub trait FromArgs: Sized {
    /// Number of parameters accepted, `None` for variadic
    const ARITY: Option<usize>;

    fn from_args(args: &[Value]) -> Result<Self, BindError>;
}

impl FromArgs for Vec<Value> {
    const ARITY: Option<usize> = None;

    fn from_args(args: &[Value]) -> Result<Self, BindError> {
        Ok(args.to_vec())
    }
}

fn bind_one<T: FromValue>(args: &[Value], position: usize) -> Result<T, BindError> {
    let value = args[position].clone();
    T::from_value(value).map_err(|rejected| BindError::Type {
        position,
        expected: T::KIND,
        found: rejected.kind(),
    })
}

macro_rules! tuple_from_args {
    ($len:expr; $($name:ident : $idx:tt),*) => {
        impl<$($name: FromValue),*> FromArgs for ($($name,)*) {
            const ARITY: Option<usize> = Some($len);

            #[allow(unused_variables)]
            fn from_args(args: &[Value]) -> Result<Self, BindError> {
                if args.len() != $len {
                    return Err(BindError::Count {
                        expected: $len,
                        found: args.len(),
                    });
                }
                Ok(($(bind_one::<$name>(args, $idx)?,)*))
            }
        }
    };
}

tuple_from_args!(0;);
tuple_from_args!(1; A: 0);
tuple_from_args!(2; A: 0, B: 1);
tuple_from_args!(3; A: 0, B: 1, C: 2);
tuple_from_args!(4; A: 0, B: 1, C: 2, D: 3);
