use crate::value::ValueKind;

/// Errors raised by member access, method invocation and slot management
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("slot index {index} is out of range for {len} slots")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("slot {index} is empty")]
    SlotEmpty { index: usize },

    #[error("no member named `{member}`")]
    MemberNotFound { member: String },

    #[error("no method named `{method}`")]
    MethodNotFound { method: String },

    #[error("name `{name}` resolves to more than one member")]
    MemberAmbiguous { name: String },

    #[error("member `{member}` is not readable")]
    MemberNotReadable { member: String },

    #[error("member `{member}` is not writable")]
    MemberNotWritable { member: String },

    #[error("member `{member}` expects {expected}, got {found}")]
    TypeMismatch {
        member: String,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("arguments for `{target}` do not bind: {reason}")]
    ArgumentMismatch { target: String, reason: String },

    #[error("`{target}` failed")]
    InvocationFailure {
        target: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("slot {index} failed to start")]
    SlotFailure {
        index: usize,
        #[source]
        source: Box<ScriptError>,
    },
}

impl ScriptError {
    pub fn invocation(target: impl Into<String>, source: anyhow::Error) -> Self {
        ScriptError::InvocationFailure {
            target: target.into(),
            source,
        }
    }

    pub fn argument_mismatch(target: impl Into<String>, reason: impl Into<String>) -> Self {
        ScriptError::ArgumentMismatch {
            target: target.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = ScriptError> = std::result::Result<T, E>;
