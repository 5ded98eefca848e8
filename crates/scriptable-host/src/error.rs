use scriptable_api::ScriptError;

use crate::config::ConfigLoadError;

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error("unknown component id `{id}`")]
    UnknownComponent { id: String },

    #[error(transparent)]
    Config(#[from] ConfigLoadError),
}
