use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Controls when a source value may be handed to the target unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CopyLevel {
    /// Reuse only when the source type and the target type are identical.
    Equal,
    /// Reuse whenever the source type is assignable to the target type.
    #[default]
    Assignable,
}

/// Which kinds of values may be reused once the copy level allows it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReusePolicy {
    /// Any value, including shared objects and containers.
    #[default]
    Shared,
    /// Only immutable values (scalars, strings, enum constants). Objects, lists and maps are
    /// always converted into fresh instances.
    Immutable,
}
