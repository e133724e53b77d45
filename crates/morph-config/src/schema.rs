use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::MorphConfig;

/// JSON schema for `morph.toml`, for editor tooling and CI validation.
#[must_use]
pub fn json_schema() -> RootSchema {
    let mut schema = schema_for!(MorphConfig);
    let metadata = schema.schema.metadata();
    metadata.title = Some("morph.toml".to_owned());
    metadata.description = Some("Configuration for the morph mapping engine.".to_owned());
    schema
}
