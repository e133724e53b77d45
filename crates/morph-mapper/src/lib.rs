//! Value conversion between types.
//!
//! A [`Mapper`] converts a value of one static type into a value of another by running a chain of
//! [`MapperHandler`]s until one produces a result. The default chain reuses values that already
//! fit, converts scalars, enums and containers, and builds structured targets (beans, dynamic
//! maps, protobuf-style builders) property by property through [`transfer`].

use morph_schema::SchemaResolutionError;
use morph_types::InvokeError;
use thiserror::Error;

pub mod handlers;
mod mapper;
mod options;
mod request;
mod structured;

pub use handlers::default_handlers;
pub use mapper::Mapper;
pub use options::MappingOptions;
pub use request::{MapRequest, MapperHandler};
pub use structured::{
    sink_for, source_for, transfer, BuilderSink, MapSink, MapSource, ObjectSink, ObjectSource,
    SinkSlot, StructuredSink, StructuredSource, TransferError, TransferReport,
};

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("mapper handler `{handler}` failed mapping `{source_type}` to `{target_type}`")]
    Handler {
        handler: &'static str,
        source_type: String,
        target_type: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("no mapping from `{source_type}` to `{target_type}`")]
    NoMapping {
        source_type: String,
        target_type: String,
    },
    #[error("failed to map property `{property}` of `{owner}`")]
    Property {
        property: String,
        owner: String,
        #[source]
        source: Box<MappingError>,
    },
    #[error(transparent)]
    Schema(#[from] SchemaResolutionError),
    #[error(transparent)]
    Invoke(#[from] InvokeError),
    #[error("`{0}` has no readable or writable structure")]
    NotStructured(String),
}

pub type Result<T, E = MappingError> = std::result::Result<T, E>;
