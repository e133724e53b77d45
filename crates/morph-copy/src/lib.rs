//! Property-wise copying between objects, dynamic maps and builders.
//!
//! [`Copier::copy`] writes every compatible named property of a source into an existing target.
//! The source is read through its schema (or directly, for dynamic maps); the target is written
//! through its setters, its map entries or its builder setters, chosen by the target's runtime
//! shape. Each property is converted by the [`Mapper`].

use morph_mapper::{
    sink_for, source_for, transfer, Mapper, MappingError, MappingOptions, TransferError,
    TransferReport,
};
use morph_types::{format_type, Type, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CopyError {
    #[error("failed to copy property `{property}` into `{owner}`")]
    Property {
        property: String,
        owner: String,
        #[source]
        source: MappingError,
    },
    #[error("no mapping for property `{property}` of `{owner}`")]
    NotApplicable { property: String, owner: String },
    #[error("cannot copy into a value of type `{0}`")]
    UnsupportedTarget(String),
    #[error("cannot copy from a value of type `{0}`")]
    UnsupportedSource(String),
    #[error(transparent)]
    Mapping(#[from] MappingError),
}

impl From<TransferError> for CopyError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::Property {
                property,
                owner,
                source,
            } => CopyError::Property {
                property,
                owner,
                source,
            },
            TransferError::NotApplicable {
                property, owner, ..
            } => CopyError::NotApplicable { property, owner },
        }
    }
}

pub type Result<T, E = CopyError> = std::result::Result<T, E>;

/// Property names a copy wrote and skipped, in target order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyReport {
    pub written: Vec<String>,
    pub skipped: Vec<String>,
}

impl From<TransferReport> for CopyReport {
    fn from(report: TransferReport) -> Self {
        Self {
            written: report.written,
            skipped: report.skipped,
        }
    }
}

/// Copies properties between structured values.
#[derive(Clone)]
pub struct Copier {
    mapper: Mapper,
}

impl Copier {
    pub fn new(mapper: Mapper) -> Self {
        Self { mapper }
    }

    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    /// Copy every property of `source` that `target` can take.
    ///
    /// Target properties the source lacks are left alone. Properties that cannot be converted are
    /// skipped, or fail the copy with [`CopyError::NotApplicable`] under
    /// [`MappingOptions::strict`].
    pub fn copy(
        &self,
        source: &Value,
        source_type: &Type,
        target: &Value,
        target_type: &Type,
        options: &MappingOptions,
    ) -> Result<CopyReport> {
        let env = self.mapper.env();
        let reader = source_for(&self.mapper, source, source_type)?
            .ok_or_else(|| CopyError::UnsupportedSource(format_type(env, source_type)))?;
        let mut sink = sink_for(&self.mapper, target, target_type)?
            .ok_or_else(|| CopyError::UnsupportedTarget(format_type(env, target_type)))?;

        let report: CopyReport =
            transfer(&self.mapper, reader.as_ref(), sink.as_mut(), options)?.into();
        tracing::debug!(
            target = "morph.copy",
            owner = sink.owner(),
            written = report.written.len(),
            skipped = report.skipped.len(),
            "copied properties"
        );
        Ok(report)
    }

    /// Convert `source` into a fresh value of `target_type` through the full mapping pipeline.
    pub fn copy_into_new(
        &self,
        source: &Value,
        source_type: &Type,
        target_type: &Type,
        options: &MappingOptions,
    ) -> Result<Value> {
        Ok(self
            .mapper
            .map_required(source, source_type, target_type, options)?)
    }
}
