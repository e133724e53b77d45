use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use morph_config::MappingConfig;
use morph_core::{CopyLevel, ReusePolicy};
use morph_types::Type;

type NameFilter = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Per-call mapping configuration. Cheap to clone.
#[derive(Clone, Default)]
pub struct MappingOptions {
    copy_level: CopyLevel,
    reuse: ReusePolicy,
    include: Option<HashSet<String>>,
    exclude: HashSet<String>,
    name_filter: Option<NameFilter>,
    type_overrides: Vec<TypeOverride>,
    ignore_null: bool,
    strict: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct TypeOverride {
    source: Type,
    target: Type,
    replacement: Type,
}

impl MappingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options seeded from the `[mapping]` configuration section.
    pub fn from_config(config: &MappingConfig) -> Self {
        let mut options = Self::new()
            .with_copy_level(config.copy_level)
            .with_reuse(config.reuse)
            .with_ignore_null(config.ignore_null)
            .with_strict(config.strict);
        if !config.include.is_empty() {
            options = options.with_include(config.include.iter().cloned());
        }
        options.with_exclude(config.exclude.iter().cloned())
    }

    pub fn copy_level(&self) -> CopyLevel {
        self.copy_level
    }

    pub fn reuse(&self) -> ReusePolicy {
        self.reuse
    }

    pub fn ignore_null(&self) -> bool {
        self.ignore_null
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    #[must_use]
    pub fn with_copy_level(mut self, level: CopyLevel) -> Self {
        self.copy_level = level;
        self
    }

    #[must_use]
    pub fn with_reuse(mut self, reuse: ReusePolicy) -> Self {
        self.reuse = reuse;
        self
    }

    /// Only transfer the named properties.
    #[must_use]
    pub fn with_include<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include
            .get_or_insert_with(HashSet::new)
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Never transfer the named properties.
    #[must_use]
    pub fn with_exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(names.into_iter().map(Into::into));
        self
    }

    /// Only transfer properties whose name satisfies `filter`, in addition to any include and
    /// exclude lists.
    #[must_use]
    pub fn with_name_filter(mut self, filter: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.name_filter = Some(Arc::new(filter));
        self
    }

    /// Map values declared as `source` to `replacement` wherever `target` is requested.
    #[must_use]
    pub fn with_type_override(mut self, source: Type, target: Type, replacement: Type) -> Self {
        self.type_overrides.push(TypeOverride {
            source,
            target,
            replacement,
        });
        self
    }

    #[must_use]
    pub fn with_ignore_null(mut self, ignore_null: bool) -> Self {
        self.ignore_null = ignore_null;
        self
    }

    /// Treat a property no handler can map as an error instead of skipping it.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn accepts_name(&self, name: &str) -> bool {
        if self.exclude.contains(name) {
            return false;
        }
        if self.include.as_ref().is_some_and(|include| !include.contains(name)) {
            return false;
        }
        self.name_filter.as_ref().map_or(true, |filter| filter(name))
    }

    /// The replacement registered for the `(source, target)` pair, if any.
    pub fn type_override(&self, source: &Type, target: &Type) -> Option<&Type> {
        self.type_overrides
            .iter()
            .find(|o| o.source == *source && o.target == *target)
            .map(|o| &o.replacement)
    }
}

impl fmt::Debug for MappingOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingOptions")
            .field("copy_level", &self.copy_level)
            .field("reuse", &self.reuse)
            .field("include", &self.include)
            .field("exclude", &self.exclude)
            .field("name_filter", &self.name_filter.as_ref().map(|_| ".."))
            .field("type_overrides", &self.type_overrides)
            .field("ignore_null", &self.ignore_null)
            .field("strict", &self.strict)
            .finish()
    }
}
