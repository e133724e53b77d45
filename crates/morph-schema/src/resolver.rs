use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use morph_core::{merge_tags, Flow, HandlerChain, Tag};
use morph_types::{
    format_type, Bindings, ClassId, ClassType, ResolveError, Type, TypeEnv, TypeResolver,
    TypeStore, Visibility, WildcardBound,
};

use crate::context::Slot;
use crate::handlers::{BeanAccessorHandler, ProtobufAccessorHandler};
use crate::{
    MethodInfo, PropertyParts, Result, Schema, SchemaCache, SchemaContext, SchemaHandler,
    SchemaResolutionError,
};

/// The default recognizer chain: protobuf accessors first, then JavaBeans conventions.
pub fn default_handlers() -> HandlerChain<dyn SchemaHandler> {
    HandlerChain::new(vec![
        Arc::new(ProtobufAccessorHandler) as Arc<dyn SchemaHandler>,
        Arc::new(BeanAccessorHandler),
    ])
}

/// Builds and caches [`Schema`]s.
///
/// Cloning is cheap; clones share the store, the handler chain and the cache.
#[derive(Clone)]
pub struct SchemaResolver {
    store: Arc<TypeStore>,
    handlers: HandlerChain<dyn SchemaHandler>,
    cache: Arc<SchemaCache>,
    types: TypeResolver,
}

impl SchemaResolver {
    pub fn new(store: Arc<TypeStore>) -> Self {
        Self {
            store,
            handlers: default_handlers(),
            cache: Arc::new(SchemaCache::new()),
            types: TypeResolver::new(),
        }
    }

    /// A resolver using `handlers`. Schemas depend on the chain, so the new resolver gets a
    /// fresh cache.
    #[must_use]
    pub fn with_handlers(&self, handlers: HandlerChain<dyn SchemaHandler>) -> Self {
        Self {
            store: Arc::clone(&self.store),
            handlers,
            cache: Arc::new(SchemaCache::new()),
            types: self.types,
        }
    }

    #[must_use]
    pub fn with_cache(&self, cache: Arc<SchemaCache>) -> Self {
        Self {
            cache,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_type_resolver(&self, types: TypeResolver) -> Self {
        Self {
            types,
            cache: Arc::new(SchemaCache::new()),
            ..self.clone()
        }
    }

    pub fn store(&self) -> &Arc<TypeStore> {
        &self.store
    }

    pub fn env(&self) -> &dyn TypeEnv {
        self.store.as_ref()
    }

    pub fn handlers(&self) -> &HandlerChain<dyn SchemaHandler> {
        &self.handlers
    }

    pub fn cache(&self) -> &Arc<SchemaCache> {
        &self.cache
    }

    pub fn type_resolver(&self) -> &TypeResolver {
        &self.types
    }

    /// The schema of `ty`, built on first use and cached afterwards.
    pub fn resolve(&self, ty: &Type) -> Result<Arc<Schema>> {
        let key = self.normalize(ty)?;
        if let Some(schema) = self.cache.get(&key) {
            tracing::trace!(
                target = "morph.schema",
                ty = %format_type(self.env(), &key),
                "schema cache hit"
            );
            return Ok(schema);
        }

        let schema = self.build(&key)?;
        tracing::debug!(
            target = "morph.schema",
            ty = %format_type(self.env(), &key),
            properties = schema.len(),
            methods = schema.methods().len(),
            "built schema"
        );
        Ok(self.cache.publish(key, schema))
    }

    /// The cache key for `ty`: top-level variables and wildcards are replaced by their bounds,
    /// primitives by their boxed class.
    fn normalize(&self, ty: &Type) -> Result<Type> {
        let env = self.env();
        let resolved = self
            .types
            .resolve(env, ty, &Bindings::new())
            .map_err(|err| substitution_error(env, ty, err))?;
        Ok(match resolved {
            Type::Primitive(prim) => Type::class(env.well_known().boxed(prim), vec![]),
            Type::Wildcard(WildcardBound::Super(_)) => env.well_known().object_type(),
            other => other,
        })
    }

    fn build(&self, ty: &Type) -> Result<Arc<Schema>> {
        let env = self.env();
        let Type::Class(class) = ty else {
            return Ok(Schema::assemble(ty.clone(), Vec::new(), Vec::new()));
        };
        if env.class(class.def).is_none() {
            return Err(SchemaResolutionError::UnknownClass {
                ty: format_type(env, ty),
            });
        }

        let bindings = self.types.bindings(env, class);
        let methods = self.collect_methods(env, ty, class, &bindings)?;

        let mut ctx = SchemaContext::new(env, ty);
        'methods: for method in &methods {
            for handler in self.handlers.iter() {
                let flow = handler.try_schema(&mut ctx, method).map_err(|source| {
                    SchemaResolutionError::Handler {
                        ty: format_type(env, ty),
                        handler: handler.name(),
                        source,
                    }
                })?;
                match flow {
                    Flow::Continue => continue,
                    Flow::Done(()) => {
                        tracing::trace!(
                            target = "morph.schema",
                            method = %method.name,
                            handler = handler.name(),
                            "accessor claimed"
                        );
                        continue 'methods;
                    }
                    Flow::Stop => break 'methods,
                }
            }
        }

        let field_tags = self.collect_field_tags(env, class.def);
        let properties = ctx
            .into_slots()
            .into_iter()
            .filter_map(|(name, slot)| finalize(name, slot, &field_tags))
            .collect();
        Ok(Schema::assemble(ty.clone(), properties, methods))
    }

    /// Public instance methods reachable from `class`, subtype declarations first. A supertype
    /// method with the same name and resolved parameters as an earlier one is overridden and
    /// skipped.
    fn collect_methods(
        &self,
        env: &dyn TypeEnv,
        ty: &Type,
        class: &ClassType,
        bindings: &Bindings,
    ) -> Result<Vec<MethodInfo>> {
        let mut out = Vec::new();
        let mut signatures: HashSet<(String, Vec<Type>)> = HashSet::new();
        for id in ancestry(env, class.def) {
            let Some(def) = env.class(id) else {
                continue;
            };
            for (index, method) in def.methods.iter().enumerate() {
                if method.is_static || method.visibility != Visibility::Public {
                    continue;
                }
                let resolve = |t: &Type| {
                    self.types
                        .resolve(env, t, bindings)
                        .map_err(|err| substitution_error(env, ty, err))
                };
                let params = method
                    .params
                    .iter()
                    .map(|param| resolve(param))
                    .collect::<Result<Vec<_>>>()?;
                if !signatures.insert((method.name.clone(), params.clone())) {
                    continue;
                }
                out.push(MethodInfo {
                    declaring: id,
                    index,
                    name: method.name.clone(),
                    params,
                    return_type: resolve(&method.return_type)?,
                    tags: method.tags.clone(),
                });
            }
        }
        Ok(out)
    }

    /// Field tags by field name, subtype fields first.
    fn collect_field_tags(&self, env: &dyn TypeEnv, class: ClassId) -> Vec<(String, Vec<Tag>)> {
        ancestry(env, class)
            .into_iter()
            .filter_map(|id| env.class(id))
            .flat_map(|def| def.fields.iter())
            .filter(|field| !field.is_static && !field.tags.is_empty())
            .map(|field| (field.name.clone(), field.tags.clone()))
            .collect()
    }
}

/// `class` followed by its ancestors in breadth-first order, each once.
fn ancestry(env: &dyn TypeEnv, class: ClassId) -> Vec<ClassId> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([class]);
    while let Some(id) = queue.pop_front() {
        if !seen.insert(id) {
            continue;
        }
        out.push(id);
        if let Some(def) = env.class(id) {
            queue.extend(def.supertypes().filter_map(Type::class_id));
        }
    }
    out
}

fn finalize(name: String, slot: Slot, field_tags: &[(String, Vec<Tag>)]) -> Option<PropertyParts> {
    let (ty, getter, setter) = match (slot.getter, slot.setter) {
        (Some(getter), Some(setter)) if getter.ty == setter.ty => {
            (getter.ty, Some(getter.method), Some(setter.method))
        }
        // Disagreeing accessor types: keep the getter only.
        (Some(getter), _) => (getter.ty, Some(getter.method), None),
        (None, Some(setter)) => (setter.ty, None, Some(setter.method)),
        (None, None) => return None,
    };

    let mut tags = Vec::new();
    for accessor in getter.iter().chain(setter.iter()) {
        merge_tags(&mut tags, &accessor.tags);
    }
    if let Some((_, extra)) = field_tags.iter().find(|(field, _)| *field == name) {
        merge_tags(&mut tags, extra);
    }

    Some(PropertyParts {
        name,
        ty,
        getter,
        setter,
        tags,
    })
}

fn substitution_error(env: &dyn TypeEnv, ty: &Type, err: ResolveError) -> SchemaResolutionError {
    match err {
        ResolveError::DepthExceeded { depth } => SchemaResolutionError::Substitution {
            ty: format_type(env, ty),
            depth,
        },
    }
}
