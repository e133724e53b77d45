use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::{substitute, ClassId, ClassType, Type, TypeEnv, TypeVarId, WildcardBound};

/// Default ceiling on nested substitution steps before resolution gives up.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Type variable bindings accumulated along a type's ancestor chain.
pub type Bindings = HashMap<TypeVarId, Type>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("type substitution did not terminate within {depth} steps")]
    DepthExceeded { depth: usize },
}

/// Computes concrete types by substituting type variables through the parameterization chain
/// from a subtype to its ancestors.
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver {
    max_depth: usize,
}

impl Default for TypeResolver {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl TypeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Bindings for every type variable declared by `ty`'s class and its ancestors.
    ///
    /// A subtype's bindings are substituted into each supertype's arguments before that
    /// supertype's own variables are bound, so `Child<String> extends Parent<List<X>>` binds
    /// Parent's variable to `List<String>`. Raw uses contribute no bindings.
    pub fn bindings(&self, env: &dyn TypeEnv, ty: &ClassType) -> Bindings {
        let mut out = Bindings::new();
        let mut seen = HashSet::new();
        collect_bindings(env, ty, &mut out, &mut seen);
        out
    }

    /// Resolve `ty` against `bindings`.
    ///
    /// Unbound variables fall back to their first declared bound, or `Object`. A top-level
    /// unbounded wildcard becomes `Object`, an extends-bounded one becomes its bound, and
    /// super-bounded wildcards stay wildcards (with their bound resolved). Wildcards nested in
    /// type arguments keep their shape.
    pub fn resolve(
        &self,
        env: &dyn TypeEnv,
        ty: &Type,
        bindings: &Bindings,
    ) -> Result<Type, ResolveError> {
        let mut in_progress = Vec::new();
        self.resolve_inner(env, ty, bindings, &mut in_progress, 0, true)
    }

    /// Resolve `ty` as it appears inside the declaration of `context`'s class.
    pub fn resolve_in(
        &self,
        env: &dyn TypeEnv,
        ty: &Type,
        context: &ClassType,
    ) -> Result<Type, ResolveError> {
        let bindings = self.bindings(env, context);
        self.resolve(env, ty, &bindings)
    }

    fn resolve_inner(
        &self,
        env: &dyn TypeEnv,
        ty: &Type,
        bindings: &Bindings,
        in_progress: &mut Vec<TypeVarId>,
        depth: usize,
        top: bool,
    ) -> Result<Type, ResolveError> {
        if depth > self.max_depth {
            return Err(ResolveError::DepthExceeded {
                depth: self.max_depth,
            });
        }
        let next = depth + 1;

        let resolved = match ty {
            Type::Void | Type::Primitive(_) => ty.clone(),
            Type::Class(ct) => {
                let args = ct
                    .args
                    .iter()
                    .map(|arg| self.resolve_inner(env, arg, bindings, in_progress, next, false))
                    .collect::<Result<Vec<_>, _>>()?;
                Type::class(ct.def, args)
            }
            Type::Array(elem) => {
                Type::array(self.resolve_inner(env, elem, bindings, in_progress, next, true)?)
            }
            Type::Wildcard(WildcardBound::Unbounded) => {
                if top {
                    env.well_known().object_type()
                } else {
                    ty.clone()
                }
            }
            Type::Wildcard(WildcardBound::Extends(upper)) => {
                let upper = self.resolve_inner(env, upper, bindings, in_progress, next, true)?;
                if top {
                    upper
                } else {
                    Type::extends(upper)
                }
            }
            Type::Wildcard(WildcardBound::Super(lower)) => {
                Type::super_of(self.resolve_inner(env, lower, bindings, in_progress, next, true)?)
            }
            Type::TypeVar(id) => {
                if in_progress.contains(id) {
                    return Ok(first_bound(env, *id));
                }
                let target = bindings
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| first_bound(env, *id));
                in_progress.push(*id);
                let result = self.resolve_inner(env, &target, bindings, in_progress, next, top);
                in_progress.pop();
                result?
            }
        };
        Ok(resolved)
    }
}

fn collect_bindings(
    env: &dyn TypeEnv,
    ty: &ClassType,
    out: &mut Bindings,
    seen: &mut HashSet<ClassId>,
) {
    if !seen.insert(ty.def) {
        return;
    }
    let Some(def) = env.class(ty.def) else {
        return;
    };

    if ty.args.len() == def.type_params.len() {
        for (param, arg) in def.type_params.iter().zip(&ty.args) {
            out.entry(*param).or_insert_with(|| arg.clone());
        }
    }

    for sup in def.supertypes() {
        if let Type::Class(sup) = substitute(sup, out) {
            collect_bindings(env, &sup, out, seen);
        }
    }
}

/// The first declared bound of `id`, or `Object` when it has none.
pub(crate) fn first_bound(env: &dyn TypeEnv, id: TypeVarId) -> Type {
    env.type_param(id)
        .and_then(|tp| tp.upper_bounds.first().cloned())
        .unwrap_or_else(|| env.well_known().object_type())
}
