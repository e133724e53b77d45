use std::collections::{HashMap, HashSet, VecDeque};

use crate::resolve::first_bound;
use crate::{
    substitute, ClassId, ClassKind, ClassType, PrimitiveType, Type, TypeEnv, TypeVarId,
    WildcardBound,
};

/// Return `ty` viewed as `target` by walking the supertype graph and applying type argument
/// substitution along the way.
///
/// Example: `ArrayList<String>` instantiated as `List` returns `List<String>`. Raw types stay raw.
pub fn instantiate_as_supertype(env: &dyn TypeEnv, ty: &Type, target: ClassId) -> Option<Type> {
    fn inner(
        env: &dyn TypeEnv,
        ty: &Type,
        target: ClassId,
        seen_type_vars: &mut HashSet<TypeVarId>,
    ) -> Option<Type> {
        match ty {
            Type::Array(_) => {
                let object = env.well_known().object;
                return (target == object).then(|| Type::class(object, vec![]));
            }
            Type::Primitive(prim) => {
                let boxed = Type::class(env.well_known().boxed(*prim), vec![]);
                return inner(env, &boxed, target, seen_type_vars);
            }
            Type::Wildcard(WildcardBound::Extends(upper)) => {
                return inner(env, upper, target, seen_type_vars);
            }
            Type::TypeVar(id) => {
                if !seen_type_vars.insert(*id) {
                    return None;
                }
                let found = env.type_param(*id).and_then(|tp| {
                    tp.upper_bounds
                        .iter()
                        .find_map(|bound| inner(env, bound, target, seen_type_vars))
                });
                seen_type_vars.remove(id);
                return found;
            }
            _ => {}
        }

        let Type::Class(start) = ty else {
            return None;
        };

        let mut queue: VecDeque<ClassType> = VecDeque::new();
        let mut seen: HashSet<ClassType> = HashSet::new();
        queue.push_back(start.clone());

        while let Some(current) = queue.pop_front() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if current.def == target {
                return Some(Type::Class(current));
            }
            let Some(class_def) = env.class(current.def) else {
                continue;
            };

            // A raw instantiation has no arguments to propagate; keep its supertypes raw.
            let raw = current.args.is_empty() && !class_def.type_params.is_empty();
            let mut subst: HashMap<TypeVarId, Type> =
                HashMap::with_capacity(class_def.type_params.len());
            if !raw {
                for (formal, actual) in class_def.type_params.iter().zip(&current.args) {
                    subst.insert(*formal, actual.clone());
                }
            }

            for sup in class_def.supertypes() {
                let Type::Class(sup) = substitute(sup, &subst) else {
                    continue;
                };
                queue.push_back(if raw { ClassType::raw(sup.def) } else { sup });
            }

            if class_def.kind == ClassKind::Interface || class_def.super_class.is_none() {
                queue.push_back(ClassType::raw(env.well_known().object));
            }
        }

        None
    }

    let mut seen_type_vars = HashSet::new();
    inner(env, ty, target, &mut seen_type_vars)
}

/// Whether a value of static type `from` can be used where `to` is expected.
///
/// Reflexive and boxing-aware, with `Object` as the top type. Class types are compared
/// nominally, then type arguments covariantly; raw types on either side are accepted
/// unchecked. Super-bounded wildcard targets accept anything.
pub fn is_assignable(env: &dyn TypeEnv, from: &Type, to: &Type) -> bool {
    let mut seen = HashSet::new();
    assignable(env, from, to, &mut seen)
}

fn assignable(
    env: &dyn TypeEnv,
    from: &Type,
    to: &Type,
    seen: &mut HashSet<TypeVarId>,
) -> bool {
    if from == to {
        return true;
    }
    let wk = env.well_known();

    match (from, to) {
        (_, Type::Wildcard(WildcardBound::Unbounded | WildcardBound::Super(_))) => true,
        (_, Type::Wildcard(WildcardBound::Extends(upper))) => assignable(env, from, upper, seen),
        (Type::Wildcard(WildcardBound::Extends(upper)), _) => assignable(env, upper, to, seen),
        (Type::Wildcard(_), _) => to.class_id() == Some(wk.object),
        (Type::TypeVar(id), _) => {
            if !seen.insert(*id) {
                return false;
            }
            let bounds = env
                .type_param(*id)
                .map(|tp| tp.upper_bounds.clone())
                .unwrap_or_default();
            let ok = if bounds.is_empty() {
                to.class_id() == Some(wk.object)
            } else {
                bounds.iter().any(|bound| assignable(env, bound, to, seen))
            };
            seen.remove(id);
            ok
        }
        (Type::Primitive(a), Type::Primitive(b)) => a == b,
        (Type::Primitive(prim), Type::Class(_)) => {
            let boxed = Type::class(wk.boxed(*prim), vec![]);
            assignable(env, &boxed, to, seen)
        }
        (Type::Class(ct), Type::Primitive(prim)) => wk.unboxed(ct.def) == Some(*prim),
        (Type::Array(_), Type::Class(ct)) => ct.def == wk.object,
        (Type::Array(a), Type::Array(b)) => match (a.as_ref(), b.as_ref()) {
            (Type::Primitive(x), Type::Primitive(y)) => x == y,
            (Type::Primitive(_), _) | (_, Type::Primitive(_)) => false,
            (a, b) => assignable(env, a, b, seen),
        },
        (Type::Class(_), Type::Class(target)) => {
            if target.def == wk.object {
                return true;
            }
            let Some(Type::Class(view)) = instantiate_as_supertype(env, from, target.def) else {
                return false;
            };
            if view.args.is_empty() || target.args.is_empty() {
                return true;
            }
            view.args.len() == target.args.len()
                && view
                    .args
                    .iter()
                    .zip(&target.args)
                    .all(|(a, b)| assignable(env, a, b, seen))
        }
        _ => false,
    }
}

/// The raw class type (or primitive/array) a type erases to.
pub fn erasure(env: &dyn TypeEnv, ty: &Type) -> Type {
    fn inner(env: &dyn TypeEnv, ty: &Type, seen: &mut HashSet<TypeVarId>) -> Type {
        match ty {
            Type::Void | Type::Primitive(_) => ty.clone(),
            Type::Class(ct) => Type::class(ct.def, vec![]),
            Type::Array(elem) => Type::array(inner(env, elem, seen)),
            Type::Wildcard(WildcardBound::Extends(upper)) => inner(env, upper, seen),
            Type::Wildcard(_) => env.well_known().object_type(),
            Type::TypeVar(id) => {
                if !seen.insert(*id) {
                    return env.well_known().object_type();
                }
                let bound = first_bound(env, *id);
                inner(env, &bound, seen)
            }
        }
    }

    inner(env, ty, &mut HashSet::new())
}

/// The boxed class type of a primitive.
pub fn boxed_class(env: &dyn TypeEnv, prim: PrimitiveType) -> Type {
    Type::class(env.well_known().boxed(prim), vec![])
}

/// The primitive behind a primitive or boxed type.
pub fn unboxed(env: &dyn TypeEnv, ty: &Type) -> Option<PrimitiveType> {
    match ty {
        Type::Primitive(prim) => Some(*prim),
        Type::Class(ct) => env.well_known().unboxed(ct.def),
        _ => None,
    }
}

/// The `idx`-th type argument of `ty` viewed as `target` (`ArrayList<String>` as `Iterable`,
/// index 0, is `String`). `None` for raw views.
pub fn type_arg_as(env: &dyn TypeEnv, ty: &Type, target: ClassId, idx: usize) -> Option<Type> {
    match instantiate_as_supertype(env, ty, target)? {
        Type::Class(ct) => ct.args.get(idx).cloned(),
        _ => None,
    }
}
