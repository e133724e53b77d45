//! The default [`MapperHandler`](crate::MapperHandler) chain.

use std::sync::Arc;

use morph_core::{CopyLevel, HandlerChain, ReusePolicy};
use morph_types::{is_assignable, instantiate_as_supertype, Type, TypeEnv, WildcardBound};

use crate::{MapRequest, MapperHandler};

mod bean;
mod builder;
mod collection;
mod dynamic_map;
mod enums;
mod null;
mod numeric;
mod reuse;
mod text;

pub use bean::BeanHandler;
pub use builder::BuilderHandler;
pub use collection::CollectionHandler;
pub use dynamic_map::DynamicMapHandler;
pub use enums::EnumHandler;
pub use null::NullHandler;
pub use numeric::NumericHandler;
pub use reuse::ReuseHandler;
pub use text::TextHandler;

/// Null, reuse, scalar conversions, containers, then structured targets.
pub fn default_handlers() -> HandlerChain<dyn MapperHandler> {
    HandlerChain::new(vec![
        Arc::new(NullHandler) as Arc<dyn MapperHandler>,
        Arc::new(ReuseHandler),
        Arc::new(NumericHandler),
        Arc::new(TextHandler),
        Arc::new(EnumHandler),
        Arc::new(CollectionHandler),
        Arc::new(DynamicMapHandler),
        Arc::new(BuilderHandler),
        Arc::new(BeanHandler),
    ])
}

/// Whether a value of `from` can stand in for `to` as is. Like [`is_assignable`], except that a
/// raw container never fits a target whose type arguments constrain its contents.
pub(crate) fn fits(env: &dyn TypeEnv, from: &Type, to: &Type) -> bool {
    is_assignable(env, from, to) && !raw_mismatch(env, from, to)
}

/// Whether the request's source fits its target and was turned away only by
/// [`CopyLevel::Equal`]. Converting handlers leave such requests unmapped.
pub(crate) fn defer_to_copy_level(env: &dyn TypeEnv, req: &MapRequest<'_>) -> bool {
    req.options.copy_level() == CopyLevel::Equal
        && req.options.reuse() == ReusePolicy::Shared
        && fits(env, req.source_type, req.target_type)
}

fn raw_mismatch(env: &dyn TypeEnv, from: &Type, to: &Type) -> bool {
    let (Type::Class(from), Type::Class(to)) = (from, to) else {
        return false;
    };
    let raw = from.args.is_empty()
        && env
            .class(from.def)
            .is_some_and(|def| !def.type_params.is_empty());
    if !raw {
        return false;
    }
    let wk = env.well_known();
    let is_map = instantiate_as_supertype(env, &Type::Class(to.clone()), wk.map).is_some();
    !to.args.iter().enumerate().all(|(idx, arg)| match arg {
        Type::Class(ct) if ct.def == wk.object => true,
        // Dynamic maps are string-keyed.
        Type::Class(ct) if is_map && idx == 0 => ct.def == wk.string || ct.def == wk.char_sequence,
        Type::Wildcard(WildcardBound::Unbounded | WildcardBound::Super(_)) => true,
        Type::Wildcard(WildcardBound::Extends(upper)) => upper.class_id() == Some(wk.object),
        _ => false,
    })
}
