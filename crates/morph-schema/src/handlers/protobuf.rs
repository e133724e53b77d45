use morph_core::Flow;
use morph_types::{is_assignable, type_arg_as, Type, WildcardBound};

use crate::naming::{property_name, property_name_between};
use crate::{MethodInfo, SchemaContext, SchemaHandler};

/// Generated-code accessors that never denote a message field.
const NOISE: &[&str] = &[
    "build",
    "buildPartial",
    "clear",
    "getAllFields",
    "getDefaultInstanceForType",
    "getDescriptorForType",
    "getInitializationErrorString",
    "getParserForType",
    "getSerializedSize",
    "getUnknownFields",
    "isInitialized",
    "mergeFrom",
    "newBuilderForType",
    "toBuilder",
];

/// Protobuf message and builder conventions.
///
/// Only applies to types assignable to `com.google.protobuf.MessageOrBuilder`. Repeated fields
/// surface as `getXList()`/`addAllX(..)`, map fields as `getXMap()`/`putAllX(..)`. Per-element
/// mutators and bookkeeping accessors (`getXBytes`, `getXCount`, `hasX`, `clearX`, ...) are
/// claimed without recording anything so later recognizers do not mistake them for properties.
/// Plain `getX()`/`setX(v)` accessors are left to the bean recognizer.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProtobufAccessorHandler;

impl SchemaHandler for ProtobufAccessorHandler {
    fn name(&self) -> &'static str {
        "protobuf"
    }

    fn try_schema(
        &self,
        ctx: &mut SchemaContext<'_>,
        method: &MethodInfo,
    ) -> anyhow::Result<Flow<()>> {
        let env = ctx.env();
        let marker = Type::class(env.well_known().message_or_builder, vec![]);
        if !is_assignable(env, ctx.ty(), &marker) {
            return Ok(Flow::Continue);
        }

        let name = method.name.as_str();
        if NOISE.contains(&name) {
            return Ok(Flow::Done(()));
        }

        match method.arity() {
            0 => {
                if let Some(prop) = property_name_between(name, "get", "List") {
                    ctx.add_getter(prop, method);
                    return Ok(Flow::Done(()));
                }
                if let Some(prop) = property_name_between(name, "get", "Map") {
                    ctx.add_getter(prop, method);
                    return Ok(Flow::Done(()));
                }
                let noise = [("Bytes", ""), ("OrBuilder", ""), ("Value", "")]
                    .iter()
                    .any(|(suffix, companion)| {
                        companion_exists(ctx, method, name, "get", suffix, companion)
                    })
                    || companion_exists(ctx, method, name, "get", "Count", "List")
                    || companion_exists(ctx, method, name, "get", "Count", "Map")
                    || companion_exists(ctx, method, name, "get", "OrBuilderList", "List")
                    || property_name(name, "has").is_some()
                    || property_name(name, "clear").is_some();
                Ok(if noise { Flow::Done(()) } else { Flow::Continue })
            }
            1 => {
                if let Some(prop) = property_name(name, "addAll") {
                    // `addAllX(Iterable<? extends E>)` writes the `List<E>` exposed by `getXList`.
                    let elem = type_arg_as(env, &method.params[0], env.well_known().iterable, 0)
                        .map(|arg| match arg {
                            Type::Wildcard(WildcardBound::Extends(upper)) => *upper,
                            Type::Wildcard(_) => env.well_known().object_type(),
                            other => other,
                        })
                        .unwrap_or_else(|| env.well_known().object_type());
                    ctx.add_setter_typed(prop, method, env.well_known().list_of(elem));
                    return Ok(Flow::Done(()));
                }
                if let Some(prop) = property_name(name, "putAll") {
                    ctx.add_setter(prop, method);
                    return Ok(Flow::Done(()));
                }
                let noise = ["add", "merge", "remove"]
                    .iter()
                    .any(|prefix| property_name(name, prefix).is_some())
                    || companion_exists(ctx, method, name, "set", "Bytes", "")
                    || companion_exists(ctx, method, name, "set", "Value", "")
                    || name.starts_with("get");
                Ok(if noise { Flow::Done(()) } else { Flow::Continue })
            }
            _ => {
                let noise = property_name(name, "put").is_some()
                    || property_name(name, "set").is_some()
                    || property_name(name, "add").is_some();
                Ok(if noise { Flow::Done(()) } else { Flow::Continue })
            }
        }
    }
}

/// Whether `name` is `{prefix}{Stem}{suffix}` and the declaring class also has the field accessor
/// `{prefix}{Stem}{companion}`, e.g. `getNameBytes` next to `getName`. Without the companion the
/// method is an ordinary accessor for a field whose name happens to end in `suffix`.
fn companion_exists(
    ctx: &SchemaContext<'_>,
    method: &MethodInfo,
    name: &str,
    prefix: &str,
    suffix: &str,
    companion: &str,
) -> bool {
    let Some(stem) = name
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(suffix))
        .filter(|stem| stem.starts_with(|c: char| c.is_uppercase()))
    else {
        return false;
    };
    let companion = format!("{prefix}{stem}{companion}");
    let arity = if prefix == "set" { 1 } else { 0 };
    ctx.env()
        .class(method.declaring)
        .is_some_and(|def| def.find_method(&companion, arity, false).is_some())
}
