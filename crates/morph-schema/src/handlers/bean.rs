use morph_core::Flow;
use morph_types::{PrimitiveType, Type};

use crate::naming::property_name;
use crate::{MethodInfo, SchemaContext, SchemaHandler};

/// JavaBeans conventions: `getX()` and `isX()` getters, `setX(v)` setters.
///
/// Setters may return a value (fluent setters); the return value is ignored. `getClass` is never
/// a property.
#[derive(Debug, Default, Clone, Copy)]
pub struct BeanAccessorHandler;

impl SchemaHandler for BeanAccessorHandler {
    fn name(&self) -> &'static str {
        "bean"
    }

    fn try_schema(
        &self,
        ctx: &mut SchemaContext<'_>,
        method: &MethodInfo,
    ) -> anyhow::Result<Flow<()>> {
        let name = method.name.as_str();
        match method.arity() {
            0 if !method.is_void() && name != "getClass" => {
                if let Some(prop) = property_name(name, "get") {
                    ctx.add_getter(prop, method);
                    return Ok(Flow::Done(()));
                }
                if is_boolean(ctx, &method.return_type) {
                    if let Some(prop) = property_name(name, "is") {
                        ctx.add_getter(prop, method);
                        return Ok(Flow::Done(()));
                    }
                }
                Ok(Flow::Continue)
            }
            1 => match property_name(name, "set") {
                Some(prop) => {
                    ctx.add_setter(prop, method);
                    Ok(Flow::Done(()))
                }
                None => Ok(Flow::Continue),
            },
            _ => Ok(Flow::Continue),
        }
    }
}

fn is_boolean(ctx: &SchemaContext<'_>, ty: &Type) -> bool {
    match ty {
        Type::Primitive(prim) => *prim == PrimitiveType::Boolean,
        Type::Class(ct) => ct.def == ctx.env().well_known().boolean,
        _ => false,
    }
}
