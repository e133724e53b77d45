use morph_core::Flow;
use morph_types::{ClassKind, EnumConstant, Value};

use crate::{MapRequest, Mapper, MapperHandler};

/// Text or a constant of another enum to an enum constant, by name. An exact match wins over a
/// case-insensitive one; an unknown name leaves the request unmapped.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnumHandler;

impl MapperHandler for EnumHandler {
    fn name(&self) -> &'static str {
        "enum"
    }

    fn try_map(&self, mapper: &Mapper, req: &MapRequest<'_>) -> anyhow::Result<Flow<Value>> {
        let env = mapper.env();
        let Some((id, def)) = req
            .target_type
            .class_id()
            .and_then(|id| env.class(id).map(|def| (id, def)))
            .filter(|(_, def)| def.kind == ClassKind::Enum)
        else {
            return Ok(Flow::Continue);
        };
        let name: &str = match req.source {
            Value::Str(text) => text,
            Value::Enum(constant) => &constant.name,
            _ => return Ok(Flow::Continue),
        };

        let constant = def
            .enum_constants
            .iter()
            .find(|constant| *constant == name)
            .or_else(|| {
                def.enum_constants
                    .iter()
                    .find(|constant| constant.eq_ignore_ascii_case(name))
            });
        Ok(match constant {
            Some(constant) => Flow::Done(Value::Enum(EnumConstant::new(id, constant.as_str()))),
            None => {
                tracing::debug!(
                    target = "morph.mapper",
                    name,
                    "no enum constant with this name"
                );
                Flow::Continue
            }
        })
    }
}
