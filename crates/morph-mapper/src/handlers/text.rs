use std::fmt::Display;

use morph_core::Flow;
use morph_types::{unboxed, PrimitiveType, Type, Value};

use crate::{MapRequest, Mapper, MapperHandler};

/// Conversions to and from text: any scalar or enum constant to `String`, and `"true"`/`"false"`
/// or single-character text to `boolean`/`char`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextHandler;

impl MapperHandler for TextHandler {
    fn name(&self) -> &'static str {
        "text"
    }

    fn try_map(&self, mapper: &Mapper, req: &MapRequest<'_>) -> anyhow::Result<Flow<Value>> {
        let env = mapper.env();
        let wk = env.well_known();
        let converted = match req.target_type {
            Type::Class(ct) if ct.def == wk.string || ct.def == wk.char_sequence => {
                text_of(req.source).map(Value::str)
            }
            target => match (unboxed(env, target), req.source.as_str()) {
                (Some(PrimitiveType::Boolean), Some(text)) => parse_bool(text.trim()),
                (Some(PrimitiveType::Char), Some(text)) => single_char(text),
                _ => None,
            },
        };
        Ok(converted.map_or(Flow::Continue, Flow::Done))
    }
}

fn text_of(value: &Value) -> Option<String> {
    Some(match value {
        Value::Str(s) => s.to_string(),
        Value::Char(c) => c.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Byte(v) => v.to_string(),
        Value::Short(v) => v.to_string(),
        Value::Int(v) => v.to_string(),
        Value::Long(v) => v.to_string(),
        Value::Float(v) => decimal(v, v.is_finite()),
        Value::Double(v) => decimal(v, v.is_finite()),
        Value::Enum(constant) => constant.name.to_string(),
        Value::Null | Value::List(_) | Value::Map(_) | Value::Object(_) => return None,
    })
}

/// Floating point text always carries a fraction: `5.0`, not `5`.
fn decimal(v: &impl Display, finite: bool) -> String {
    let text = v.to_string();
    if finite && !text.contains(['.', 'e', 'E']) {
        format!("{text}.0")
    } else {
        text
    }
}

fn parse_bool(text: &str) -> Option<Value> {
    if text.eq_ignore_ascii_case("true") {
        Some(Value::Bool(true))
    } else if text.eq_ignore_ascii_case("false") {
        Some(Value::Bool(false))
    } else {
        None
    }
}

fn single_char(text: &str) -> Option<Value> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(Value::Char(c)),
        _ => None,
    }
}
