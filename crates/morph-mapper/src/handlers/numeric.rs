use morph_core::Flow;
use morph_types::{unboxed, PrimitiveType, Value};

use crate::{MapRequest, Mapper, MapperHandler};

/// Numeric widening and narrowing between primitive and boxed number types, plus parsing of
/// decimal text. Narrowing truncates the way a primitive cast does; text that does not parse or
/// does not fit the target leaves the request unmapped.
#[derive(Debug, Default, Clone, Copy)]
pub struct NumericHandler;

impl MapperHandler for NumericHandler {
    fn name(&self) -> &'static str {
        "numeric"
    }

    fn try_map(&self, mapper: &Mapper, req: &MapRequest<'_>) -> anyhow::Result<Flow<Value>> {
        let Some(prim) = unboxed(mapper.env(), req.target_type).filter(|p| p.is_numeric()) else {
            return Ok(Flow::Continue);
        };
        let converted = match req.source {
            Value::Str(text) => parse(text.trim(), prim),
            Value::Float(_) | Value::Double(_) => req.source.as_f64().and_then(|v| from_f64(v, prim)),
            Value::Byte(_) | Value::Short(_) | Value::Int(_) | Value::Long(_) | Value::Char(_) => {
                req.source.as_i64().and_then(|v| from_i64(v, prim))
            }
            _ => None,
        };
        Ok(converted.map_or(Flow::Continue, Flow::Done))
    }
}

fn from_i64(v: i64, prim: PrimitiveType) -> Option<Value> {
    Some(match prim {
        PrimitiveType::Byte => Value::Byte(v as i8),
        PrimitiveType::Short => Value::Short(v as i16),
        PrimitiveType::Int => Value::Int(v as i32),
        PrimitiveType::Long => Value::Long(v),
        PrimitiveType::Float => Value::Float(v as f32),
        PrimitiveType::Double => Value::Double(v as f64),
        PrimitiveType::Boolean | PrimitiveType::Char => return None,
    })
}

fn from_f64(v: f64, prim: PrimitiveType) -> Option<Value> {
    Some(match prim {
        // Sub-int targets narrow through int.
        PrimitiveType::Byte => Value::Byte(v as i32 as i8),
        PrimitiveType::Short => Value::Short(v as i32 as i16),
        PrimitiveType::Int => Value::Int(v as i32),
        PrimitiveType::Long => Value::Long(v as i64),
        PrimitiveType::Float => Value::Float(v as f32),
        PrimitiveType::Double => Value::Double(v),
        PrimitiveType::Boolean | PrimitiveType::Char => return None,
    })
}

fn parse(text: &str, prim: PrimitiveType) -> Option<Value> {
    match prim {
        PrimitiveType::Byte => text.parse().ok().map(Value::Byte),
        PrimitiveType::Short => text.parse().ok().map(Value::Short),
        PrimitiveType::Int => text.parse().ok().map(Value::Int),
        PrimitiveType::Long => text.parse().ok().map(Value::Long),
        PrimitiveType::Float => text.parse().ok().map(Value::Float),
        PrimitiveType::Double => text.parse().ok().map(Value::Double),
        PrimitiveType::Boolean | PrimitiveType::Char => None,
    }
}
