use std::fmt;
use std::fmt::Write as _;

use crate::{Type, TypeEnv, WildcardBound};

/// [`Type`] paired with the environment that names its classes; see [`Type::display`].
#[derive(Clone, Copy)]
pub struct TypeDisplay<'a> {
    env: &'a dyn TypeEnv,
    ty: &'a Type,
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_type(self.env, self.ty))
    }
}

impl Type {
    pub fn display<'a>(&'a self, env: &'a dyn TypeEnv) -> TypeDisplay<'a> {
        TypeDisplay { env, ty: self }
    }
}

/// Render `ty` with fully-qualified Java-like names, e.g. `java.util.List<? extends java.lang.Number>`.
pub fn format_type(env: &dyn TypeEnv, ty: &Type) -> String {
    let mut out = String::new();
    write_type(env, ty, &mut out);
    out
}

fn write_type(env: &dyn TypeEnv, ty: &Type, out: &mut String) {
    match ty {
        Type::Void => out.push_str("void"),
        Type::Primitive(prim) => out.push_str(prim.name()),
        Type::Class(ct) => {
            match env.class(ct.def) {
                Some(def) => out.push_str(&def.name),
                None => {
                    let _ = write!(out, "<class#{}>", ct.def.to_raw());
                }
            }
            if !ct.args.is_empty() {
                out.push('<');
                for (idx, arg) in ct.args.iter().enumerate() {
                    if idx > 0 {
                        out.push_str(", ");
                    }
                    write_type(env, arg, out);
                }
                out.push('>');
            }
        }
        Type::TypeVar(id) => match env.type_param(*id) {
            Some(tp) => out.push_str(&tp.name),
            None => {
                let _ = write!(out, "<tv#{}>", id.to_raw());
            }
        },
        Type::Wildcard(WildcardBound::Unbounded) => out.push('?'),
        Type::Wildcard(WildcardBound::Extends(upper)) => {
            out.push_str("? extends ");
            write_type(env, upper, out);
        }
        Type::Wildcard(WildcardBound::Super(lower)) => {
            out.push_str("? super ");
            write_type(env, lower, out);
        }
        Type::Array(elem) => {
            write_type(env, elem, out);
            out.push_str("[]");
        }
    }
}
