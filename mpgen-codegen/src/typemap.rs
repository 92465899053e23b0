//! Annotation and default value mapping
//!
//! Annotations resolve into a closed set of native argument kinds. Default
//! values render as initializers of the `mp_arg_val_t` union.

use log::warn;
use mpgen_common::descriptor::is_identifier;
use mpgen_common::{ArgKind, DefaultValue, FunctionDescriptor, GenError, ParameterDescriptor};

use crate::naming::qstr;

/// Annotation text that resolves to no supported kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedAnnotation(pub String);

/// Resolve an optional annotation into an argument kind
pub fn resolve(annotation: Option<&str>) -> Result<ArgKind, UnsupportedAnnotation> {
    let Some(text) = annotation.map(str::trim) else {
        return Ok(ArgKind::Object);
    };

    let kind = match text {
        "int" => ArgKind::Integer,
        "bool" => ArgKind::Boolean,
        "object" | "Any" | "typing.Any" => ArgKind::Object,
        "None" | "NoneType" => ArgKind::NullableObject,
        _ if is_optional(text) => ArgKind::NullableObject,
        _ => return Err(UnsupportedAnnotation(text.to_string())),
    };
    Ok(kind)
}

/// `Optional[...]`, `typing.Optional[...]` or a union ending in `| None`
fn is_optional(text: &str) -> bool {
    let bracketed = text
        .strip_prefix("typing.Optional[")
        .or_else(|| text.strip_prefix("Optional["))
        .is_some_and(|rest| rest.ends_with(']'));
    bracketed || text.ends_with("| None")
}

/// Resolve a parameter's kind, attributing failures to the parameter
pub fn resolve_parameter(
    function: &FunctionDescriptor,
    param: &ParameterDescriptor,
) -> Result<ArgKind, GenError> {
    resolve(param.annotation.as_deref()).map_err(|UnsupportedAnnotation(annotation)| {
        GenError::unsupported_annotation(function.qualified_name(), &param.name, annotation)
    })
}

/// Render a default value as an argument-descriptor initializer
pub fn default_initializer(value: &DefaultValue, kind: ArgKind) -> String {
    let field = match (value, kind) {
        (DefaultValue::None, _) => ".u_obj = MP_OBJ_NULL".to_string(),

        (DefaultValue::Bool(b), ArgKind::Integer) => format!(".u_int = {}", u8::from(*b)),
        (DefaultValue::Bool(b), ArgKind::Boolean) => format!(".u_bool = {}", b),
        (DefaultValue::Bool(true), _) => ".u_rom_obj = MP_ROM_TRUE".to_string(),
        (DefaultValue::Bool(false), _) => ".u_rom_obj = MP_ROM_FALSE".to_string(),

        (DefaultValue::Int(n), ArgKind::Integer) => format!(".u_int = {}", n),
        (DefaultValue::Int(n), ArgKind::Boolean) => format!(".u_bool = {}", *n != 0),
        (DefaultValue::Int(n), _) => format!(".u_rom_obj = MP_ROM_INT({})", n),

        (DefaultValue::Str(s), k) if k.is_object() && is_identifier(s) => {
            format!(".u_rom_obj = MP_ROM_QSTR({})", qstr(s))
        }

        (other, kind) => {
            warn!(
                "default {} has no constant {} initializer, using MP_OBJ_NULL",
                other, kind
            );
            ".u_obj = MP_OBJ_NULL".to_string()
        }
    };
    format!("{{ {} }}", field)
}
