//! Binding plans
//!
//! A plan pairs each descriptor with everything derived from it: the call
//! shape, the argument kind of every parameter and the raw passthrough lines
//! of its documentation. Plans are built once, before any emission starts,
//! so classification and type mapping run exactly once per descriptor.

use log::debug;
use mpgen_common::{
    ArgKind, CallShape, ClassDescriptor, FunctionDescriptor, GenError, ModuleDescriptor,
    ParameterDescriptor,
};

use crate::classify::classify;
use crate::typemap::resolve_parameter;

/// Marker that introduces a raw C fragment inside documentation text
pub const RAW_MARKER: &str = "@c:";

/// A parameter with its resolved argument kind
#[derive(Debug, Clone)]
pub struct ArgSlot<'m> {
    pub param: &'m ParameterDescriptor,
    pub kind: ArgKind,
}

#[derive(Debug, Clone)]
pub struct FunctionPlan<'m> {
    pub descriptor: &'m FunctionDescriptor,
    pub shape: CallShape,
    pub args: Vec<ArgSlot<'m>>,
    /// Author-supplied C lines, spliced unchecked in place of the placeholder body
    pub raw: Vec<&'m str>,
}

impl<'m> FunctionPlan<'m> {
    pub fn build(descriptor: &'m FunctionDescriptor) -> Result<Self, GenError> {
        let shape = classify(descriptor)?;
        let args = descriptor
            .params
            .iter()
            .map(|param| {
                Ok(ArgSlot {
                    param,
                    kind: resolve_parameter(descriptor, param)?,
                })
            })
            .collect::<Result<Vec<_>, GenError>>()?;
        let raw = descriptor.doc.as_deref().map(raw_fragments).unwrap_or_default();

        debug!(
            "'{}' -> {} ({} params, {} raw lines)",
            descriptor.qualified_name(),
            shape,
            args.len(),
            raw.len()
        );

        Ok(Self {
            descriptor,
            shape,
            args,
            raw,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ClassPlan<'m> {
    pub descriptor: &'m ClassDescriptor,
    pub constructor: Option<FunctionPlan<'m>>,
    /// Non-constructor methods in declaration order
    pub methods: Vec<FunctionPlan<'m>>,
}

impl<'m> ClassPlan<'m> {
    pub fn build(descriptor: &'m ClassDescriptor) -> Result<Self, GenError> {
        let mut constructor = None;
        let mut methods = Vec::new();

        for method in &descriptor.methods {
            let plan = FunctionPlan::build(method)?;
            if method.is_constructor() {
                constructor = Some(plan);
            } else {
                methods.push(plan);
            }
        }

        Ok(Self {
            descriptor,
            constructor,
            methods,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ModulePlan<'m> {
    pub descriptor: &'m ModuleDescriptor,
    pub functions: Vec<FunctionPlan<'m>>,
    pub classes: Vec<ClassPlan<'m>>,
}

impl<'m> ModulePlan<'m> {
    pub fn build(descriptor: &'m ModuleDescriptor) -> Result<Self, GenError> {
        let functions = descriptor
            .functions
            .iter()
            .map(FunctionPlan::build)
            .collect::<Result<Vec<_>, _>>()?;
        let classes = descriptor
            .classes
            .iter()
            .map(ClassPlan::build)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            descriptor,
            functions,
            classes,
        })
    }
}

/// Text after the raw marker on every documentation line that carries one
pub fn raw_fragments(doc: &str) -> Vec<&str> {
    doc.lines()
        .filter_map(|line| line.split_once(RAW_MARKER))
        .map(|(_, fragment)| fragment.trim_start())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_fragments() {
        let doc = "Return the size.\n\n    @c: return mp_obj_new_int(42);\n  no marker here\n@c:mp_raise_ValueError(NULL);";
        assert_eq!(
            raw_fragments(doc),
            vec!["return mp_obj_new_int(42);", "mp_raise_ValueError(NULL);"]
        );
        assert!(raw_fragments("plain docs").is_empty());
    }

    #[test]
    fn test_plan_resolves_kinds_in_order() {
        let func = FunctionDescriptor::new("blink")
            .param(ParameterDescriptor::positional("pin").with_annotation("int"))
            .param(ParameterDescriptor::positional("on").with_annotation("bool").with_default("True"));
        let plan = FunctionPlan::build(&func).unwrap();

        assert_eq!(plan.shape, CallShape::VarBetween { min: 1, max: 2 });
        let kinds: Vec<ArgKind> = plan.args.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![ArgKind::Integer, ArgKind::Boolean]);
    }

    #[test]
    fn test_class_plan_separates_constructor() {
        let class = ClassDescriptor::new("Counter")
            .method(FunctionDescriptor::new("value").param(ParameterDescriptor::positional("self")))
            .method(
                FunctionDescriptor::new("__init__")
                    .param(ParameterDescriptor::positional("self"))
                    .param(ParameterDescriptor::positional("size")),
            );
        let plan = ClassPlan::build(&class).unwrap();

        assert_eq!(plan.methods.len(), 1);
        assert_eq!(plan.methods[0].descriptor.name, "value");
        assert_eq!(plan.constructor.as_ref().map(|c| c.shape), Some(CallShape::Fixed(1)));
    }

    #[test]
    fn test_module_plan_propagates_errors() {
        let module = ModuleDescriptor::new("example").function(
            FunctionDescriptor::new("bad").param(ParameterDescriptor::positional("x").with_annotation("float")),
        );
        assert!(matches!(
            ModulePlan::build(&module),
            Err(GenError::UnsupportedAnnotationType { .. })
        ));
    }
}
