//! Binding emission
//!
//! Walks a module plan in declaration order and pushes fragments for every
//! function, class and module table. Each pushed fragment is shown to the
//! symbol collector before it is stored.

use log::{debug, info, trace};
use mpgen_common::{CallShape, FunctionDescriptor, ParameterKind};

use crate::fragment::{EntryParams, Fragment, MapValue};
use crate::naming::Naming;
use crate::plan::{ClassPlan, FunctionPlan, ModulePlan};
use crate::symbols::{SymbolCollector, RESERVED_SYMBOL};
use crate::typemap::default_initializer;

/// Headers every generated module includes
const INCLUDES: [&str; 2] = ["py/runtime.h", "py/obj.h"];

pub struct Emitter<'s> {
    naming: Naming,
    out: Vec<Fragment>,
    symbols: &'s mut SymbolCollector,
}

impl<'s> Emitter<'s> {
    pub fn new(module: &str, symbols: &'s mut SymbolCollector) -> Self {
        Self {
            naming: Naming::new(module),
            out: Vec::new(),
            symbols,
        }
    }

    fn push(&mut self, fragment: Fragment) {
        trace!("emit {:?}", fragment);
        self.symbols.observe(&fragment);
        self.out.push(fragment);
    }

    /// Emit the complete source file for a module
    pub fn emit_module(mut self, plan: &ModulePlan) -> Vec<Fragment> {
        let module = plan.descriptor;
        let flag = self.naming.feature_flag();
        info!(
            "Emitting module '{}': {} functions, {} classes",
            module.name,
            plan.functions.len(),
            plan.classes.len()
        );

        self.push(Fragment::Header {
            module: module.name.clone(),
            author: module.author.clone(),
            year: module.year,
        });
        self.push(Fragment::Blank);
        for header in INCLUDES {
            self.push(Fragment::Include(header.to_string()));
        }
        self.push(Fragment::Blank);
        self.push(Fragment::If(flag.clone()));
        self.push(Fragment::Blank);

        for function in &plan.functions {
            self.emit_function(function);
        }
        for class in &plan.classes {
            self.emit_class(class);
        }

        self.emit_globals(plan);

        let module_object = self.naming.module_object();
        self.push(Fragment::ModuleDefine {
            name: module_object.clone(),
            globals: self.naming.globals_dict(),
        });
        self.push(Fragment::Blank);
        self.push(Fragment::Register {
            module: module.name.clone(),
            object: module_object,
            flag: flag.clone(),
        });
        self.push(Fragment::Blank);
        self.push(Fragment::EndIf(flag));

        self.out
    }

    // ===== Functions =====

    fn emit_function(&mut self, plan: &FunctionPlan) {
        let function = plan.descriptor;
        let entry = self.naming.function(function);
        debug!("Emitting '{}' as {} ({})", function.qualified_name(), entry, plan.shape);

        self.push(Fragment::Comment(python_signature(function)));

        let params = match plan.shape {
            CallShape::Fixed(_) => EntryParams::Fixed(
                plan.args.iter().map(|a| self.naming.param_in(&a.param.name)).collect(),
            ),
            CallShape::VarBetween { .. } => EntryParams::ParsedArray,
            CallShape::VarArgs { .. } => EntryParams::Array,
            CallShape::Keyword { .. } => EntryParams::KeywordMap,
        };
        self.push(Fragment::EntryBegin {
            name: entry.clone(),
            params,
        });

        if plan.shape.has_arg_table() {
            self.emit_arg_table(plan);
        } else if let CallShape::VarArgs { .. } = plan.shape {
            self.emit_slot_enum(plan);
        }

        if plan.raw.is_empty() {
            self.push(Fragment::Placeholder(function.qualified_name()));
        } else {
            self.emit_raw(plan);
        }
        self.push(Fragment::BlockEnd);

        self.push(Fragment::FunObject {
            object: self.naming.function_object(function),
            entry,
            shape: plan.shape,
        });
        self.push(Fragment::Blank);
    }

    fn emit_slot_enum(&mut self, plan: &FunctionPlan) {
        if plan.args.is_empty() {
            return;
        }
        let slots = plan
            .args
            .iter()
            .map(|a| self.naming.arg_slot(&a.param.name))
            .collect();
        self.push(Fragment::SlotEnum(slots));
    }

    fn emit_arg_table(&mut self, plan: &FunctionPlan) {
        if plan.args.is_empty() {
            return;
        }
        self.emit_slot_enum(plan);

        self.push(Fragment::ArgTableBegin);
        for slot in &plan.args {
            let param = slot.param;
            self.push(Fragment::ArgRow {
                name: param.name.clone(),
                required: !param.has_default(),
                keyword_only: param.is_keyword_only(),
                kind: slot.kind,
                initializer: param.default.as_ref().map(|v| default_initializer(v, slot.kind)),
            });
        }
        self.push(Fragment::ArgTableEnd);
        self.push(Fragment::ArgParse {
            keywords: plan.shape.takes_keywords(),
        });
    }

    fn emit_raw(&mut self, plan: &FunctionPlan) {
        for line in &plan.raw {
            self.push(Fragment::Raw(line.to_string()));
        }
    }

    // ===== Classes =====

    fn emit_class(&mut self, plan: &ClassPlan) {
        let class = &plan.descriptor.name;
        info!("Emitting class '{}' with {} methods", class, plan.methods.len());

        let layout = self.naming.instance_layout(class);
        self.push(Fragment::InstanceLayout { name: layout.clone() });
        self.push(Fragment::Blank);

        for method in &plan.methods {
            self.emit_function(method);
        }

        let make_new = plan.constructor.as_ref().map(|ctor| self.emit_constructor(class, &layout, ctor));

        let locals = if plan.methods.is_empty() {
            None
        } else {
            let table = self.naming.locals_table(class);
            let dict = self.naming.locals_dict(class);
            self.push(Fragment::MapBegin { name: table.clone() });
            for method in &plan.methods {
                self.push(Fragment::MapEntry {
                    key: method.descriptor.name.clone(),
                    value: MapValue::Ptr(self.naming.function_object(method.descriptor)),
                });
            }
            self.push(Fragment::MapEnd);
            self.push(Fragment::DictDefine {
                name: dict.clone(),
                table,
            });
            self.push(Fragment::Blank);
            Some(dict)
        };

        self.push(Fragment::TypeDefine {
            name: self.naming.type_object(class),
            class: class.clone(),
            make_new,
            locals,
        });
        self.push(Fragment::Blank);
    }

    /// Emit a constructor and return the name of its entry point
    fn emit_constructor(&mut self, class: &str, layout: &str, plan: &FunctionPlan) -> String {
        let entry = self.naming.make_new(class);
        debug!("Emitting constructor of '{}' ({})", class, plan.shape);

        self.push(Fragment::Comment(python_signature(plan.descriptor)));
        self.push(Fragment::EntryBegin {
            name: entry.clone(),
            params: EntryParams::MakeNew,
        });
        self.push(Fragment::ArityCheck {
            min: plan.shape.min(),
            max: plan.shape.max(),
            keywords: plan.shape.takes_keywords(),
        });
        self.push(Fragment::Allocate {
            layout: layout.to_string(),
        });
        self.emit_raw(plan);
        self.push(Fragment::Return("MP_OBJ_FROM_PTR(self)".to_string()));
        self.push(Fragment::BlockEnd);
        self.push(Fragment::Blank);

        entry
    }

    // ===== Module table =====

    fn emit_globals(&mut self, plan: &ModulePlan) {
        let table = self.naming.globals_table();
        self.push(Fragment::MapBegin { name: table.clone() });
        self.push(Fragment::MapEntry {
            key: RESERVED_SYMBOL.to_string(),
            value: MapValue::Qstr(plan.descriptor.name.clone()),
        });
        for function in &plan.functions {
            self.push(Fragment::MapEntry {
                key: function.descriptor.name.clone(),
                value: MapValue::Ptr(self.naming.function_object(function.descriptor)),
            });
        }
        for class in &plan.classes {
            let name = &class.descriptor.name;
            self.push(Fragment::MapEntry {
                key: name.clone(),
                value: MapValue::Ptr(self.naming.type_object(name)),
            });
        }
        self.push(Fragment::MapEnd);
        self.push(Fragment::DictDefine {
            name: self.naming.globals_dict(),
            table,
        });
        self.push(Fragment::Blank);
    }
}

/// Render a declaration like `def f(a, b=0, *args, c, **kwargs) -> int`
pub fn python_signature(function: &FunctionDescriptor) -> String {
    let mut parts = Vec::new();
    let mut star_written = false;

    for param in &function.params {
        if param.kind == ParameterKind::KeywordOnly && !star_written {
            parts.push(if function.varargs { "*args" } else { "*" }.to_string());
            star_written = true;
        }

        let mut text = param.name.clone();
        if let Some(annotation) = &param.annotation {
            text.push_str(&format!(": {}", annotation));
        }
        if let Some(default) = &param.default {
            let eq = if param.annotation.is_some() { " = " } else { "=" };
            text.push_str(&format!("{}{}", eq, default));
        }
        parts.push(text);
    }

    if function.varargs && !star_written {
        parts.push("*args".to_string());
    }
    if function.varkw {
        parts.push("**kwargs".to_string());
    }

    let mut signature = format!("def {}({})", function.name, parts.join(", "));
    if let Some(returns) = &function.returns {
        signature.push_str(&format!(" -> {}", returns));
    }
    signature
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpgen_common::ParameterDescriptor;

    #[test]
    fn test_python_signature() {
        let f = FunctionDescriptor::new("open")
            .param(ParameterDescriptor::positional("path"))
            .param(ParameterDescriptor::positional("mode").with_default("'r'"))
            .param(ParameterDescriptor::keyword_only("buffered").with_annotation("bool").with_default("True"))
            .with_varkw()
            .with_returns("object");
        assert_eq!(
            python_signature(&f),
            "def open(path, mode='r', *, buffered: bool = True, **kwargs) -> object"
        );

        let f = FunctionDescriptor::new("log")
            .param(ParameterDescriptor::positional("fmt"))
            .with_varargs();
        assert_eq!(python_signature(&f), "def log(fmt, *args)");
    }

    #[test]
    fn test_every_fragment_is_observed() {
        let module = mpgen_common::ModuleDescriptor::new("example")
            .function(FunctionDescriptor::new("ping"));
        let plan = ModulePlan::build(&module).unwrap();
        let mut symbols = SymbolCollector::new();
        let fragments = Emitter::new("example", &mut symbols).emit_module(&plan);

        assert!(fragments.iter().any(|f| matches!(f, Fragment::FunObject { .. })));
        let table = symbols.finalize();
        assert_eq!(table.symbols(), &["example", "ping"]);
    }
}
