//! Centralized naming for generated C identifiers
//!
//! Every C-level name the emitter writes comes from here so that a function's
//! entry point, its registration object and the tables that reference them
//! always agree.

use mpgen_common::FunctionDescriptor;

/// Prefix of interned-string identifiers in generated C
pub const QSTR_PREFIX: &str = "MP_QSTR_";

/// Name generator scoped to one module
#[derive(Debug, Clone)]
pub struct Naming {
    module: String,
}

impl Naming {
    pub fn new(module: &str) -> Self {
        Self {
            module: module.to_string(),
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    // ===== Functions and methods =====

    /// C entry point of a function or method: `mod_func` / `mod_Class_method`
    pub fn function(&self, function: &FunctionDescriptor) -> String {
        match &function.owner {
            Some(owner) => format!("{}_{}_{}", self.module, owner, function.name),
            None => format!("{}_{}", self.module, function.name),
        }
    }

    /// Registration object bound to a function's entry point
    pub fn function_object(&self, function: &FunctionDescriptor) -> String {
        format!("{}_obj", self.function(function))
    }

    /// Local name of a fixed-arity parameter
    pub fn param_in(&self, param: &str) -> String {
        format!("{}_in", param)
    }

    /// Enumerator naming an argument slot
    pub fn arg_slot(&self, param: &str) -> String {
        format!("ARG_{}", param)
    }

    // ===== Classes =====

    pub fn make_new(&self, class: &str) -> String {
        format!("{}_{}_make_new", self.module, class)
    }

    pub fn instance_layout(&self, class: &str) -> String {
        format!("{}_{}_obj_t", self.module, class)
    }

    pub fn locals_table(&self, class: &str) -> String {
        format!("{}_{}_locals_dict_table", self.module, class)
    }

    pub fn locals_dict(&self, class: &str) -> String {
        format!("{}_{}_locals_dict", self.module, class)
    }

    pub fn type_object(&self, class: &str) -> String {
        format!("{}_{}_type", self.module, class)
    }

    // ===== Module =====

    pub fn globals_table(&self) -> String {
        format!("{}_module_globals_table", self.module)
    }

    pub fn globals_dict(&self) -> String {
        format!("{}_module_globals", self.module)
    }

    pub fn module_object(&self) -> String {
        format!("{}_user_cmodule", self.module)
    }

    /// Feature flag gating the whole module: `MODULE_<NAME>_ENABLED`
    pub fn feature_flag(&self) -> String {
        format!("MODULE_{}_ENABLED", self.module.to_uppercase())
    }

    /// Output file for the generated C source
    pub fn source_file(&self) -> String {
        format!("mod{}.c", self.module)
    }

    /// Output file for the identifier table
    pub fn symbol_file(&self) -> String {
        format!("qstrdefs{}.h", self.module)
    }
}

/// Interned-string reference for an identifier: `MP_QSTR_<name>`
pub fn qstr(name: &str) -> String {
    format!("{}{}", QSTR_PREFIX, name)
}
