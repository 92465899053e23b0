//! Descriptor model
//!
//! Declarative records of a module's functions and classes. Descriptors are
//! produced by a loader, validated once, and are read-only for the rest of
//! the pipeline.

use crate::error::GenError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Method name that marks a class constructor
pub const CONSTRUCTOR_NAME: &str = "__init__";

/// How a parameter may be passed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    #[default]
    Positional,
    KeywordOnly,
}

/// A default value literal, kept in the shape it was written in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DefaultValue {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Literal text that is none of the above, carried as written
    Other(String),
}

impl DefaultValue {
    /// Parse a source literal such as `None`, `True`, `42`, `1.5` or `'fast'`
    pub fn parse_literal(text: &str) -> Self {
        let text = text.trim();
        match text {
            "None" => return DefaultValue::None,
            "True" => return DefaultValue::Bool(true),
            "False" => return DefaultValue::Bool(false),
            _ => {}
        }

        if let Ok(n) = text.parse::<i64>() {
            return DefaultValue::Int(n);
        }
        if let Ok(x) = text.parse::<f64>() {
            return DefaultValue::Float(x);
        }

        let bytes = text.as_bytes();
        if bytes.len() >= 2 {
            let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
            if first == last && (first == b'\'' || first == b'"') {
                return DefaultValue::Str(text[1..text.len() - 1].to_string());
            }
        }

        DefaultValue::Other(text.to_string())
    }
}

impl From<String> for DefaultValue {
    fn from(text: String) -> Self {
        DefaultValue::parse_literal(&text)
    }
}

impl From<DefaultValue> for String {
    fn from(value: DefaultValue) -> Self {
        value.to_string()
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::None => write!(f, "None"),
            DefaultValue::Bool(true) => write!(f, "True"),
            DefaultValue::Bool(false) => write!(f, "False"),
            DefaultValue::Int(n) => write!(f, "{}", n),
            DefaultValue::Float(x) => write!(f, "{:?}", x),
            DefaultValue::Str(s) => write!(f, "'{}'", s),
            DefaultValue::Other(text) => write!(f, "{}", text),
        }
    }
}

/// One declared parameter of a function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    #[serde(default)]
    pub kind: ParameterKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

impl ParameterDescriptor {
    pub fn positional(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ParameterKind::Positional,
            default: None,
            annotation: None,
        }
    }

    pub fn keyword_only(name: &str) -> Self {
        Self {
            kind: ParameterKind::KeywordOnly,
            ..Self::positional(name)
        }
    }

    /// Attach a default given as source literal text
    pub fn with_default(mut self, literal: &str) -> Self {
        self.default = Some(DefaultValue::parse_literal(literal));
        self
    }

    pub fn with_annotation(mut self, annotation: &str) -> Self {
        self.annotation = Some(annotation.to_string());
        self
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn is_keyword_only(&self) -> bool {
        self.kind == ParameterKind::KeywordOnly
    }
}

/// A module-level function or a class method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    pub name: String,
    /// Owning class, stamped by the loader for methods
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default)]
    pub params: Vec<ParameterDescriptor>,
    #[serde(default)]
    pub varargs: bool,
    #[serde(default)]
    pub varkw: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Return annotation, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
}

impl FunctionDescriptor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            owner: None,
            params: Vec::new(),
            varargs: false,
            varkw: false,
            doc: None,
            returns: None,
        }
    }

    pub fn param(mut self, param: ParameterDescriptor) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_varargs(mut self) -> Self {
        self.varargs = true;
        self
    }

    pub fn with_varkw(mut self) -> Self {
        self.varkw = true;
        self
    }

    pub fn with_doc(mut self, doc: &str) -> Self {
        self.doc = Some(doc.to_string());
        self
    }

    pub fn with_returns(mut self, annotation: &str) -> Self {
        self.returns = Some(annotation.to_string());
        self
    }

    pub fn with_owner(mut self, owner: &str) -> Self {
        self.owner = Some(owner.to_string());
        self
    }

    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME && self.owner.is_some()
    }

    /// `Class.method` for methods, the bare name otherwise
    pub fn qualified_name(&self) -> String {
        match &self.owner {
            Some(owner) => format!("{}.{}", owner, self.name),
            None => self.name.clone(),
        }
    }

    /// Parameters that may be passed positionally, in declaration order
    pub fn positional(&self) -> impl Iterator<Item = &ParameterDescriptor> {
        self.params.iter().filter(|p| !p.is_keyword_only())
    }

    pub fn has_keyword_only(&self) -> bool {
        self.params.iter().any(ParameterDescriptor::is_keyword_only)
    }

    pub fn has_defaults(&self) -> bool {
        self.params.iter().any(ParameterDescriptor::has_default)
    }
}

/// A class and its methods in declaration order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    pub name: String,
    #[serde(default)]
    pub methods: Vec<FunctionDescriptor>,
}

impl ClassDescriptor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            methods: Vec::new(),
        }
    }

    /// Add a method, stamping this class as its owner
    pub fn method(mut self, method: FunctionDescriptor) -> Self {
        self.methods.push(method.with_owner(&self.name));
        self
    }

    pub fn constructor(&self) -> Option<&FunctionDescriptor> {
        self.methods.iter().find(|m| m.is_constructor())
    }
}

/// The whole module handed to the generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    #[serde(default)]
    pub functions: Vec<FunctionDescriptor>,
    #[serde(default)]
    pub classes: Vec<ClassDescriptor>,
}

impl ModuleDescriptor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            author: None,
            year: None,
            functions: Vec::new(),
            classes: Vec::new(),
        }
    }

    pub fn with_author(mut self, author: &str, year: u32) -> Self {
        self.author = Some(author.to_string());
        self.year = Some(year);
        self
    }

    pub fn function(mut self, function: FunctionDescriptor) -> Self {
        self.functions.push(function);
        self
    }

    pub fn class(mut self, class: ClassDescriptor) -> Self {
        self.classes.push(class);
        self
    }

    /// Stamp every method with the name of the class that declares it
    pub fn adopt_methods(&mut self) {
        for class in &mut self.classes {
            for method in &mut class.methods {
                method.owner = Some(class.name.clone());
            }
        }
    }

    /// Check the structural invariants the generator relies on
    pub fn validate(&self) -> Result<(), GenError> {
        self.check_identifier(&self.name, "module name")?;

        // Functions and classes share the module's globals table
        let mut globals = HashSet::new();
        for function in &self.functions {
            self.validate_function(function)?;
            self.check_unique(&mut globals, &function.name, "module")?;
        }

        for class in &self.classes {
            self.check_identifier(&class.name, "class name")?;
            self.check_unique(&mut globals, &class.name, "module")?;

            let constructors = class.methods.iter().filter(|m| m.name == CONSTRUCTOR_NAME).count();
            if constructors > 1 {
                return Err(GenError::load_failure(
                    &self.name,
                    format!("class '{}' declares {} constructors", class.name, constructors),
                ));
            }

            let mut locals = HashSet::new();
            for method in &class.methods {
                self.validate_function(method)?;
                if method.name != CONSTRUCTOR_NAME {
                    self.check_unique(&mut locals, &method.name, &format!("class '{}'", class.name))?;
                }
            }
        }

        Ok(())
    }

    fn check_unique<'a>(
        &self,
        seen: &mut HashSet<&'a str>,
        name: &'a str,
        scope: &str,
    ) -> Result<(), GenError> {
        if seen.insert(name) {
            Ok(())
        } else {
            Err(GenError::load_failure(
                &self.name,
                format!("{} declares '{}' more than once", scope, name),
            ))
        }
    }

    fn validate_function(&self, function: &FunctionDescriptor) -> Result<(), GenError> {
        self.check_identifier(&function.name, "function name")?;

        let mut seen = HashSet::new();
        for param in &function.params {
            self.check_identifier(&param.name, "parameter name")?;
            if !seen.insert(param.name.as_str()) {
                return Err(GenError::load_failure(
                    &self.name,
                    format!(
                        "duplicate parameter '{}' in '{}'",
                        param.name,
                        function.qualified_name()
                    ),
                ));
            }
        }
        Ok(())
    }

    fn check_identifier(&self, name: &str, what: &str) -> Result<(), GenError> {
        if is_identifier(name) {
            Ok(())
        } else {
            Err(GenError::load_failure(
                &self.name,
                format!("{} '{}' is not a valid C identifier", what, name),
            ))
        }
    }
}

/// Check for `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
