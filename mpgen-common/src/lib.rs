//! MicroPython Binding Generator - Common Types
//!
//! This crate contains the descriptor model, the derived types and the
//! error definitions shared by the code generator and the driver.

pub mod descriptor;
pub mod error;
pub mod types;

pub use descriptor::{
    ClassDescriptor, DefaultValue, FunctionDescriptor, ModuleDescriptor, ParameterDescriptor,
    ParameterKind, CONSTRUCTOR_NAME,
};
pub use error::GenError;
pub use types::*;
