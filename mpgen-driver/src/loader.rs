//! Descriptor loading
//!
//! Reads a module descriptor from its JSON file, stamps method owners and
//! checks the structural invariants before any code is generated.

use log::{debug, info};
use mpgen_common::{GenError, ModuleDescriptor};
use std::fs;
use std::path::Path;

/// Load and validate the descriptor of `module` from `path`
pub fn load_descriptor(module: &str, path: &Path) -> Result<ModuleDescriptor, GenError> {
    debug!("Reading descriptor for '{}' from {}", module, path.display());
    let text = fs::read_to_string(path).map_err(|e| {
        GenError::load_failure(module, format!("cannot read {}: {}", path.display(), e))
    })?;
    parse_descriptor(module, &text)
}

/// Parse and validate descriptor JSON text
pub fn parse_descriptor(module: &str, text: &str) -> Result<ModuleDescriptor, GenError> {
    let mut descriptor: ModuleDescriptor = serde_json::from_str(text)
        .map_err(|e| GenError::load_failure(module, format!("invalid descriptor: {}", e)))?;

    if descriptor.name != module {
        return Err(GenError::load_failure(
            module,
            format!("descriptor declares module '{}'", descriptor.name),
        ));
    }

    descriptor.adopt_methods();
    descriptor.validate()?;

    info!(
        "Loaded '{}': {} functions, {} classes",
        descriptor.name,
        descriptor.functions.len(),
        descriptor.classes.len()
    );
    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const COUNTER: &str = r#"{
        "name": "example",
        "classes": [
            { "name": "Counter", "methods": [
                { "name": "__init__", "params": [ {"name": "self"}, {"name": "size"} ] },
                { "name": "value", "params": [ {"name": "self"} ] }
            ] }
        ]
    }"#;

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(COUNTER.as_bytes()).unwrap();

        let descriptor = load_descriptor("example", file.path()).unwrap();
        let counter = &descriptor.classes[0];
        assert!(counter.methods.iter().all(|m| m.owner.as_deref() == Some("Counter")));
        assert!(counter.constructor().is_some());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_descriptor("example", &dir.path().join("example.json")).unwrap_err();
        assert!(matches!(err, GenError::DescriptorLoadFailure { ref module, .. } if module == "example"));
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_descriptor("example", "{ \"name\": ").unwrap_err();
        assert!(err.to_string().contains("invalid descriptor"));
    }

    #[test]
    fn test_module_name_mismatch() {
        let err = parse_descriptor("other", COUNTER).unwrap_err();
        assert!(err.to_string().contains("descriptor declares module 'example'"));
    }

    #[test]
    fn test_rejects_duplicate_constructors() {
        let text = r#"{
            "name": "example",
            "classes": [ { "name": "Pin", "methods": [
                { "name": "__init__", "params": [ {"name": "self"} ] },
                { "name": "__init__", "params": [ {"name": "self"}, {"name": "id"} ] }
            ] } ]
        }"#;
        let err = parse_descriptor("example", text).unwrap_err();
        assert!(err.to_string().contains("declares 2 constructors"));
    }

    #[test]
    fn test_rejects_duplicate_globals() {
        let text = r#"{
            "name": "example",
            "functions": [ { "name": "add" }, { "name": "add" }, { "name": "Counter" } ],
            "classes": [ { "name": "Counter" } ]
        }"#;
        let err = parse_descriptor("example", text).unwrap_err();
        assert!(matches!(err, GenError::DescriptorLoadFailure { .. }));
        assert!(err.to_string().contains("'add' more than once"));
    }

    #[test]
    fn test_bundled_demo_descriptor() {
        let descriptor = parse_descriptor("example", include_str!("../../demos/example.json")).unwrap();
        assert_eq!(descriptor.functions.len(), 4);
        assert!(mpgen_codegen::generate(&descriptor).is_ok());
    }
}
