//! Signature classification
//!
//! Maps a function's parameter list onto one of the native calling
//! conventions. Rules are checked in a fixed order; the first match wins.

use log::trace;
use mpgen_common::{CallShape, FunctionDescriptor, GenError, MAX_FIXED_ARITY};

/// Derive the call shape of a function or method
pub fn classify(function: &FunctionDescriptor) -> Result<CallShape, GenError> {
    let shape = classify_params(function)?;

    if !function.is_constructor() {
        return Ok(shape);
    }

    // The receiver is supplied by the runtime, not counted by the caller
    shape.without_receiver().ok_or_else(|| {
        GenError::unsupported_shape(
            function.qualified_name(),
            "constructor must declare a required receiver parameter",
        )
    })
}

fn classify_params(function: &FunctionDescriptor) -> Result<CallShape, GenError> {
    let positional = function.positional().count();
    let defaulted = function.positional().filter(|p| p.has_default()).count();
    let required = positional - defaulted;
    let has_defaults = function.has_defaults();

    trace!(
        "classify '{}': positional={}, defaulted={}, varargs={}, varkw={}, kw_only={}",
        function.qualified_name(),
        positional,
        defaulted,
        function.varargs,
        function.varkw,
        function.has_keyword_only()
    );

    if function.varargs && function.varkw && has_defaults {
        return Err(GenError::unsupported_shape(
            function.qualified_name(),
            "*args, **kwargs and default values cannot be combined",
        ));
    }

    if function.varkw || function.has_keyword_only() {
        return Ok(CallShape::Keyword { min: required });
    }

    let shape = match (function.varargs, defaulted > 0) {
        (false, false) if positional <= MAX_FIXED_ARITY => CallShape::Fixed(positional),
        (false, false) => CallShape::VarBetween {
            min: positional,
            max: positional,
        },
        (false, true) => CallShape::VarBetween {
            min: required,
            max: positional,
        },
        (true, _) => CallShape::VarArgs { min: required },
    };

    Ok(shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpgen_common::ParameterDescriptor;

    fn func(params: &[&str]) -> FunctionDescriptor {
        params.iter().fold(FunctionDescriptor::new("f"), |f, p| {
            f.param(ParameterDescriptor::positional(p))
        })
    }

    #[test]
    fn test_fixed_arities() {
        for arity in 0..=3 {
            let names: Vec<String> = (0..arity).map(|i| format!("p{}", i)).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            assert_eq!(classify(&func(&refs)).unwrap(), CallShape::Fixed(arity));
        }
    }

    #[test]
    fn test_wide_fixed_uses_bounded_convention() {
        let f = func(&["a", "b", "c", "d", "e"]);
        assert_eq!(classify(&f).unwrap(), CallShape::VarBetween { min: 5, max: 5 });
    }

    #[test]
    fn test_defaults_give_bounded_range() {
        let f = func(&["a", "b"])
            .param(ParameterDescriptor::positional("c").with_default("0"));
        assert_eq!(classify(&f).unwrap(), CallShape::VarBetween { min: 2, max: 3 });

        let f = FunctionDescriptor::new("f")
            .param(ParameterDescriptor::positional("a").with_default("None"))
            .param(ParameterDescriptor::positional("b").with_default("True"));
        assert_eq!(classify(&f).unwrap(), CallShape::VarBetween { min: 0, max: 2 });
    }

    #[test]
    fn test_varargs() {
        let f = func(&["a"]).with_varargs();
        assert_eq!(classify(&f).unwrap(), CallShape::VarArgs { min: 1 });

        let f = FunctionDescriptor::new("f").with_varargs();
        assert_eq!(classify(&f).unwrap(), CallShape::VarArgs { min: 0 });
    }

    #[test]
    fn test_varargs_with_positional_defaults() {
        let f = func(&["a"])
            .param(ParameterDescriptor::positional("b").with_default("1"))
            .with_varargs();
        assert_eq!(classify(&f).unwrap(), CallShape::VarArgs { min: 1 });
    }

    #[test]
    fn test_varkw() {
        let f = func(&["a", "b"]).with_varkw();
        assert_eq!(classify(&f).unwrap(), CallShape::Keyword { min: 2 });

        let f = func(&["a"]).with_varargs().with_varkw();
        assert_eq!(classify(&f).unwrap(), CallShape::Keyword { min: 1 });
    }

    #[test]
    fn test_keyword_only_forces_keyword_shape() {
        // Positional count alone would give Fixed(1)
        let f = func(&["a"]).param(ParameterDescriptor::keyword_only("verbose").with_default("False"));
        assert_eq!(classify(&f).unwrap(), CallShape::Keyword { min: 1 });

        let f = func(&["a"])
            .param(ParameterDescriptor::positional("b").with_default("2"))
            .param(ParameterDescriptor::keyword_only("c"));
        assert_eq!(classify(&f).unwrap(), CallShape::Keyword { min: 1 });
    }

    #[test]
    fn test_varargs_varkw_defaults_rejected() {
        let f = func(&["a"])
            .param(ParameterDescriptor::positional("b").with_default("0"))
            .with_varargs()
            .with_varkw();
        let err = classify(&f).unwrap_err();
        assert!(matches!(err, GenError::UnsupportedSignatureShape { ref function, .. } if function == "f"));

        // A keyword-only default counts as a default too
        let f = func(&["a"])
            .param(ParameterDescriptor::keyword_only("k").with_default("1"))
            .with_varargs()
            .with_varkw();
        assert!(classify(&f).is_err());
    }

    #[test]
    fn test_constructor_drops_receiver() {
        let cases = vec![
            (func(&["self", "size"]), CallShape::Fixed(2), CallShape::Fixed(1)),
            (
                func(&["self", "a"]).param(ParameterDescriptor::positional("b").with_default("0")),
                CallShape::VarBetween { min: 2, max: 3 },
                CallShape::VarBetween { min: 1, max: 2 },
            ),
            (
                func(&["self", "a", "b", "c", "d"]),
                CallShape::VarBetween { min: 5, max: 5 },
                CallShape::VarBetween { min: 4, max: 4 },
            ),
            (func(&["self"]).with_varargs(), CallShape::VarArgs { min: 1 }, CallShape::VarArgs { min: 0 }),
            (func(&["self", "a"]).with_varkw(), CallShape::Keyword { min: 2 }, CallShape::Keyword { min: 1 }),
        ];

        for (method, plain, adjusted) in cases {
            assert_eq!(classify(&method).unwrap(), plain);
            let mut ctor = method.clone().with_owner("Counter");
            ctor.name = "__init__".to_string();
            assert_eq!(classify(&ctor).unwrap(), adjusted);
        }
    }

    #[test]
    fn test_constructor_without_receiver_rejected() {
        let ctor = FunctionDescriptor::new("__init__").with_owner("Counter");
        assert!(matches!(
            classify(&ctor),
            Err(GenError::UnsupportedSignatureShape { .. })
        ));
    }

    #[test]
    fn test_ordinary_method_keeps_receiver() {
        let method = func(&["self"]).with_owner("Counter");
        assert_eq!(classify(&method).unwrap(), CallShape::Fixed(1));
    }
}
