//! Derived types shared between the classifier, the type mapper and the emitter
//!
//! These values are computed from descriptors and never written back into
//! them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest arity served by a dedicated fixed-argument calling convention
pub const MAX_FIXED_ARITY: usize = 3;

/// Native calling convention a binding function is generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallShape {
    /// Exactly 0..=3 positional arguments, each passed as its own parameter
    Fixed(usize),
    /// Bounded positional arguments passed as an array
    VarBetween { min: usize, max: usize },
    /// Open-ended positional arguments passed as an array
    VarArgs { min: usize },
    /// Positional array plus a keyword map
    Keyword { min: usize },
}

impl CallShape {
    /// Minimum number of positional arguments accepted
    pub fn min(&self) -> usize {
        match *self {
            CallShape::Fixed(n) => n,
            CallShape::VarBetween { min, .. }
            | CallShape::VarArgs { min }
            | CallShape::Keyword { min } => min,
        }
    }

    /// Maximum number of positional arguments, `None` when unbounded
    pub fn max(&self) -> Option<usize> {
        match *self {
            CallShape::Fixed(n) => Some(n),
            CallShape::VarBetween { max, .. } => Some(max),
            CallShape::VarArgs { .. } | CallShape::Keyword { .. } => None,
        }
    }

    /// Whether the convention receives a keyword map
    pub fn takes_keywords(&self) -> bool {
        matches!(self, CallShape::Keyword { .. })
    }

    /// Whether arguments are validated against an `mp_arg_t` table
    pub fn has_arg_table(&self) -> bool {
        matches!(self, CallShape::VarBetween { .. } | CallShape::Keyword { .. })
    }

    /// The same shape with the implicit receiver removed from every bound.
    ///
    /// Returns `None` when a bound is already zero.
    pub fn without_receiver(self) -> Option<CallShape> {
        Some(match self {
            CallShape::Fixed(n) => CallShape::Fixed(n.checked_sub(1)?),
            CallShape::VarBetween { min, max } => CallShape::VarBetween {
                min: min.checked_sub(1)?,
                max: max.checked_sub(1)?,
            },
            CallShape::VarArgs { min } => CallShape::VarArgs { min: min.checked_sub(1)? },
            CallShape::Keyword { min } => CallShape::Keyword { min: min.checked_sub(1)? },
        })
    }
}

impl fmt::Display for CallShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallShape::Fixed(n) => write!(f, "Fixed({})", n),
            CallShape::VarBetween { min, max } => write!(f, "VarBetween({}, {})", min, max),
            CallShape::VarArgs { min } => write!(f, "VarArgs({})", min),
            CallShape::Keyword { min } => write!(f, "Keyword({})", min),
        }
    }
}

/// Native argument kind of a parameter slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArgKind {
    Integer,
    Object,
    Boolean,
    /// Object slot that may hold the null sentinel
    NullableObject,
}

impl ArgKind {
    /// Check if values of this kind are stored as interpreter objects
    pub fn is_object(&self) -> bool {
        matches!(self, ArgKind::Object | ArgKind::NullableObject)
    }
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgKind::Integer => write!(f, "int"),
            ArgKind::Object => write!(f, "object"),
            ArgKind::Boolean => write!(f, "bool"),
            ArgKind::NullableObject => write!(f, "object or None"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_bounds() {
        assert_eq!(CallShape::Fixed(2).min(), 2);
        assert_eq!(CallShape::Fixed(2).max(), Some(2));
        assert_eq!(CallShape::VarBetween { min: 1, max: 4 }.max(), Some(4));
        assert_eq!(CallShape::VarArgs { min: 1 }.max(), None);
        assert!(CallShape::Keyword { min: 0 }.takes_keywords());
        assert!(!CallShape::VarArgs { min: 0 }.has_arg_table());
    }

    #[test]
    fn test_without_receiver() {
        assert_eq!(CallShape::Fixed(2).without_receiver(), Some(CallShape::Fixed(1)));
        assert_eq!(
            CallShape::VarBetween { min: 1, max: 3 }.without_receiver(),
            Some(CallShape::VarBetween { min: 0, max: 2 })
        );
        assert_eq!(CallShape::Fixed(0).without_receiver(), None);
        assert_eq!(CallShape::Keyword { min: 0 }.without_receiver(), None);
    }

    #[test]
    fn test_shape_display() {
        assert_eq!(CallShape::VarBetween { min: 2, max: 3 }.to_string(), "VarBetween(2, 3)");
        assert_eq!(CallShape::Keyword { min: 1 }.to_string(), "Keyword(1)");
    }
}
