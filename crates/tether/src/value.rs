//! # Boundary Value Model
//!
//! The values that may appear at a realm boundary. Primitives have no
//! reference identity and cross freely; callables cross by proxy; composites
//! do not cross at all.

use std::sync::Arc;

use crate::callable::Callable;

/// A value visible to realm code.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// The absent value (undefined receiver, missing argument).
    Absent,
    Bool(bool),
    Number(f64),
    /// Text is compared and passed by value.
    Text(String),
    /// A callable reference value. See [`Callable`].
    Callable(Callable),
    /// A composite non-callable reference value. Exists so that the
    /// non-transferable case is a real value shape, not a phantom.
    List(Arc<Vec<Value>>),
}

impl Value {
    /// Convenience constructor for text values.
    pub fn text(s: &str) -> Self {
        Self::Text(s.to_string())
    }

    /// True if the value has no reference identity.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Self::Absent | Self::Bool(_) | Self::Number(_) | Self::Text(_)
        )
    }

    /// True if the value satisfies the callable capability.
    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Callable(_))
    }

    /// Short shape name, used in error text.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Text(_) => "text",
            Self::Callable(_) => "callable",
            Self::List(_) => "list",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives_are_primitive() {
        assert!(Value::Absent.is_primitive());
        assert!(Value::Bool(true).is_primitive());
        assert!(Value::Number(4.25).is_primitive());
        assert!(Value::text("hello").is_primitive());
    }

    #[test]
    fn test_composites_are_not_primitive() {
        let list = Value::List(Arc::new(vec![Value::Number(1.0)]));
        assert!(!list.is_primitive());
        assert!(!list.is_callable());
        assert_eq!(list.kind_name(), "list");
    }
}
