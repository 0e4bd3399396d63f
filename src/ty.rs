//! Language types for mini-C
//!
//! Four scalar types and the widening order used for implicit
//! conversions: `bool` < `int` < `float`. `void` never participates
//! in coercion.

use std::fmt;

/// A mini-C type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ty {
    Bool,
    Int,
    Float,
    Void,
}

impl Ty {
    /// The wider of two value types: `float` beats `int` beats `bool`.
    pub fn widest(a: Ty, b: Ty) -> Ty {
        if a == Ty::Float || b == Ty::Float {
            Ty::Float
        } else if a == Ty::Int || b == Ty::Int {
            Ty::Int
        } else {
            Ty::Bool
        }
    }

    /// Whether this type can hold a value (everything but `void`)
    pub fn is_value(&self) -> bool {
        *self != Ty::Void
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Ty::Bool => "bool",
            Ty::Int => "int",
            Ty::Float => "float",
            Ty::Void => "void",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widest() {
        assert_eq!(Ty::widest(Ty::Bool, Ty::Bool), Ty::Bool);
        assert_eq!(Ty::widest(Ty::Bool, Ty::Int), Ty::Int);
        assert_eq!(Ty::widest(Ty::Int, Ty::Bool), Ty::Int);
        assert_eq!(Ty::widest(Ty::Int, Ty::Float), Ty::Float);
        assert_eq!(Ty::widest(Ty::Float, Ty::Bool), Ty::Float);
        assert_eq!(Ty::widest(Ty::Int, Ty::Int), Ty::Int);
    }

    #[test]
    fn test_display() {
        assert_eq!(Ty::Bool.to_string(), "bool");
        assert_eq!(Ty::Float.to_string(), "float");
    }
}
