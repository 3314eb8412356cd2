//! CP variable types.
//!
//! Variables live inside a [`CpModel`](super::CpModel); the types here are
//! lightweight handles plus the domain definition stored by the model.

/// Handle to a boolean decision variable.
///
/// Internally a 0/1 integer variable, so it can appear in linear
/// constraints alongside [`IntVar`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoolVar(pub(crate) usize);

impl BoolVar {
    /// Index of the variable inside its model.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle to an integer decision variable with a bounded domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntVar(pub(crate) usize);

impl IntVar {
    /// Index of the variable inside its model.
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<BoolVar> for IntVar {
    fn from(var: BoolVar) -> Self {
        IntVar(var.0)
    }
}

/// Whether a variable was declared boolean or integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Bool,
    Int,
}

/// A variable definition: name plus the initial domain `[min, max]`.
#[derive(Debug, Clone)]
pub struct VarDef {
    /// Variable name (diagnostic only; handles are the identity).
    pub name: String,
    /// Minimum value.
    pub min: i64,
    /// Maximum value.
    pub max: i64,
    /// Declared kind.
    pub kind: VarKind,
}

impl VarDef {
    /// Creates a boolean definition with domain `[0, 1]`.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min: 0,
            max: 1,
            kind: VarKind::Bool,
        }
    }

    /// Creates an integer definition with domain `[min, max]`.
    pub fn integer(name: impl Into<String>, min: i64, max: i64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
            kind: VarKind::Int,
        }
    }

    /// Whether this variable is fixed to a single value.
    pub fn is_fixed(&self) -> bool {
        self.min == self.max
    }

    /// Domain size (max - min + 1). Zero or negative means empty.
    pub fn domain_size(&self) -> i64 {
        self.max - self.min + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_def() {
        let v = VarDef::integer("x", 0, 10);
        assert_eq!(v.domain_size(), 11);
        assert!(!v.is_fixed());
        assert_eq!(v.kind, VarKind::Int);

        let f = VarDef::integer("y", 5, 5);
        assert!(f.is_fixed());
        assert_eq!(f.domain_size(), 1);
    }

    #[test]
    fn test_bool_def() {
        let b = VarDef::boolean("flag");
        assert_eq!((b.min, b.max), (0, 1));
        assert_eq!(b.kind, VarKind::Bool);
    }

    #[test]
    fn test_bool_handle_converts_to_int() {
        let b = BoolVar(7);
        let i: IntVar = b.into();
        assert_eq!(i.index(), 7);
    }
}
