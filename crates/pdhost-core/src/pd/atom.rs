//! Host-side atom value

use std::fmt;

/// A single Pd value: a float, a symbol, or nothing
///
/// There is deliberately no lossy conversion between the variants: callers
/// match on the variant they expect.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Atom {
    Float(f32),
    Symbol(String),
    #[default]
    None,
}

impl Atom {
    pub fn is_float(&self) -> bool {
        matches!(self, Atom::Float(_))
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self, Atom::Symbol(_))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Atom::None)
    }

    /// The float, if this atom holds one
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Atom::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// The symbol text, if this atom holds one
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Atom::Symbol(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f32> for Atom {
    fn from(value: f32) -> Self {
        Atom::Float(value)
    }
}

impl From<&str> for Atom {
    fn from(value: &str) -> Self {
        Atom::Symbol(value.to_string())
    }
}

impl From<String> for Atom {
    fn from(value: String) -> Self {
        Atom::Symbol(value)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Float(v) => write!(f, "{}", v),
            Atom::Symbol(s) => write!(f, "{}", s),
            Atom::None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_cross_variant_reads() {
        let sym = Atom::from("0.5");
        assert_eq!(sym.as_float(), None);
        assert_eq!(sym.as_symbol(), Some("0.5"));

        let num = Atom::from(0.5_f32);
        assert_eq!(num.as_symbol(), None);
        assert_eq!(num.as_float(), Some(0.5));

        assert!(Atom::default().is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(Atom::Float(3.0).to_string(), "3");
        assert_eq!(Atom::Float(3.5).to_string(), "3.5");
        assert_eq!(Atom::from("foo").to_string(), "foo");
        assert_eq!(Atom::None.to_string(), "");
    }
}
