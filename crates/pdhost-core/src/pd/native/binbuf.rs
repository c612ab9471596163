//! Token buffer backing atom boxes and comments

use crate::pd::atom::Atom;

/// Atom type tags as the interpreter numbers them
///
/// Atom boxes store one of `Null` (list), `Float` or `Symbol` as their
/// flavor. Anything else in a flavor field is a corrupt or foreign layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomType {
    Null,
    Float,
    Symbol,
    Pointer,
    Semi,
    Comma,
    Dollar,
    DollarSymbol,
}

/// One element of a [`Binbuf`]
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Float(f32),
    Symbol(String),
    Semi,
    Comma,
    /// `$N` argument reference
    Dollar(u32),
    /// Symbol containing `$` references, e.g. `$0-gain`
    DollarSymbol(String),
}

impl Token {
    /// Type tag of this token
    pub fn atom_type(&self) -> AtomType {
        match self {
            Token::Float(_) => AtomType::Float,
            Token::Symbol(_) => AtomType::Symbol,
            Token::Semi => AtomType::Semi,
            Token::Comma => AtomType::Comma,
            Token::Dollar(_) => AtomType::Dollar,
            Token::DollarSymbol(_) => AtomType::DollarSymbol,
        }
    }

    /// Host-side value of this token; structural tokens map to [`Atom::None`]
    pub fn to_atom(&self) -> Atom {
        match self {
            Token::Float(f) => Atom::Float(*f),
            Token::Symbol(s) => Atom::Symbol(s.clone()),
            _ => Atom::None,
        }
    }
}

impl From<&Atom> for Token {
    fn from(atom: &Atom) -> Self {
        match atom {
            Atom::Float(f) => Token::Float(*f),
            Atom::Symbol(s) => Token::Symbol(s.clone()),
            // an empty atom has no token form; the interpreter stores it as 0
            Atom::None => Token::Float(0.0),
        }
    }
}

/// Ordered token buffer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Binbuf {
    tokens: Vec<Token>,
}

impl Binbuf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// Replace the whole buffer with a single token
    pub fn set_single(&mut self, token: Token) {
        self.tokens.clear();
        self.tokens.push(token);
    }

    /// First token, if any
    pub fn first(&self) -> Option<&Token> {
        self.tokens.first()
    }

    /// Whether the buffer holds exactly one token of type `expected`
    pub fn is_single(&self, expected: AtomType) -> bool {
        self.tokens.len() == 1 && self.tokens[0].atom_type() == expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_single() {
        let buf = Binbuf::from_tokens(vec![Token::Float(1.0)]);
        assert!(buf.is_single(AtomType::Float));
        assert!(!buf.is_single(AtomType::Symbol));

        let buf = Binbuf::from_tokens(vec![Token::Float(1.0), Token::Float(2.0)]);
        assert!(!buf.is_single(AtomType::Float));
        assert!(!Binbuf::new().is_single(AtomType::Float));
    }

    #[test]
    fn test_structural_tokens_are_empty_atoms() {
        assert_eq!(Token::Semi.to_atom(), Atom::None);
        assert_eq!(Token::Dollar(1).to_atom(), Atom::None);
        assert_eq!(Token::Symbol("foo".into()).to_atom(), Atom::Symbol("foo".into()));
    }
}
