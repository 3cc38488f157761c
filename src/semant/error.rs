use std::{error::Error, fmt::Display};

use crate::ast::Position;

/// The diagnostic categories reported by the semantic passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Semantic,
    Type,
    Name,
    Attribute,
    TypeInference,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ErrorKind::Semantic => "SemanticError",
            ErrorKind::Type => "TypeError",
            ErrorKind::Name => "NameError",
            ErrorKind::Attribute => "AttributeError",
            ErrorKind::TypeInference => "TypeInferenceError",
        })
    }
}

/// A positioned diagnostic. Passes accumulate these and keep going; they are
/// data, not control flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub message: String,
    pub position: Position,
}

impl Diagnostic {
    pub fn new(kind: ErrorKind, position: Position, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            position,
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (line, col) = self.position;
        write!(f, "({line}, {col}) - {}: {}", self.kind, self.message)
    }
}

impl Error for Diagnostic {}

/// An unpositioned failure raised by the type model; the pass that observes
/// it attaches a position and a kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticError(String);

impl SemanticError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl Display for SemanticError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for SemanticError {}
