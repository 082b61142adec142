//! PDF Content Stream Parser Module
//!
//! This module implements a single-pass tokenizer for PDF content streams and
//! the object syntax embedded in them, following ISO 32000-1 Section 7.2-7.3
//! and Section 8.9.7 (inline images).

pub mod content;
pub mod cursor;
pub mod inline_image;
pub mod number;
pub mod objects;
pub mod options;
pub mod stack_safe;
pub mod stream;

pub use self::content::{ContentParser, ContentTokenizer};
pub use self::cursor::{ByteCursor, ReadCursor, SliceCursor};
pub use self::number::PdfNumber;
pub use self::objects::{
    ObjectId, ObjectResolver, Operator, PdfArray, PdfDictionary, PdfName, PdfStream, PdfString,
    Token,
};
pub use self::options::ParseOptions;

/// Result type for parser operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Content stream parser errors
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed number: '{literal}'")]
    MalformedNumber { literal: String },

    #[error("Unexpected end of input at position {position} while parsing {context}")]
    UnexpectedEndOfInput {
        position: usize,
        context: &'static str,
    },

    #[error("Unexpected token: expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },

    #[error("Syntax error at position {position}: {message}")]
    SyntaxError { position: usize, message: String },

    #[error("Maximum nesting depth exceeded: {depth}")]
    RecursionLimitExceeded { depth: usize },
}

impl ParseError {
    /// Whether the outermost driver may substitute a sentinel and continue
    /// in best-effort mode.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ParseError::UnexpectedEndOfInput { .. } | ParseError::MalformedNumber { .. }
        )
    }
}
