use crate::parser::ParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Content stream too large: {0} bytes")]
    ContentStreamTooLarge(usize),
}

pub type Result<T> = std::result::Result<T, PdfError>;
