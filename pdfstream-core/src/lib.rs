//! # pdfstream
//!
//! A pure Rust tokenizer for PDF content streams: the page-description
//! byte streams that mix operands, operators and inline image data.
//!
//! ## Features
//!
//! - **Single-pass tokenizer**: one classified token per call with bounded lookahead
//! - **Exact numbers**: decimal values with a canonical, shortest round-trip rendering
//! - **Inline images**: `BI` ... `ID` ... `EI` blocks with their raw data attached
//! - **Embedded streams**: `<< ... >> stream ... endstream` with `/Length` resolution
//! - **Best-effort mode**: keeps going past damaged input, or fails fast in strict mode
//!
//! ## Quick Start
//!
//! ```rust
//! use pdfstream::parser::{ContentParser, Token};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tokens = ContentParser::parse(b"BT /F1 12 Tf (Hello) Tj ET")?;
//!
//! assert_eq!(tokens.len(), 7);
//! assert!(tokens[0].is_operator("BT"));
//! assert_eq!(tokens[1], Token::name("F1"));
//! # Ok(())
//! # }
//! ```
//!
//! ### Token by token
//!
//! ```rust
//! use pdfstream::parser::{ContentTokenizer, ParseOptions, SliceCursor};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let input = b"q BI /W 1 /H 1 ID \x80 EI Q";
//! let mut tokenizer = ContentTokenizer::from_cursor(SliceCursor::new(input), ParseOptions::strict());
//!
//! while let Some(token) = tokenizer.next_token()? {
//!     if let Some(op) = token.as_operator() {
//!         println!("{} ({} image bytes)", op.name, op.image_data.as_ref().map_or(0, Vec::len));
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod parser;

pub use error::{PdfError, Result};

// Re-export parsing types
pub use parser::{
    ContentParser, ContentTokenizer, ObjectId, ObjectResolver, Operator, ParseError,
    ParseOptions, PdfArray, PdfDictionary, PdfName, PdfNumber, PdfStream, PdfString, Token,
};

/// Current version of pdfstream
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
