//! Content Stream Objects
//!
//! The token model produced by the content stream tokenizer
//! (ISO 32000-1 Section 7.3 object types plus content stream operators).

use super::number::PdfNumber;
use std::collections::HashMap;
use std::fmt;

/// PDF Name object
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PdfName(pub String);

/// PDF String object (literal or hexadecimal)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfString(pub Vec<u8>);

/// PDF Array object
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PdfArray(pub Vec<Token>);

/// PDF Dictionary object
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PdfDictionary(pub HashMap<PdfName, Token>);

/// A dictionary followed by its raw (still encoded) stream bytes
#[derive(Debug, Clone, PartialEq)]
pub struct PdfStream {
    pub dict: PdfDictionary,
    pub data: Vec<u8>,
}

/// Object number and generation of an indirect reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId {
    pub number: u32,
    pub generation: u16,
}

/// A content stream operator
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    /// Operator mnemonic (e.g. `Tj`, `BI`)
    pub name: String,
    /// Image parameters collected after `BI`
    pub image_parameters: Option<PdfDictionary>,
    /// Raw inline image bytes (`ID` ... `EI`)
    pub image_data: Option<Vec<u8>>,
}

/// One classified unit of a content stream
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Null,
    Boolean(bool),
    Number(PdfNumber),
    String(PdfString),
    Name(PdfName),
    Array(PdfArray),
    Dictionary(PdfDictionary),
    /// Dictionary followed by `stream` ... `endstream`
    Stream(PdfStream),
    /// Indirect reference. A bare `R` is a placeholder (`None`); the two
    /// preceding numbers belong to the caller.
    Reference(Option<ObjectId>),
    Operator(Operator),
}

/// Resolves indirect references needed while tokenizing, currently only the
/// `/Length` of an embedded stream.
pub trait ObjectResolver {
    /// Resolve `id` to an integer value, if it names one
    fn resolve_integer(&self, id: ObjectId) -> Option<i64>;
}

impl ObjectResolver for HashMap<ObjectId, i64> {
    fn resolve_integer(&self, id: ObjectId) -> Option<i64> {
        self.get(&id).copied()
    }
}

impl Token {
    /// Create a name token
    pub fn name(name: impl Into<String>) -> Self {
        Token::Name(PdfName(name.into()))
    }

    /// Create an operator token without inline image data
    pub fn operator(name: impl Into<String>) -> Self {
        Token::Operator(Operator::new(name))
    }

    /// Create an integer number token
    pub fn integer(value: i64) -> Self {
        Token::Number(PdfNumber::from_integer(value))
    }

    /// Check if this token is null
    pub fn is_null(&self) -> bool {
        matches!(self, Token::Null)
    }

    /// Get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Token::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as number
    pub fn as_number(&self) -> Option<&PdfNumber> {
        match self {
            Token::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Get as integer, if the number was written without a decimal point
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Token::Number(n) if n.is_integer() => Some(n.as_long()),
            _ => None,
        }
    }

    /// Get as string
    pub fn as_string(&self) -> Option<&PdfString> {
        match self {
            Token::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as name
    pub fn as_name(&self) -> Option<&PdfName> {
        match self {
            Token::Name(n) => Some(n),
            _ => None,
        }
    }

    /// Get as array
    pub fn as_array(&self) -> Option<&PdfArray> {
        match self {
            Token::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Get as dictionary
    pub fn as_dict(&self) -> Option<&PdfDictionary> {
        match self {
            Token::Dictionary(d) => Some(d),
            Token::Stream(s) => Some(&s.dict),
            _ => None,
        }
    }

    /// Get as stream
    pub fn as_stream(&self) -> Option<&PdfStream> {
        match self {
            Token::Stream(s) => Some(s),
            _ => None,
        }
    }

    /// Get as operator
    pub fn as_operator(&self) -> Option<&Operator> {
        match self {
            Token::Operator(op) => Some(op),
            _ => None,
        }
    }

    /// Whether this is the operator `name`
    pub fn is_operator(&self, name: &str) -> bool {
        matches!(self, Token::Operator(op) if op.name == name)
    }

    /// Short description used in error messages
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Null => "null".to_string(),
            Token::Boolean(b) => b.to_string(),
            Token::Number(n) => format!("number {n}"),
            Token::String(_) => "string".to_string(),
            Token::Name(n) => format!("name /{}", n.0),
            Token::Array(_) => "array".to_string(),
            Token::Dictionary(_) => "dictionary".to_string(),
            Token::Stream(_) => "stream".to_string(),
            Token::Reference(_) => "R".to_string(),
            Token::Operator(op) => format!("operator {}", op.name),
        }
    }
}

impl Operator {
    /// Create an operator without inline image data
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image_parameters: None,
            image_data: None,
        }
    }

    /// Create an operator carrying raw inline image bytes
    pub fn with_image_data(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            image_data: Some(data),
            ..Self::new(name)
        }
    }
}

impl PdfDictionary {
    /// Create a new empty dictionary
    pub fn new() -> Self {
        PdfDictionary(HashMap::new())
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&Token> {
        self.0.get(&PdfName(key.to_string()))
    }

    /// Insert a key-value pair
    pub fn insert(&mut self, key: impl Into<String>, value: Token) {
        self.0.insert(PdfName(key.into()), value);
    }

    /// Check if dictionary contains a key
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(&PdfName(key.to_string()))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if dictionary is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PdfArray {
    /// Create a new empty array
    pub fn new() -> Self {
        PdfArray(Vec::new())
    }

    /// Get array length
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if array is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get element at index
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.0.get(index)
    }

    /// Push an element
    pub fn push(&mut self, token: Token) {
        self.0.push(token);
    }
}

impl PdfString {
    /// Create a new PDF string
    pub fn new(data: Vec<u8>) -> Self {
        PdfString(data)
    }

    /// Get as UTF-8 string if possible
    pub fn as_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.0)
    }

    /// Get as bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl PdfName {
    /// Create a new PDF name
    pub fn new(name: impl Into<String>) -> Self {
        PdfName(name.into())
    }

    /// Get the name as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ObjectId {
    /// Reference to object `number` at `generation`
    pub fn new(number: u32, generation: u16) -> Self {
        Self { number, generation }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.number, self.generation)
    }
}
