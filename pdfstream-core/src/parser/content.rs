//! PDF Content Stream Parser
//!
//! This module implements tokenizing of PDF content streams according to the
//! PDF specification. Content streams mix operands (numbers, strings, names,
//! arrays, dictionaries) with operators, and may embed inline images whose
//! raw bytes can only be delimited heuristically.
//!
//! [`ContentTokenizer`] yields one [`Token`] per call and recurses into
//! composite values. [`ContentParser`] drives it to the end of the input and
//! applies the best-effort recovery policy of [`ParseOptions`].

use super::cursor::{is_whitespace, ByteCursor, ReadCursor, SliceCursor};
use super::inline_image::read_inline_image_data;
use super::number::PdfNumber;
use super::objects::{
    ObjectId, ObjectResolver, Operator, PdfArray, PdfDictionary, PdfName, PdfStream, PdfString,
    Token,
};
use super::options::ParseOptions;
use super::stack_safe::StackSafeContext;
use super::stream::read_stream_data;
use super::{ParseError, ParseResult};
use crate::error::{PdfError, Result};
use std::fs::File;
use std::path::Path;
use tracing::{debug, trace, warn};

/// Delimiter characters (ISO 32000-1 Section 7.2.2)
fn is_delimiter(byte: u8) -> bool {
    matches!(
        byte,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

/// Bytes that end a bare word (operators and keywords)
fn ends_word(byte: u8) -> bool {
    is_whitespace(byte)
        || matches!(
            byte,
            b']' | b')' | b'>' | b'[' | b'<' | b'(' | b'/' | b'%' | b'0'..=b'9'
        )
}

fn object_id(number: i64, generation: Option<i64>) -> Option<ObjectId> {
    Some(ObjectId::new(
        u32::try_from(number).ok()?,
        u16::try_from(generation?).ok()?,
    ))
}

/// Content stream tokenizer
pub struct ContentTokenizer<'r, C> {
    cursor: C,
    options: ParseOptions,
    resolver: Option<&'r dyn ObjectResolver>,
    /// Word read while probing for `stream` after a dictionary
    pending: Option<Token>,
    finished: bool,
}

impl<'r, 'a> ContentTokenizer<'r, SliceCursor<'a>> {
    /// Create a new tokenizer for the given input with default options
    pub fn new(input: &'a [u8]) -> Self {
        Self::from_cursor(SliceCursor::new(input), ParseOptions::default())
    }
}

impl<'r, C: ByteCursor> ContentTokenizer<'r, C> {
    /// Create a tokenizer over any byte cursor
    pub fn from_cursor(cursor: C, options: ParseOptions) -> Self {
        Self {
            cursor,
            options,
            resolver: None,
            pending: None,
            finished: false,
        }
    }

    /// Use `resolver` for indirect `/Length` entries of embedded streams
    pub fn with_resolver<'s>(self, resolver: &'s dyn ObjectResolver) -> ContentTokenizer<'s, C> {
        ContentTokenizer {
            cursor: self.cursor,
            options: self.options,
            resolver: Some(resolver),
            pending: self.pending,
            finished: self.finished,
        }
    }

    /// Options this tokenizer was created with
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Number of input bytes consumed so far
    pub fn offset(&self) -> usize {
        self.cursor.position()
    }

    /// Whether every byte and buffered token has been handed out
    pub fn is_at_end(&mut self) -> ParseResult<bool> {
        Ok(self.pending.is_none() && self.cursor.is_eof()?)
    }

    /// Release the underlying byte source
    pub fn close(&mut self) -> ParseResult<()> {
        self.pending = None;
        self.finished = true;
        self.cursor.close()
    }

    /// Recover the cursor
    pub fn into_inner(self) -> C {
        self.cursor
    }

    /// Get the next token from the stream.
    ///
    /// Returns `Ok(None)` at the end of the input, and in best-effort mode
    /// also when the next byte cannot start any token.
    pub fn next_token(&mut self) -> ParseResult<Option<Token>> {
        let mut context = StackSafeContext::with_limit(self.options.max_depth);
        self.read_token(&mut context)
    }

    fn read_token(&mut self, ctx: &mut StackSafeContext) -> ParseResult<Option<Token>> {
        if let Some(token) = self.pending.take() {
            return Ok(Some(token));
        }

        self.skip_whitespace()?;
        let Some(byte) = self.cursor.peek()? else {
            return Ok(None);
        };
        let position = self.cursor.position();

        // Only composite values recurse through this frame
        let token = match byte {
            b'<' => {
                self.cursor.read()?;
                if self.cursor.peek()? == Some(b'<') {
                    self.cursor.read()?;
                    let dict = self.parse_dictionary(ctx)?;
                    self.finish_dictionary(dict)?
                } else {
                    self.read_hex_string()?
                }
            }
            b'[' => {
                self.cursor.read()?;
                Token::Array(self.parse_array(ctx)?)
            }
            b'B' => {
                let word = self.read_word()?;
                if word == "BI" {
                    self.read_inline_image(ctx)?
                } else {
                    Token::Operator(Operator::new(word))
                }
            }
            _ => return self.read_scalar(byte, position),
        };

        trace_token(position, &token);
        Ok(Some(token))
    }

    /// Any token that cannot contain other tokens
    #[inline(never)]
    fn read_scalar(&mut self, byte: u8, position: usize) -> ParseResult<Option<Token>> {
        let token = match byte {
            b'(' => {
                self.cursor.read()?;
                self.read_literal_string()?
            }
            b'/' => {
                self.cursor.read()?;
                self.read_name()?
            }
            b'n' | b't' | b'f' | b'R' => {
                let word = self.read_word()?;
                match word.as_str() {
                    "null" => Token::Null,
                    "true" => Token::Boolean(true),
                    "false" => Token::Boolean(false),
                    "R" => Token::Reference(None),
                    _ => Token::Operator(Operator::new(word)),
                }
            }
            b'0'..=b'9' | b'+' | b'-' | b'.' => self.read_number()?,
            b'I' => {
                self.cursor.read()?;
                let second = self.cursor.read()?;
                if second != Some(b'D') {
                    let mut found = String::from("I");
                    found.extend(second.map(char::from));
                    return Err(ParseError::UnexpectedToken {
                        expected: "ID".to_string(),
                        found,
                    });
                }
                let data = read_inline_image_data(&mut self.cursor)?;
                Token::Operator(Operator::with_image_data("ID", data))
            }
            b']' => {
                if !self.options.lenient_syntax {
                    return Err(ParseError::UnexpectedToken {
                        expected: "token".to_string(),
                        found: "]".to_string(),
                    });
                }
                // Unbalanced ']' in a damaged stream
                self.cursor.read()?;
                debug!(position, "stray ']' read as null");
                Token::Null
            }
            _ => {
                let word = self.read_word()?;
                if word.chars().all(|c| c <= ' ') {
                    if self.options.lenient_syntax {
                        return Ok(None);
                    }
                    return Err(ParseError::UnexpectedToken {
                        expected: "operator".to_string(),
                        found: format!("{:?}", char::from(byte)),
                    });
                }
                Token::Operator(Operator::new(word))
            }
        };

        trace_token(position, &token);
        Ok(Some(token))
    }

    fn end_of_input(&self, context: &'static str) -> ParseError {
        ParseError::UnexpectedEndOfInput {
            position: self.cursor.position(),
            context,
        }
    }

    fn skip_whitespace(&mut self) -> ParseResult<()> {
        while let Some(byte) = self.cursor.peek()? {
            if is_whitespace(byte) {
                self.cursor.read()?;
            } else if byte == b'%' {
                self.skip_comment()?;
            } else {
                break;
            }
        }
        Ok(())
    }

    fn skip_comment(&mut self) -> ParseResult<()> {
        while let Some(byte) = self.cursor.read()? {
            if byte == b'\n' || byte == b'\r' {
                break;
            }
        }
        Ok(())
    }

    /// A nested read returned `None` in best-effort mode. Drop the byte that
    /// could not start a token unless the read already consumed something.
    fn skip_unreadable(&mut self, before: usize, context: &'static str) -> ParseResult<()> {
        if self.cursor.position() != before {
            return Ok(());
        }
        match self.cursor.read()? {
            Some(byte) => {
                warn!(
                    position = before,
                    byte = %char::from(byte).escape_default(),
                    context,
                    "skipping unreadable byte"
                );
                Ok(())
            }
            None => Err(self.end_of_input(context)),
        }
    }

    fn read_word(&mut self) -> ParseResult<String> {
        let mut word = String::with_capacity(4);
        while let Some(byte) = self.cursor.peek()? {
            if ends_word(byte) {
                break;
            }
            self.cursor.read()?;
            word.push(char::from(byte));

            // Type 3 glyph operators d0 and d1
            if byte == b'd' {
                if let Some(digit @ (b'0' | b'1')) = self.cursor.peek()? {
                    self.cursor.read()?;
                    word.push(char::from(digit));
                }
            }
        }
        Ok(word)
    }

    fn read_number(&mut self) -> ParseResult<Token> {
        let mut literal = String::with_capacity(8);
        let mut seen_dot = false;

        // Sign or dot only in first position
        if let Some(first) = self.cursor.read()? {
            seen_dot = first == b'.';
            literal.push(char::from(first));
        }

        while let Some(byte) = self.cursor.peek()? {
            match byte {
                b'0'..=b'9' => {}
                b'.' if !seen_dot => seen_dot = true,
                _ => break,
            }
            self.cursor.read()?;
            literal.push(char::from(byte));
        }

        PdfNumber::from_literal(&literal).map(Token::Number)
    }

    fn read_literal_string(&mut self) -> ParseResult<Token> {
        let mut result = Vec::new();
        let mut paren_depth = 1usize;

        loop {
            let byte = self
                .cursor
                .read()?
                .ok_or_else(|| self.end_of_input("literal string"))?;

            match byte {
                b'\\' => self.read_escape(&mut result)?,
                b'(' => {
                    paren_depth += 1;
                    result.push(byte);
                }
                b')' => {
                    paren_depth -= 1;
                    if paren_depth == 0 {
                        break;
                    }
                    result.push(byte);
                }
                _ => result.push(byte),
            }
        }

        Ok(Token::String(PdfString(result)))
    }

    fn read_escape(&mut self, result: &mut Vec<u8>) -> ParseResult<()> {
        let byte = self
            .cursor
            .read()?
            .ok_or_else(|| self.end_of_input("literal string"))?;

        match byte {
            b'n' => result.push(b'\n'),
            b'r' => result.push(b'\r'),
            b't' => result.push(b'\t'),
            b'b' => result.push(b'\x08'),
            b'f' => result.push(b'\x0C'),
            b'0'..=b'7' => {
                // Up to three octal digits, high-order overflow ignored
                let mut value = u32::from(byte - b'0');
                for _ in 0..2 {
                    match self.cursor.peek()? {
                        Some(digit @ b'0'..=b'7') => {
                            self.cursor.read()?;
                            value = value * 8 + u32::from(digit - b'0');
                        }
                        _ => break,
                    }
                }
                result.push(value as u8);
            }
            // Line continuation
            b'\r' => {
                if self.cursor.peek()? == Some(b'\n') {
                    self.cursor.read()?;
                }
            }
            b'\n' => {}
            // Covers \( \) \\ and unknown escapes
            _ => result.push(byte),
        }
        Ok(())
    }

    fn read_hex_string(&mut self) -> ParseResult<Token> {
        let mut result = Vec::new();
        let mut high = None;

        loop {
            let byte = self
                .cursor
                .read()?
                .ok_or_else(|| self.end_of_input("hex string"))?;

            if byte == b'>' {
                break;
            }
            if is_whitespace(byte) {
                continue;
            }
            let Some(digit) = char::from(byte).to_digit(16) else {
                return Err(ParseError::SyntaxError {
                    position: self.cursor.position().saturating_sub(1),
                    message: format!("Invalid character in hex string: {:?}", char::from(byte)),
                });
            };

            match high.take() {
                Some(h) => result.push(((h << 4) | digit) as u8),
                None => high = Some(digit),
            }
        }

        // Odd number of digits: missing final digit is 0
        if let Some(h) = high {
            result.push((h << 4) as u8);
        }

        Ok(Token::String(PdfString(result)))
    }

    fn read_name(&mut self) -> ParseResult<Token> {
        let mut name = String::new();

        while let Some(byte) = self.cursor.peek()? {
            if is_whitespace(byte) || is_delimiter(byte) {
                break;
            }
            self.cursor.read()?;
            if byte == b'#' {
                self.read_name_escape(&mut name)?;
            } else {
                name.push(char::from(byte));
            }
        }

        Ok(Token::Name(PdfName(name)))
    }

    /// `#xx` inside a name. A `#` not followed by two hex digits is literal.
    fn read_name_escape(&mut self, name: &mut String) -> ParseResult<()> {
        let Some(first) = self.cursor.peek()?.filter(u8::is_ascii_hexdigit) else {
            name.push('#');
            return Ok(());
        };
        self.cursor.read()?;

        let Some(second) = self.cursor.peek()?.filter(u8::is_ascii_hexdigit) else {
            name.push('#');
            name.push(char::from(first));
            return Ok(());
        };
        self.cursor.read()?;

        let high = char::from(first).to_digit(16).unwrap_or(0);
        let low = char::from(second).to_digit(16).unwrap_or(0);
        name.push(char::from(((high << 4) | low) as u8));
        Ok(())
    }

    fn parse_array(&mut self, ctx: &mut StackSafeContext) -> ParseResult<PdfArray> {
        ctx.nested(|ctx| {
            let mut array = PdfArray::new();

            loop {
                // A token held back by a nested dictionary comes first
                if self.pending.is_none() {
                    self.skip_whitespace()?;
                    match self.cursor.peek()? {
                        None => return Err(self.end_of_input("array")),
                        Some(b']') => {
                            self.cursor.read()?;
                            return Ok(array);
                        }
                        Some(_) => {}
                    }
                }

                let before = self.cursor.position();
                match self.read_token(ctx)? {
                    Some(Token::Reference(None)) => push_reference(&mut array),
                    Some(token) => array.push(token),
                    None => self.skip_unreadable(before, "array")?,
                }
            }
        })
    }

    fn parse_dictionary(&mut self, ctx: &mut StackSafeContext) -> ParseResult<PdfDictionary> {
        ctx.nested(|ctx| {
            let mut dict = PdfDictionary::new();

            loop {
                if self.pending.is_none() {
                    self.skip_whitespace()?;
                    match self.cursor.peek()? {
                        None => return Err(self.end_of_input("dictionary")),
                        Some(b'>') => {
                            self.read_dictionary_end()?;
                            return Ok(dict);
                        }
                        Some(_) => {}
                    }
                }

                let before = self.cursor.position();
                let key = match self.read_token(ctx)? {
                    Some(Token::Name(key)) => key,
                    Some(other) => {
                        if !self.options.lenient_syntax {
                            return Err(ParseError::UnexpectedToken {
                                expected: "name".to_string(),
                                found: other.describe(),
                            });
                        }
                        warn!(found = %other.describe(), "skipping non-name dictionary key");
                        continue;
                    }
                    None => {
                        self.skip_unreadable(before, "dictionary")?;
                        continue;
                    }
                };

                match self.read_dictionary_value(ctx)? {
                    Some(value) => {
                        dict.0.insert(key, value);
                    }
                    None if self.options.lenient_syntax => {
                        warn!(key = %key.as_str(), "dictionary key without value");
                    }
                    None => {
                        return Err(ParseError::UnexpectedToken {
                            expected: format!("value for /{}", key.as_str()),
                            found: ">>".to_string(),
                        });
                    }
                }
            }
        })
    }

    fn read_dictionary_end(&mut self) -> ParseResult<()> {
        self.cursor.read()?;
        match self.cursor.read()? {
            Some(b'>') => Ok(()),
            Some(byte) => Err(ParseError::SyntaxError {
                position: self.cursor.position().saturating_sub(1),
                message: format!("Expected '>>', found '>{}'", char::from(byte)),
            }),
            None => Err(self.end_of_input("dictionary")),
        }
    }

    /// Value of a dictionary entry; `None` when the dictionary closes first
    fn read_dictionary_value(&mut self, ctx: &mut StackSafeContext) -> ParseResult<Option<Token>> {
        loop {
            if self.pending.is_none() {
                self.skip_whitespace()?;
                match self.cursor.peek()? {
                    None => return Err(self.end_of_input("dictionary")),
                    Some(b'>') => return Ok(None),
                    Some(_) => {}
                }
            }

            let before = self.cursor.position();
            match self.read_token(ctx)? {
                Some(value) => return self.complete_reference(value).map(Some),
                None => self.skip_unreadable(before, "dictionary")?,
            }
        }
    }

    /// Turn `num gen R` into a reference when `value` is its first number
    fn complete_reference(&mut self, value: Token) -> ParseResult<Token> {
        let Some(number) = value.as_integer() else {
            return Ok(value);
        };

        self.skip_whitespace()?;
        if !matches!(self.cursor.peek()?, Some(b'0'..=b'9')) {
            return Ok(value);
        }

        let generation = self.read_number()?;
        self.skip_whitespace()?;
        let keyword = self.read_word()?;

        match object_id(number, generation.as_integer()) {
            Some(id) if keyword == "R" => Ok(Token::Reference(Some(id))),
            _ if self.options.lenient_syntax => {
                warn!(
                    number,
                    found = %keyword,
                    "incomplete indirect reference, keeping first number"
                );
                Ok(value)
            }
            _ => Err(ParseError::UnexpectedToken {
                expected: "R".to_string(),
                found: keyword,
            }),
        }
    }

    /// After `<< ... >>`: an embedded stream, or a plain dictionary
    fn finish_dictionary(&mut self, dict: PdfDictionary) -> ParseResult<Token> {
        self.skip_whitespace()?;
        if self.cursor.peek()? != Some(b's') {
            return Ok(Token::Dictionary(dict));
        }

        let word = self.read_word()?;
        if word == "stream" {
            let data = read_stream_data(&mut self.cursor, &dict, self.resolver)?;
            return Ok(Token::Stream(PdfStream { dict, data }));
        }

        // An operator such as `sh` or `scn`; hand it out next
        self.pending = Some(Token::Operator(Operator::new(word)));
        Ok(Token::Dictionary(dict))
    }

    /// `BI` parameters up to `ID`, with the image data moved onto `BI`
    fn read_inline_image(&mut self, ctx: &mut StackSafeContext) -> ParseResult<Token> {
        let (parameters, data) = ctx.nested(|ctx| {
            let mut parameters = PdfDictionary::new();

            loop {
                match self.read_token(ctx)? {
                    Some(Token::Name(key)) => {
                        let value = self
                            .read_token(ctx)?
                            .ok_or_else(|| self.end_of_input("inline image parameters"))?;
                        parameters.0.insert(key, value);
                    }
                    Some(Token::Operator(Operator {
                        image_data: Some(data),
                        ..
                    })) => return Ok((parameters, data)),
                    Some(other) => {
                        return Err(ParseError::UnexpectedToken {
                            expected: "ID".to_string(),
                            found: other.describe(),
                        })
                    }
                    None => return Err(self.end_of_input("inline image")),
                }
            }
        })?;

        debug!(
            parameters = parameters.len(),
            bytes = data.len(),
            "inline image"
        );

        Ok(Token::Operator(Operator {
            name: "BI".to_string(),
            image_parameters: Some(parameters),
            image_data: Some(data),
        }))
    }
}

#[inline(never)]
fn trace_token(position: usize, token: &Token) {
    trace!(position, token = %token.describe(), "token");
}

/// Push a bare `R`, folding it into the two integers before it if present
fn push_reference(array: &mut PdfArray) {
    if let [.., number, generation] = array.0.as_slice() {
        if let Some(id) = number
            .as_integer()
            .and_then(|n| object_id(n, generation.as_integer()))
        {
            let len = array.len();
            array.0.truncate(len - 2);
            array.push(Token::Reference(Some(id)));
            return;
        }
    }
    array.push(Token::Reference(None));
}

impl<C: ByteCursor> Iterator for ContentTokenizer<'_, C> {
    type Item = ParseResult<Token>;

    /// Tokens until the end of input; iteration stops after the first error
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_token() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(error) => {
                self.finished = true;
                Some(Err(error))
            }
        }
    }
}

/// Content stream parser
///
/// Tokenizes a whole content stream into a token list. In best-effort mode
/// a truncated composite value becomes `Null` and a malformed number is
/// dropped; every other error ends the pass with an error.
pub struct ContentParser;

impl ContentParser {
    /// Parse a content stream with default options
    pub fn parse(content: &[u8]) -> ParseResult<Vec<Token>> {
        Self::parse_with_options(content, ParseOptions::default())
    }

    /// Parse a content stream with custom options
    pub fn parse_with_options(content: &[u8], options: ParseOptions) -> ParseResult<Vec<Token>> {
        Self::parse_cursor(SliceCursor::new(content), options, None)
    }

    /// Parse a content stream and return the errors recovered from.
    ///
    /// The warning list is only filled when `options.collect_warnings` is set.
    pub fn parse_with_warnings(
        content: &[u8],
        options: ParseOptions,
    ) -> ParseResult<(Vec<Token>, Vec<ParseError>)> {
        Self::run(ContentTokenizer::from_cursor(SliceCursor::new(content), options))
    }

    /// Parse from any cursor, resolving indirect stream lengths through
    /// `resolver`. The cursor is closed before returning.
    pub fn parse_cursor<C: ByteCursor>(
        cursor: C,
        options: ParseOptions,
        resolver: Option<&dyn ObjectResolver>,
    ) -> ParseResult<Vec<Token>> {
        let tokenizer = ContentTokenizer::from_cursor(cursor, options);
        let (tokens, _) = match resolver {
            Some(resolver) => Self::run(tokenizer.with_resolver(resolver))?,
            None => Self::run(tokenizer)?,
        };
        Ok(tokens)
    }

    /// Parse a decoded content stream stored in a file
    pub fn parse_file<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Vec<Token>> {
        let path = path.as_ref();
        let file = File::open(path)?;

        let cursor = match options.max_input_bytes {
            Some(limit) => {
                let size = file.metadata()?.len();
                if size > limit as u64 {
                    return Err(PdfError::ContentStreamTooLarge(
                        usize::try_from(size).unwrap_or(usize::MAX),
                    ));
                }
                ReadCursor::with_limit(file, limit)
            }
            None => ReadCursor::new(file),
        };

        debug!(path = %path.display(), "parsing content stream file");
        Ok(Self::parse_cursor(cursor, options, None)?)
    }

    fn run<C: ByteCursor>(
        mut tokenizer: ContentTokenizer<'_, C>,
    ) -> ParseResult<(Vec<Token>, Vec<ParseError>)> {
        let result = Self::drain(&mut tokenizer);
        let closed = tokenizer.close();
        let output = result?;
        closed?;
        Ok(output)
    }

    fn drain<C: ByteCursor>(
        tokenizer: &mut ContentTokenizer<'_, C>,
    ) -> ParseResult<(Vec<Token>, Vec<ParseError>)> {
        let lenient = tokenizer.options().lenient_syntax;
        let keep_warnings = tokenizer.options().collect_warnings;
        let mut tokens = Vec::new();
        let mut warnings = Vec::new();

        loop {
            let start = tokenizer.offset();
            match tokenizer.next_token() {
                Ok(Some(token)) => tokens.push(token),
                Ok(None) => {
                    if !tokenizer.is_at_end()? {
                        let position = tokenizer.offset();
                        warn!(position, "content stream ends early at unreadable input");
                        if keep_warnings {
                            warnings.push(ParseError::SyntaxError {
                                position,
                                message: "unreadable operator, remaining input skipped"
                                    .to_string(),
                            });
                        }
                    }
                    break;
                }
                Err(error) if lenient && error.is_recoverable() => {
                    let advanced = tokenizer.offset() > start;
                    warn!(position = tokenizer.offset(), %error, "recovering from malformed content");

                    if matches!(error, ParseError::UnexpectedEndOfInput { .. }) {
                        tokens.push(Token::Null);
                    }
                    if keep_warnings {
                        warnings.push(error);
                    }
                    if !advanced {
                        break;
                    }
                }
                Err(error) => return Err(error),
            }
        }

        debug!(tokens = tokens.len(), warnings = warnings.len(), "content stream parsed");
        Ok((tokens, warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn tokens(input: &[u8]) -> Vec<Token> {
        ContentTokenizer::new(input)
            .collect::<ParseResult<Vec<_>>>()
            .unwrap()
    }

    fn strict(input: &[u8]) -> ContentTokenizer<'static, SliceCursor<'_>> {
        ContentTokenizer::from_cursor(SliceCursor::new(input), ParseOptions::strict())
    }

    fn number(literal: &str) -> Token {
        Token::Number(PdfNumber::from_literal(literal).unwrap())
    }

    #[test]
    fn test_tokenize_numbers() {
        let input = b"123 -45 3.14 -0.5 .5 +7 5.";
        let mut tokenizer = ContentTokenizer::new(input);

        assert_eq!(tokenizer.next_token().unwrap(), Some(Token::integer(123)));
        assert_eq!(tokenizer.next_token().unwrap(), Some(Token::integer(-45)));
        assert_eq!(tokenizer.next_token().unwrap(), Some(number("3.14")));
        assert_eq!(tokenizer.next_token().unwrap(), Some(number("-0.5")));
        assert_eq!(tokenizer.next_token().unwrap(), Some(number("0.5")));
        assert_eq!(tokenizer.next_token().unwrap(), Some(Token::integer(7)));
        assert_eq!(tokenizer.next_token().unwrap(), Some(number("5.0")));
        assert_eq!(tokenizer.next_token().unwrap(), None);
    }

    #[test]
    fn test_number_with_second_dot_splits() {
        assert_eq!(tokens(b"12.5.3"), vec![number("12.5"), number(".3")]);
    }

    #[test]
    fn test_lone_sign_is_malformed() {
        let mut tokenizer = ContentTokenizer::new(b"- 5");
        assert!(matches!(
            tokenizer.next_token(),
            Err(ParseError::MalformedNumber { .. })
        ));
        assert_eq!(tokenizer.next_token().unwrap(), Some(Token::integer(5)));
    }

    #[test]
    fn test_tokenize_strings() {
        let input = b"(Hello World) (Hello\\nWorld) (Nested (paren)) (\\101\\7) (a\\\nb) (\\q)";
        let strings: Vec<Vec<u8>> = tokens(input)
            .into_iter()
            .map(|t| t.as_string().unwrap().as_bytes().to_vec())
            .collect();

        assert_eq!(
            strings,
            vec![
                b"Hello World".to_vec(),
                b"Hello\nWorld".to_vec(),
                b"Nested (paren)".to_vec(),
                vec![b'A', 7],
                b"ab".to_vec(),
                b"q".to_vec(),
            ]
        );
    }

    #[test]
    fn test_unterminated_literal_string() {
        let mut tokenizer = ContentTokenizer::new(b"(abc");
        assert!(matches!(
            tokenizer.next_token(),
            Err(ParseError::UnexpectedEndOfInput {
                context: "literal string",
                ..
            })
        ));
    }

    #[test]
    fn test_tokenize_hex_strings() {
        let input = b"<48656C6C6F> <48 65 6c 6C 6F> <414>";
        assert_eq!(
            tokens(input),
            vec![
                Token::String(PdfString(b"Hello".to_vec())),
                Token::String(PdfString(b"Hello".to_vec())),
                Token::String(PdfString(vec![0x41, 0x40])),
            ]
        );
    }

    #[test]
    fn test_invalid_hex_string() {
        let mut tokenizer = ContentTokenizer::new(b"<4G>");
        assert!(matches!(
            tokenizer.next_token(),
            Err(ParseError::SyntaxError { position: 2, .. })
        ));
    }

    #[test]
    fn test_tokenize_names() {
        let input = b"/Name /Name#20with#20spaces /A#42C /#zz /a#4 /";
        assert_eq!(
            tokens(input),
            vec![
                Token::name("Name"),
                Token::name("Name with spaces"),
                Token::name("ABC"),
                Token::name("#zz"),
                Token::name("a#4"),
                Token::name(""),
            ]
        );
    }

    #[test]
    fn test_name_bytes_map_to_latin1() {
        assert_eq!(tokens(b"/caf#E9"), vec![Token::name("caf\u{e9}")]);
    }

    #[test]
    fn test_tokenize_operators() {
        let input = b"BT Tj ET q Q f* d0 d1 T* ' \"";
        let names: Vec<String> = tokens(input)
            .into_iter()
            .map(|t| t.as_operator().unwrap().name.clone())
            .collect();

        assert_eq!(
            names,
            vec!["BT", "Tj", "ET", "q", "Q", "f*", "d0", "d1", "T*", "'", "\""]
        );
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            tokens(b"null true false R re fill n"),
            vec![
                Token::Null,
                Token::Boolean(true),
                Token::Boolean(false),
                Token::Reference(None),
                Token::operator("re"),
                Token::operator("fill"),
                Token::operator("n"),
            ]
        );
    }

    #[test]
    fn test_operator_stops_at_digit() {
        assert_eq!(
            tokens(b"Tf12"),
            vec![Token::operator("Tf"), Token::integer(12)]
        );
    }

    #[test]
    fn test_comments_skipped() {
        assert_eq!(
            tokens(b"% header\n1 % trailing\r2"),
            vec![Token::integer(1), Token::integer(2)]
        );
    }

    #[test]
    fn test_array() {
        assert_eq!(
            tokens(b"[1 2.5 /Foo [(x)]]"),
            vec![Token::Array(PdfArray(vec![
                Token::integer(1),
                number("2.5"),
                Token::name("Foo"),
                Token::Array(PdfArray(vec![Token::String(PdfString(b"x".to_vec()))])),
            ]))]
        );
    }

    #[test]
    fn test_array_reference_collapse() {
        assert_eq!(
            tokens(b"[1 0 R 5 R]"),
            vec![Token::Array(PdfArray(vec![
                Token::Reference(Some(ObjectId::new(1, 0))),
                Token::integer(5),
                Token::Reference(None),
            ]))]
        );
    }

    #[test]
    fn test_dictionary() {
        let parsed = tokens(b"<< /Type /XObject /W 10 /Sub << /A [1] >> /Ref 12 0 R >>");
        assert_eq!(parsed.len(), 1);

        let dict = parsed[0].as_dict().unwrap();
        assert_eq!(dict.len(), 4);
        assert_eq!(dict.get("Type"), Some(&Token::name("XObject")));
        assert_eq!(dict.get("W"), Some(&Token::integer(10)));
        assert_eq!(
            dict.get("Ref"),
            Some(&Token::Reference(Some(ObjectId::new(12, 0))))
        );
        let sub = dict.get("Sub").unwrap().as_dict().unwrap();
        assert_eq!(
            sub.get("A"),
            Some(&Token::Array(PdfArray(vec![Token::integer(1)])))
        );
    }

    #[test]
    fn test_dictionary_followed_by_operator_starting_with_s() {
        assert_eq!(
            tokens(b"/P << /MCID 0 >> sh BDC"),
            vec![
                Token::name("P"),
                Token::Dictionary({
                    let mut d = PdfDictionary::new();
                    d.insert("MCID", Token::integer(0));
                    d
                }),
                Token::operator("sh"),
                Token::operator("BDC"),
            ]
        );
    }

    #[test]
    fn test_held_operator_stays_inside_composite() {
        let inner = Token::Dictionary({
            let mut d = PdfDictionary::new();
            d.insert("A", Token::integer(1));
            d
        });
        assert_eq!(
            tokens(b"[<< /A 1 >> s] Q"),
            vec![
                Token::Array(PdfArray(vec![inner.clone(), Token::operator("s")])),
                Token::operator("Q"),
            ]
        );

        // Inside a dictionary the held word sits in key position
        let parsed = tokens(b"<< /K << /A 1 >> sh >> Q");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].as_dict().unwrap().get("K"), Some(&inner));
        assert_eq!(parsed[1], Token::operator("Q"));

        assert!(matches!(
            strict(b"<< /K << /A 1 >> sh >>").next_token(),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_dictionary_with_stream() {
        let parsed = tokens(b"<< /Length 3 >>\nstream\nabc\nendstream Q");
        assert_eq!(parsed.len(), 2);

        let stream = parsed[0].as_stream().unwrap();
        assert_eq!(stream.data, b"abc");
        assert_eq!(stream.dict.get("Length"), Some(&Token::integer(3)));
        assert_eq!(parsed[1], Token::operator("Q"));
    }

    #[test]
    fn test_stream_with_resolved_length() {
        let mut resolver = HashMap::new();
        resolver.insert(ObjectId::new(4, 0), 4i64);

        let mut tokenizer =
            ContentTokenizer::new(b"<< /Length 4 0 R >> stream\r\nab\ncendstream")
                .with_resolver(&resolver);
        let token = tokenizer.next_token().unwrap().unwrap();

        assert_eq!(token.as_stream().unwrap().data, b"ab\nc");
        assert_eq!(tokenizer.next_token().unwrap(), None);
    }

    #[test]
    fn test_dictionary_missing_value() {
        let parsed = tokens(b"<< /A 1 /B >>");
        let dict = parsed[0].as_dict().unwrap();
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.get("A"), Some(&Token::integer(1)));

        assert!(matches!(
            strict(b"<< /A 1 /B >>").next_token(),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_dictionary_non_name_key() {
        let parsed = tokens(b"<< 5 /A 1 >>");
        assert_eq!(parsed[0].as_dict().unwrap().get("A"), Some(&Token::integer(1)));

        assert!(matches!(
            strict(b"<< 5 /A 1 >>").next_token(),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_truncated_composites() {
        for input in [&b"<< /A"[..], b"<< /A 1", b"[1 2", b"[", b"<<"] {
            let mut tokenizer = ContentTokenizer::new(input);
            assert!(
                matches!(
                    tokenizer.next_token(),
                    Err(ParseError::UnexpectedEndOfInput { .. })
                ),
                "input {:?}",
                String::from_utf8_lossy(input)
            );
        }
    }

    #[test]
    fn test_inline_image() {
        let input = b"q BI /W 2 /H 1 /CS /G ID \xFF\x00 EI Q";
        let parsed = tokens(input);
        assert_eq!(parsed.len(), 4);

        let bi = parsed[1].as_operator().unwrap();
        assert_eq!(bi.name, "BI");
        assert_eq!(bi.image_data.as_deref(), Some(&[0xFF, 0x00][..]));
        let params = bi.image_parameters.as_ref().unwrap();
        assert_eq!(params.get("W"), Some(&Token::integer(2)));
        assert_eq!(params.get("H"), Some(&Token::integer(1)));
        assert_eq!(params.get("CS"), Some(&Token::name("G")));

        assert!(parsed[2].is_operator("EI"));
        assert!(parsed[3].is_operator("Q"));
    }

    #[test]
    fn test_bi_without_id() {
        let mut tokenizer = ContentTokenizer::new(b"BI /W 2 Q");
        match tokenizer.next_token() {
            Err(ParseError::UnexpectedToken { expected, found }) => {
                assert_eq!(expected, "ID");
                assert_eq!(found, "operator Q");
            }
            other => panic!("Expected UnexpectedToken, got {other:?}"),
        }

        let mut tokenizer = ContentTokenizer::new(b"BI /W");
        assert!(matches!(
            tokenizer.next_token(),
            Err(ParseError::UnexpectedEndOfInput { .. })
        ));
    }

    #[test]
    fn test_i_without_d_is_an_error() {
        for options in [ParseOptions::default(), ParseOptions::strict()] {
            let mut tokenizer = ContentTokenizer::from_cursor(SliceCursor::new(b"IX"), options);
            match tokenizer.next_token() {
                Err(ParseError::UnexpectedToken { expected, found }) => {
                    assert_eq!(expected, "ID");
                    assert_eq!(found, "IX");
                }
                other => panic!("Expected UnexpectedToken, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_stray_close_bracket() {
        assert_eq!(tokens(b"] 5"), vec![Token::Null, Token::integer(5)]);
        assert!(matches!(
            strict(b"] 5").next_token(),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_unreadable_byte_ends_lenient_pass() {
        let mut tokenizer = ContentTokenizer::new(b"1 ) 2");
        assert_eq!(tokenizer.next_token().unwrap(), Some(Token::integer(1)));
        assert_eq!(tokenizer.next_token().unwrap(), None);
        assert!(!tokenizer.is_at_end().unwrap());

        let mut tokenizer = strict(b") 2");
        assert!(matches!(
            tokenizer.next_token(),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_offset_counts_consumed_bytes() {
        let mut tokenizer = ContentTokenizer::new(b"12 Tz\nQ");
        assert_eq!(tokenizer.offset(), 0);

        tokenizer.next_token().unwrap();
        assert_eq!(tokenizer.offset(), 2);
        tokenizer.next_token().unwrap();
        assert_eq!(tokenizer.offset(), 5);
        tokenizer.next_token().unwrap();
        assert_eq!(tokenizer.offset(), 7);
        assert!(tokenizer.is_at_end().unwrap());
    }

    #[test]
    fn test_recursion_limit() {
        let input = b"[[[[1]]]]";
        let options = ParseOptions::default().with_max_depth(3);
        let mut tokenizer = ContentTokenizer::from_cursor(SliceCursor::new(input), options);
        assert!(matches!(
            tokenizer.next_token(),
            Err(ParseError::RecursionLimitExceeded { depth: 4 })
        ));

        let options = ParseOptions::default().with_max_depth(4);
        let mut tokenizer = ContentTokenizer::from_cursor(SliceCursor::new(input), options);
        assert!(tokenizer.next_token().unwrap().is_some());
    }

    #[test]
    fn test_iterator_stops_after_error() {
        let mut tokenizer = strict(b"1 ] 2");
        assert!(matches!(tokenizer.next(), Some(Ok(_))));
        assert!(matches!(tokenizer.next(), Some(Err(_))));
        assert!(tokenizer.next().is_none());
    }

    #[test]
    fn test_parser_recovers_truncated_dictionary() {
        let parsed = ContentParser::parse(b"1 0 0 1 0 0 cm << /A").unwrap();
        assert_eq!(parsed.len(), 8);
        assert!(parsed[6].is_operator("cm"));
        assert_eq!(parsed[7], Token::Null);
    }

    #[test]
    fn test_parser_skips_malformed_number() {
        let parsed = ContentParser::parse(b"- 5 Tz").unwrap();
        assert_eq!(parsed, vec![Token::integer(5), Token::operator("Tz")]);
    }

    #[test]
    fn test_parser_strict_propagates() {
        let result = ContentParser::parse_with_options(b"1 0 0 1 0 0 cm << /A", ParseOptions::strict());
        assert!(matches!(
            result,
            Err(ParseError::UnexpectedEndOfInput { .. })
        ));
    }

    #[test]
    fn test_parser_collects_warnings() {
        let (parsed, warnings) =
            ContentParser::parse_with_warnings(b"- [1 2", ParseOptions::lenient()).unwrap();
        assert_eq!(parsed, vec![Token::Null]);
        assert_eq!(warnings.len(), 2);
        assert!(matches!(warnings[0], ParseError::MalformedNumber { .. }));
        assert!(matches!(warnings[1], ParseError::UnexpectedEndOfInput { .. }));

        let (_, warnings) =
            ContentParser::parse_with_warnings(b"- [1 2", ParseOptions::default()).unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_parser_warns_on_early_stop() {
        let (parsed, warnings) =
            ContentParser::parse_with_warnings(b"q ) Q", ParseOptions::lenient()).unwrap();
        assert_eq!(parsed, vec![Token::operator("q")]);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], ParseError::SyntaxError { position: 2, .. }));
    }

    #[test]
    fn test_parser_non_recoverable_error() {
        let result = ContentParser::parse(b"q <zz> Q");
        assert!(matches!(result, Err(ParseError::SyntaxError { .. })));
    }
}
