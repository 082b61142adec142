//! Inline image data (ISO 32000-1 Section 8.9.7)
//!
//! Filtered inline images carry no usable length, so the end of the data is
//! found heuristically: whitespace, `E`, `I`, then whitespace or end of input.
//! Binary data that happens to contain that sequence ends the image early.

use super::cursor::{is_whitespace, ByteCursor};
use super::{ParseError, ParseResult};
use tracing::debug;

fn end_of_data(position: usize) -> ParseError {
    ParseError::UnexpectedEndOfInput {
        position,
        context: "inline image data",
    }
}

/// Read the raw bytes following an `ID` marker.
///
/// The cursor must be positioned just after `ID`. On return the `EI`
/// terminator has been pushed back, so the next token read is the `EI`
/// operator. The whitespace byte before `EI` is part of the delimiter and is
/// not included in the returned data.
pub(crate) fn read_inline_image_data<C: ByteCursor>(cursor: &mut C) -> ParseResult<Vec<u8>> {
    // A single separating whitespace byte is conventional but optional
    if let Some(byte) = cursor.peek()? {
        if is_whitespace(byte) {
            cursor.read()?;
        }
    }

    let mut data = Vec::new();
    // NUL counts as whitespace, so `EI` directly after `ID` terminates
    let mut two_back = 0u8;
    let mut last = cursor.read()?.ok_or_else(|| end_of_data(cursor.position()))?;
    let mut current = cursor.read()?.ok_or_else(|| end_of_data(cursor.position()))?;

    loop {
        if is_whitespace(two_back) && last == b'E' && current == b'I' {
            match cursor.peek()? {
                None => break,
                Some(next) if is_whitespace(next) => break,
                Some(_) => {}
            }
        }

        data.push(last);
        two_back = last;
        last = current;
        current = cursor.read()?.ok_or_else(|| end_of_data(cursor.position()))?;
    }

    // Every byte written so far ends with the delimiter whitespace
    data.pop();

    cursor.unread(b'I');
    cursor.unread(b'E');

    debug!(bytes = data.len(), "read inline image data");
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::cursor::SliceCursor;

    fn remaining(cursor: &mut SliceCursor<'_>) -> Vec<u8> {
        let mut rest = Vec::new();
        while let Some(byte) = cursor.read().unwrap() {
            rest.push(byte);
        }
        rest
    }

    #[test]
    fn test_data_with_separator() {
        let mut cursor = SliceCursor::new(b" \xFF\x00 EI Q");
        let data = read_inline_image_data(&mut cursor).unwrap();

        assert_eq!(data, vec![0xFF, 0x00]);
        assert_eq!(remaining(&mut cursor), b"EI Q");
    }

    #[test]
    fn test_data_without_separator() {
        let mut cursor = SliceCursor::new(b"\xFF\x00 EI\n");
        let data = read_inline_image_data(&mut cursor).unwrap();

        assert_eq!(data, vec![0xFF, 0x00]);
        assert_eq!(remaining(&mut cursor), b"EI\n");
    }

    #[test]
    fn test_terminator_at_end_of_input() {
        let mut cursor = SliceCursor::new(b" abc EI");
        let data = read_inline_image_data(&mut cursor).unwrap();

        assert_eq!(data, b"abc");
        assert_eq!(remaining(&mut cursor), b"EI");
    }

    #[test]
    fn test_embedded_ei_without_whitespace_is_data() {
        let mut cursor = SliceCursor::new(b" xEIy EI ");
        let data = read_inline_image_data(&mut cursor).unwrap();
        assert_eq!(data, b"xEIy");
    }

    #[test]
    fn test_ei_followed_by_data_byte_is_data() {
        let mut cursor = SliceCursor::new(b" a EIx EI ");
        let data = read_inline_image_data(&mut cursor).unwrap();
        assert_eq!(data, b"a EIx");
    }

    #[test]
    fn test_empty_data() {
        let mut cursor = SliceCursor::new(b" EI ");
        let data = read_inline_image_data(&mut cursor).unwrap();

        assert!(data.is_empty());
        assert_eq!(remaining(&mut cursor), b"EI ");
    }

    #[test]
    fn test_missing_terminator() {
        let mut cursor = SliceCursor::new(b" abc");
        match read_inline_image_data(&mut cursor) {
            Err(ParseError::UnexpectedEndOfInput { context, .. }) => {
                assert_eq!(context, "inline image data")
            }
            other => panic!("Expected UnexpectedEndOfInput, got {other:?}"),
        }

        let mut cursor = SliceCursor::new(b"");
        assert!(matches!(
            read_inline_image_data(&mut cursor),
            Err(ParseError::UnexpectedEndOfInput { .. })
        ));
    }
}
