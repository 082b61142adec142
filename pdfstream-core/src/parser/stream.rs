//! Embedded stream data
//!
//! Reads the bytes between the `stream` and `endstream` keywords that follow
//! a dictionary (ISO 32000-1 Section 7.3.8). `/Length` is trusted when it is
//! consistent with where `endstream` actually appears.

use super::cursor::{is_whitespace, ByteCursor};
use super::objects::{ObjectResolver, PdfDictionary, Token};
use super::{ParseError, ParseResult};
use tracing::debug;

const END_STREAM: &[u8] = b"endstream";

/// Declared payload length, if it can be determined without guessing
fn declared_length(dict: &PdfDictionary, resolver: Option<&dyn ObjectResolver>) -> Option<usize> {
    let length = match dict.get("Length")? {
        Token::Number(n) if n.is_integer() => n.as_long(),
        Token::Reference(Some(id)) => resolver?.resolve_integer(*id)?,
        _ => return None,
    };
    usize::try_from(length).ok()
}

fn strip_trailing_eol(data: &mut Vec<u8>) {
    if data.ends_with(b"\r\n") {
        data.truncate(data.len() - 2);
    } else if data.ends_with(b"\n") || data.ends_with(b"\r") {
        data.truncate(data.len() - 1);
    }
}

/// Read stream data. The cursor must be positioned just after the `stream`
/// keyword; on success `endstream` has been consumed.
pub(crate) fn read_stream_data<C: ByteCursor>(
    cursor: &mut C,
    dict: &PdfDictionary,
    resolver: Option<&dyn ObjectResolver>,
) -> ParseResult<Vec<u8>> {
    // EOL after the keyword: CRLF, LF or (non-conforming) CR
    match cursor.peek()? {
        Some(b'\r') => {
            cursor.read()?;
            if cursor.peek()? == Some(b'\n') {
                cursor.read()?;
            }
        }
        Some(b'\n') => {
            cursor.read()?;
        }
        _ => {}
    }

    let length = declared_length(dict, resolver);
    let mut buffer = Vec::new();
    let mut first_marker = None;

    loop {
        let Some(byte) = cursor.read()? else {
            // A /Length past every marker we saw: settle for the first one
            if let Some(end) = first_marker {
                debug!(end, "stream /Length overruns data, using first endstream");
                return Ok(cut_at_marker(cursor, buffer, end));
            }
            return Err(ParseError::UnexpectedEndOfInput {
                position: cursor.position(),
                context: "stream data",
            });
        };
        buffer.push(byte);

        if !buffer.ends_with(END_STREAM) {
            continue;
        }
        let end = buffer.len() - END_STREAM.len();

        match length {
            Some(len) if len <= end && buffer[len..end].iter().all(|&b| is_whitespace(b)) => {
                buffer.truncate(len);
                return Ok(buffer);
            }
            Some(len) if len > end => {
                // Possibly part of the data; keep looking
                first_marker.get_or_insert(end);
            }
            _ => {
                let end = first_marker.unwrap_or(end);
                debug!(
                    declared = ?length,
                    found = end,
                    "stream /Length unusable, using data before endstream"
                );
                return Ok(cut_at_marker(cursor, buffer, end));
            }
        }
    }
}

/// Payload ending at the marker that starts at `end`. Bytes read past that
/// marker go back to the cursor.
fn cut_at_marker<C: ByteCursor>(cursor: &mut C, mut buffer: Vec<u8>, end: usize) -> Vec<u8> {
    cursor.unread_slice(&buffer[end + END_STREAM.len()..]);
    buffer.truncate(end);
    strip_trailing_eol(&mut buffer);
    buffer
}
