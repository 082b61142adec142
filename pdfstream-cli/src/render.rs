//! Token list output formats

use pdfstream::parser::{PdfDictionary, PdfName, Token};
use serde_json::{json, Map, Value};
use std::io::{self, Write};

/// Dictionary entries in key order, for stable output
fn sorted_entries(dict: &PdfDictionary) -> Vec<(&PdfName, &Token)> {
    let mut entries: Vec<_> = dict.0.iter().collect();
    entries.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
    entries
}

fn push_name(out: &mut String, name: &str) {
    out.push('/');
    for c in name.chars() {
        let byte = c as u32;
        if (0x21..=0x7E).contains(&byte) && !"()<>[]{}/%#".contains(c) {
            out.push(c);
        } else {
            out.push_str(&format!("#{byte:02X}"));
        }
    }
}

fn push_string(out: &mut String, bytes: &[u8]) {
    out.push('(');
    for &byte in bytes {
        match byte {
            b'(' | b')' | b'\\' => {
                out.push('\\');
                out.push(char::from(byte));
            }
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7E => out.push(char::from(byte)),
            _ => out.push_str(&format!("\\{byte:03o}")),
        }
    }
    out.push(')');
}

fn push_entries(out: &mut String, dict: &PdfDictionary) {
    for (key, value) in sorted_entries(dict) {
        out.push(' ');
        push_name(out, key.as_str());
        out.push(' ');
        push_token(out, value);
    }
}

/// Append `token` in content stream syntax. Binary data is summarized.
pub fn push_token(out: &mut String, token: &Token) {
    match token {
        Token::Null => out.push_str("null"),
        Token::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        Token::Number(n) => out.push_str(n.render()),
        Token::Name(n) => push_name(out, n.as_str()),
        Token::String(s) => push_string(out, s.as_bytes()),
        Token::Array(array) => {
            out.push('[');
            for (i, item) in array.0.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                push_token(out, item);
            }
            out.push(']');
        }
        Token::Dictionary(dict) => {
            out.push_str("<<");
            push_entries(out, dict);
            out.push_str(" >>");
        }
        Token::Stream(stream) => {
            out.push_str("<<");
            push_entries(out, &stream.dict);
            out.push_str(&format!(" >> stream [{} bytes] endstream", stream.data.len()));
        }
        Token::Reference(None) => out.push('R'),
        Token::Reference(Some(id)) => out.push_str(&id.to_string()),
        Token::Operator(op) => {
            out.push_str(&op.name);
            if let Some(parameters) = &op.image_parameters {
                push_entries(out, parameters);
            }
            if let Some(data) = &op.image_data {
                out.push_str(&format!(" [{} bytes]", data.len()));
            }
        }
    }
}

/// Write tokens as content stream text, one operator per line
pub fn write_text<W: Write>(out: &mut W, tokens: &[Token]) -> io::Result<()> {
    let mut line = String::new();

    for token in tokens {
        if !line.is_empty() {
            line.push(' ');
        }
        push_token(&mut line, token);

        if matches!(token, Token::Operator(_)) {
            writeln!(out, "{line}")?;
            line.clear();
        }
    }

    // Trailing operands without an operator
    if !line.is_empty() {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn entries_json(dict: &PdfDictionary) -> Value {
    let map: Map<String, Value> = dict
        .0
        .iter()
        .map(|(key, value)| (key.as_str().to_string(), token_json(value)))
        .collect();
    Value::Object(map)
}

/// JSON form of a token. Numbers keep their exact decimal rendering.
pub fn token_json(token: &Token) -> Value {
    match token {
        Token::Null => json!({ "type": "null" }),
        Token::Boolean(b) => json!({ "type": "boolean", "value": b }),
        Token::Number(n) => json!({ "type": "number", "value": n.render() }),
        Token::Name(n) => json!({ "type": "name", "value": n.as_str() }),
        Token::String(s) => json!({ "type": "string", "value": latin1(s.as_bytes()) }),
        Token::Array(array) => json!({
            "type": "array",
            "items": array.0.iter().map(token_json).collect::<Vec<_>>(),
        }),
        Token::Dictionary(dict) => json!({ "type": "dictionary", "entries": entries_json(dict) }),
        Token::Stream(stream) => json!({
            "type": "stream",
            "entries": entries_json(&stream.dict),
            "length": stream.data.len(),
        }),
        Token::Reference(id) => json!({
            "type": "reference",
            "object": id.map(|id| id.number),
            "generation": id.map(|id| id.generation),
        }),
        Token::Operator(op) => {
            let mut value = json!({ "type": "operator", "name": op.name });
            if let Some(parameters) = &op.image_parameters {
                value["parameters"] = entries_json(parameters);
            }
            if let Some(data) = &op.image_data {
                value["data_length"] = json!(data.len());
            }
            value
        }
    }
}

/// Write tokens as a pretty-printed JSON array
pub fn write_json<W: Write>(out: &mut W, tokens: &[Token]) -> io::Result<()> {
    let value = Value::Array(tokens.iter().map(token_json).collect());
    serde_json::to_writer_pretty(&mut *out, &value)?;
    writeln!(out)
}
