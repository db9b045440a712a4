//! JSON with comments and trailing commas, parsed into a tree of byte spans.
//!
//! `global.json`, `launch.json` and the AWS descriptors are routinely written
//! with `//` comments, which strict JSON parsers reject and serializers drop.
//! This parser keeps every node's span in the source so an upgrader can replace
//! one string literal and leave the rest of the file byte-for-byte intact.

use std::ops::Range;

use super::lines::line_column;
use super::DocumentError;

const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    Object(Vec<(String, JsonNode)>),
    Array(Vec<JsonNode>),
    String(String),
    /// Raw number text.
    Number(String),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonNode {
    /// Byte range in the source, including quotes for strings.
    pub span: Range<usize>,
    pub value: JsonValue,
}

impl JsonNode {
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            JsonValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&[(String, JsonNode)]> {
        match &self.value {
            JsonValue::Object(members) => Some(members),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[JsonNode]> {
        match &self.value {
            JsonValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Member lookup. The last duplicate wins, as in most JSON readers.
    pub fn get(&self, key: &str) -> Option<&JsonNode> {
        self.as_object()?
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Resolve an RFC 6901 JSON pointer such as `/sdk/version`.
    pub fn pointer(&self, pointer: &str) -> Option<&JsonNode> {
        if pointer.is_empty() {
            return Some(self);
        }
        let rest = pointer.strip_prefix('/')?;
        let mut node = self;
        for raw in rest.split('/') {
            let token = raw.replace("~1", "/").replace("~0", "~");
            node = match &node.value {
                JsonValue::Object(_) => node.get(&token)?,
                JsonValue::Array(items) => items.get(token.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(node)
    }

    /// Every string node at or below this one, in document order.
    pub fn strings(&self) -> Vec<&JsonNode> {
        let mut out = Vec::new();
        self.collect_strings(&mut out);
        out
    }

    fn collect_strings<'a>(&'a self, out: &mut Vec<&'a JsonNode>) {
        match &self.value {
            JsonValue::String(_) => out.push(self),
            JsonValue::Object(members) => members.iter().for_each(|(_, v)| v.collect_strings(out)),
            JsonValue::Array(items) => items.iter().for_each(|v| v.collect_strings(out)),
            _ => {}
        }
    }
}

/// Encode `value` as a JSON string literal, quotes included.
pub fn encode_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Parse `source`, accepting `//` and `/* */` comments and trailing commas.
pub fn parse(source: &str) -> Result<JsonNode, DocumentError> {
    let mut parser = Parser {
        source,
        bytes: source.as_bytes(),
        pos: 0,
        depth: 0,
    };
    parser.skip_trivia()?;
    let root = parser.value()?;
    parser.skip_trivia()?;
    if parser.pos < parser.bytes.len() {
        return Err(parser.error("unexpected content after the document"));
    }
    Ok(root)
}

struct Parser<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn error(&self, message: &str) -> DocumentError {
        let (line, column) = line_column(self.source, self.pos);
        DocumentError::Json {
            line,
            column,
            message: message.to_string(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_trivia(&mut self) -> Result<(), DocumentError> {
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\n' | b'\r') => self.pos += 1,
                Some(b'/') => match self.bytes.get(self.pos + 1) {
                    Some(b'/') => {
                        while !matches!(self.peek(), None | Some(b'\n' | b'\r')) {
                            self.pos += 1;
                        }
                    }
                    Some(b'*') => {
                        let body = &self.source[self.pos + 2..];
                        match body.find("*/") {
                            Some(end) => self.pos += end + 4,
                            None => return Err(self.error("unterminated comment")),
                        }
                    }
                    _ => return Err(self.error("unexpected '/'")),
                },
                _ => return Ok(()),
            }
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), DocumentError> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", byte as char)))
        }
    }

    fn value(&mut self) -> Result<JsonNode, DocumentError> {
        match self.peek() {
            Some(b'{') => self.nested(Self::object),
            Some(b'[') => self.nested(Self::array),
            Some(b'"') => {
                let (span, text) = self.string()?;
                Ok(JsonNode {
                    span,
                    value: JsonValue::String(text),
                })
            }
            Some(b't') => self.literal("true", JsonValue::Bool(true)),
            Some(b'f') => self.literal("false", JsonValue::Bool(false)),
            Some(b'n') => self.literal("null", JsonValue::Null),
            Some(b'-' | b'0'..=b'9') => self.number(),
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn nested(
        &mut self,
        parse: fn(&mut Self) -> Result<JsonNode, DocumentError>,
    ) -> Result<JsonNode, DocumentError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error("document nested too deeply"));
        }
        let node = parse(self);
        self.depth -= 1;
        node
    }

    fn object(&mut self) -> Result<JsonNode, DocumentError> {
        let start = self.pos;
        self.expect(b'{')?;
        let mut members = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(b'}') {
                self.pos += 1;
                break;
            }
            if self.peek() != Some(b'"') {
                return Err(self.error("expected a property name"));
            }
            let (_, key) = self.string()?;
            self.skip_trivia()?;
            self.expect(b':')?;
            self.skip_trivia()?;
            let value = self.value()?;
            members.push((key, value));
            self.skip_trivia()?;
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.error("expected ',' or '}'")),
            }
        }
        Ok(JsonNode {
            span: start..self.pos,
            value: JsonValue::Object(members),
        })
    }

    fn array(&mut self) -> Result<JsonNode, DocumentError> {
        let start = self.pos;
        self.expect(b'[')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(b']') {
                self.pos += 1;
                break;
            }
            items.push(self.value()?);
            self.skip_trivia()?;
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.error("expected ',' or ']'")),
            }
        }
        Ok(JsonNode {
            span: start..self.pos,
            value: JsonValue::Array(items),
        })
    }

    fn string(&mut self) -> Result<(Range<usize>, String), DocumentError> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string")),
                Some(b'\\') => self.pos += 2,
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(c) if c < 0x20 => return Err(self.error("control character in string")),
                Some(_) => self.pos += 1,
            }
        }
        if self.pos > self.bytes.len() {
            return Err(self.error("unterminated string"));
        }
        let raw = &self.source[start..self.pos];
        let text: String =
            serde_json::from_str(raw).map_err(|e| self.error(&format!("invalid string: {e}")))?;
        Ok((start..self.pos, text))
    }

    fn literal(&mut self, word: &str, value: JsonValue) -> Result<JsonNode, DocumentError> {
        if self.source[self.pos..].starts_with(word) {
            let start = self.pos;
            self.pos += word.len();
            Ok(JsonNode {
                span: start..self.pos,
                value,
            })
        } else {
            Err(self.error("invalid literal"))
        }
    }

    fn number(&mut self) -> Result<JsonNode, DocumentError> {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E')) {
            self.pos += 1;
        }
        let raw = &self.source[start..self.pos];
        if raw.parse::<f64>().is_err() {
            return Err(self.error("invalid number"));
        }
        Ok(JsonNode {
            span: start..self.pos,
            value: JsonValue::Number(raw.to_string()),
        })
    }
}
