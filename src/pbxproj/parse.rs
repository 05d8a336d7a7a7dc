use super::{graph::Graph, Dict, Object, ObjectId, Value};
use indexmap::IndexMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Unexpected end of input on line {line}, expected {expected}")]
    UnexpectedEof { expected: &'static str, line: usize },
    #[error("Unexpected character {found:?} on line {line}, expected {expected}")]
    UnexpectedChar {
        expected: &'static str,
        found: char,
        line: usize,
    },
    #[error("Unterminated block comment starting on line {line}")]
    UnterminatedComment { line: usize },
    #[error("Unterminated string starting on line {line}")]
    UnterminatedString { line: usize },
    #[error("Content continues past the root dict on line {line}")]
    TrailingContent { line: usize },
    #[error("Descriptor has no `objects` table")]
    ObjectsMissing,
    #[error("Descriptor's `objects` entry isn't a dict")]
    ObjectsNotDict,
    #[error("Object {id} isn't a dict")]
    ObjectNotDict { id: String },
    #[error("Object {id} has no `isa` entry")]
    ObjectKindMissing { id: String },
    #[error("Descriptor has no `rootObject` entry")]
    RootObjectMissing,
    #[error("Descriptor's `rootObject` entry isn't a plain ID")]
    RootObjectInvalid,
    #[error("`rootObject` {id} isn't present in the object table")]
    RootObjectDangling { id: String },
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'_' | b'$' | b'.' | b'/' | b':' | b'-' | b'+' | b'~' | b'@'
        )
}

struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            line: 1,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn current_char(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(b) = self.peek() {
            self.pos += 1;
            if b == b'\n' {
                self.line += 1;
            }
        }
    }

    fn bump_char(&mut self, c: char) {
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        match self.current_char() {
            Some(found) => ParseError::UnexpectedChar {
                expected,
                found,
                line: self.line,
            },
            None => ParseError::UnexpectedEof {
                expected,
                line: self.line,
            },
        }
    }

    fn expect(&mut self, byte: u8, expected: &'static str) -> Result<(), ParseError> {
        match self.peek() {
            Some(b) if b == byte => {
                self.bump();
                Ok(())
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    /// Skips whitespace and both comment forms. Annotation comments are
    /// derived data, so they're dropped here and regenerated on write.
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => self.bump(),
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while let Some(b) = self.peek() {
                        if b == b'\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    let start_line = self.line;
                    self.bump();
                    self.bump();
                    loop {
                        match self.peek() {
                            None => {
                                return Err(ParseError::UnterminatedComment { line: start_line })
                            }
                            Some(b'*') if self.peek_at(1) == Some(b'/') => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            Some(_) => self.bump(),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn parse_quoted(&mut self) -> Result<String, ParseError> {
        let start_line = self.line;
        self.bump();
        let mut s = String::new();
        loop {
            match self.peek() {
                None => return Err(ParseError::UnterminatedString { line: start_line }),
                Some(b'"') => {
                    self.bump();
                    return Ok(s);
                }
                Some(b'\\') => {
                    self.bump();
                    match self.peek() {
                        None => return Err(ParseError::UnterminatedString { line: start_line }),
                        Some(b'n') => {
                            s.push('\n');
                            self.bump();
                        }
                        Some(b't') => {
                            s.push('\t');
                            self.bump();
                        }
                        Some(b'r') => {
                            s.push('\r');
                            self.bump();
                        }
                        Some(_) => {
                            if let Some(c) = self.current_char() {
                                s.push(c);
                                self.bump_char(c);
                            }
                        }
                    }
                }
                Some(_) => {
                    if let Some(c) = self.current_char() {
                        s.push(c);
                        self.bump_char(c);
                    }
                }
            }
        }
    }

    fn parse_unquoted(&mut self) -> String {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if !is_token_byte(b) {
                break;
            }
            // A slash is a legal token byte, but never when it opens a comment.
            if b == b'/' && matches!(self.peek_at(1), Some(b'/') | Some(b'*')) {
                break;
            }
            self.bump();
        }
        self.text[start..self.pos].to_owned()
    }

    fn parse_key(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Some(b'"') => self.parse_quoted(),
            Some(b) if is_token_byte(b) => Ok(self.parse_unquoted()),
            _ => Err(self.unexpected("a key")),
        }
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        match self.peek() {
            Some(b'{') => self.parse_dict().map(Value::Dict),
            Some(b'(') => self.parse_array().map(Value::Array),
            Some(b'"') => self.parse_quoted().map(Value::String),
            Some(b) if is_token_byte(b) => Ok(Value::String(self.parse_unquoted())),
            _ => Err(self.unexpected("a value")),
        }
    }

    fn parse_dict(&mut self) -> Result<Dict, ParseError> {
        self.expect(b'{', "`{`")?;
        let mut dict = Dict::new();
        loop {
            self.skip_trivia()?;
            match self.peek() {
                None => return Err(self.unexpected("a key or `}`")),
                Some(b'}') => {
                    self.bump();
                    return Ok(dict);
                }
                _ => {}
            }
            let key = self.parse_key()?;
            self.skip_trivia()?;
            self.expect(b'=', "`=`")?;
            self.skip_trivia()?;
            let value = self.parse_value()?;
            self.skip_trivia()?;
            self.expect(b';', "`;`")?;
            dict.insert(key, value);
        }
    }

    fn parse_array(&mut self) -> Result<Vec<Value>, ParseError> {
        self.expect(b'(', "`(`")?;
        let mut values = Vec::new();
        loop {
            self.skip_trivia()?;
            match self.peek() {
                None => return Err(self.unexpected("a value or `)`")),
                Some(b')') => {
                    self.bump();
                    return Ok(values);
                }
                _ => {}
            }
            values.push(self.parse_value()?);
            self.skip_trivia()?;
            match self.peek() {
                Some(b',') => self.bump(),
                Some(b')') => {
                    self.bump();
                    return Ok(values);
                }
                _ => return Err(self.unexpected("`,` or `)`")),
            }
        }
    }
}

impl Graph {
    pub fn parse(src: &str) -> Result<Self, ParseError> {
        let mut parser = Parser::new(src);
        parser.skip_trivia()?;
        let root = parser.parse_dict()?;
        parser.skip_trivia()?;
        if parser.peek().is_some() {
            return Err(ParseError::TrailingContent { line: parser.line });
        }

        let mut meta = Dict::new();
        let mut objects_entry = None;
        let mut root_entry = None;
        for (key, value) in root {
            match key.as_str() {
                "objects" => objects_entry = Some(value),
                "rootObject" => root_entry = Some(value),
                _ => {
                    meta.insert(key, value);
                }
            }
        }

        let objects_dict = match objects_entry.ok_or(ParseError::ObjectsMissing)? {
            Value::Dict(dict) => dict,
            _ => return Err(ParseError::ObjectsNotDict),
        };
        let mut objects = IndexMap::new();
        for (id, value) in objects_dict {
            let entries = match value {
                Value::Dict(entries) => entries,
                _ => return Err(ParseError::ObjectNotDict { id }),
            };
            if entries.get("isa").and_then(Value::as_str).is_none() {
                return Err(ParseError::ObjectKindMissing { id });
            }
            objects.insert(ObjectId::new(id), Object::from_entries(entries));
        }

        let root_object = match root_entry.ok_or(ParseError::RootObjectMissing)? {
            Value::String(id) => ObjectId::new(id),
            _ => return Err(ParseError::RootObjectInvalid),
        };
        if !objects.contains_key(root_object.as_str()) {
            return Err(ParseError::RootObjectDangling {
                id: root_object.to_string(),
            });
        }

        Ok(Graph {
            meta,
            objects,
            root_object,
            display_name: None,
        })
    }
}
