//! Tokenizer and path grammar shared by request assignments and read paths
//!
//! ```text
//! assignment := Ident { '.' Ident | '[' Int ']' } [ '=' literal ]
//! literal    := Int | Float | String | Ident
//! ```

use protosample_common::SampleError;
use regex::Regex;
use std::sync::OnceLock;

/// Lexical token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Ident(String),
    Int(String),
    Float(String),
    /// Quoted string: source spelling and decoded contents
    Str { raw: String, value: String },
    Dot,
    Eq,
    LBracket,
    RBracket,
    Eof,
}

impl Token {
    /// Source spelling of the token
    pub fn text(&self) -> &str {
        match self {
            Token::Ident(s) | Token::Int(s) | Token::Float(s) => s,
            Token::Str { raw, .. } => raw,
            Token::Dot => ".",
            Token::Eq => "=",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::Eof => "end of input",
        }
    }
}

/// One alternative per token class; `open` only matches an unterminated quote
const TOKEN_PATTERN: &str = r#"(?x)
    (?P<space>\s+)
  | (?P<string>"(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*')
  | (?P<float>[+-]?[0-9]+\.[0-9]+)
  | (?P<int>[+-]?[0-9]+)
  | (?P<ident>[A-Za-z_$][A-Za-z0-9_]*)
  | (?P<punct>[.=\[\]])
  | (?P<open>["'])
"#;

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(TOKEN_PATTERN).expect("token pattern is valid"))
}

/// Split `src` into tokens, always terminated by [`Token::Eof`]
///
/// Text between two matches, or after the last one, is a syntax error.
pub fn tokenize(src: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut last_end = 0;

    for captures in token_regex().captures_iter(src) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        if whole.start() > last_end {
            return Err(unexpected(&src[last_end..whole.start()]));
        }
        last_end = whole.end();

        let text = whole.as_str();
        let token = if captures.name("space").is_some() {
            continue;
        } else if captures.name("string").is_some() {
            Token::Str {
                raw: text.to_string(),
                value: unescape(text)?,
            }
        } else if captures.name("float").is_some() {
            Token::Float(text.to_string())
        } else if captures.name("int").is_some() {
            Token::Int(text.to_string())
        } else if captures.name("ident").is_some() {
            Token::Ident(text.to_string())
        } else if captures.name("punct").is_some() {
            match text {
                "." => Token::Dot,
                "=" => Token::Eq,
                "[" => Token::LBracket,
                _ => Token::RBracket,
            }
        } else {
            return Err("unterminated string literal".to_string());
        };
        tokens.push(token);
    }

    if last_end < src.len() {
        return Err(unexpected(&src[last_end..]));
    }

    tokens.push(Token::Eof);
    Ok(tokens)
}

fn unexpected(text: &str) -> String {
    format!("unexpected `{}`", text)
}

/// Decode the contents of a quoted string, quotes included in `raw`
fn unescape(raw: &str) -> Result<String, String> {
    let inner = &raw[1..raw.len() - 1];
    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        let escaped = match chars.next() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('\\') => '\\',
            Some('"') => '"',
            Some('\'') => '\'',
            Some(other) => return Err(format!("unknown escape `\\{}`", other)),
            None => return Err("unterminated string literal".to_string()),
        };
        value.push(escaped);
    }

    Ok(value)
}

/// One step of a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Field(String),
    Index(usize),
}

/// A root identifier followed by field and index steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpr {
    pub root: String,
    pub segments: Vec<Segment>,
}

impl PathExpr {
    /// All steps, treating the root as the first field
    pub fn field_steps(&self) -> impl Iterator<Item = Segment> + '_ {
        std::iter::once(Segment::Field(self.root.clone())).chain(self.segments.iter().cloned())
    }

    /// Name of the last field step
    pub fn last_field(&self) -> &str {
        self.segments
            .iter()
            .rev()
            .find_map(|s| match s {
                Segment::Field(name) => Some(name.as_str()),
                Segment::Index(_) => None,
            })
            .unwrap_or(&self.root)
    }
}

/// A parsed `path[=literal]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub path: PathExpr,
    pub literal: Option<Token>,
}

struct Cursor<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Result<Self, SampleError> {
        let tokens = tokenize(src).map_err(|message| SampleError::syntax(src, message))?;
        Ok(Self {
            src,
            tokens,
            pos: 0,
        })
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: impl Into<String>) -> SampleError {
        SampleError::syntax(self.src, message)
    }

    fn ident(&mut self) -> Result<String, SampleError> {
        match self.advance() {
            Token::Ident(name) => Ok(name),
            other => Err(self.error(format!("expected identifier, found `{}`", other.text()))),
        }
    }

    fn path(&mut self) -> Result<PathExpr, SampleError> {
        let root = self.ident()?;
        let mut segments = Vec::new();

        loop {
            match self.peek() {
                Token::Dot => {
                    self.advance();
                    segments.push(Segment::Field(self.ident()?));
                }
                Token::LBracket => {
                    self.advance();
                    let index = match self.advance() {
                        Token::Int(text) => text
                            .parse::<usize>()
                            .map_err(|_| self.error(format!("invalid index `{}`", text)))?,
                        other => {
                            return Err(
                                self.error(format!("expected index, found `{}`", other.text()))
                            )
                        }
                    };
                    match self.advance() {
                        Token::RBracket => {}
                        other => {
                            return Err(self.error(format!("expected `]`, found `{}`", other.text())))
                        }
                    }
                    segments.push(Segment::Index(index));
                }
                _ => break,
            }
        }

        Ok(PathExpr { root, segments })
    }

    fn literal(&mut self) -> Result<Token, SampleError> {
        match self.advance() {
            token @ (Token::Ident(_) | Token::Int(_) | Token::Float(_) | Token::Str { .. }) => {
                Ok(token)
            }
            other => Err(self.error(format!("expected literal, found `{}`", other.text()))),
        }
    }

    fn end(&mut self) -> Result<(), SampleError> {
        match self.advance() {
            Token::Eof => Ok(()),
            other => Err(self.error(format!("unexpected trailing `{}`", other.text()))),
        }
    }
}

/// Parse a request assignment `path[=literal]`
pub fn parse_assignment(src: &str) -> Result<Assignment, SampleError> {
    let mut cursor = Cursor::new(src)?;
    let path = cursor.path()?;

    let literal = if cursor.peek() == &Token::Eq {
        cursor.advance();
        Some(cursor.literal()?)
    } else {
        None
    };
    cursor.end()?;

    Ok(Assignment { path, literal })
}

/// Parse a read-only path (no `= literal` clause)
pub fn parse_read_path(src: &str) -> Result<PathExpr, SampleError> {
    let mut cursor = Cursor::new(src)?;
    let path = cursor.path()?;
    cursor.end()?;
    Ok(path)
}

/// Parse a bare identifier, as used for declared variable names
pub fn parse_identifier(src: &str) -> Result<String, SampleError> {
    let mut cursor = Cursor::new(src)?;
    let name = cursor.ident()?;
    cursor.end()?;

    if name.starts_with('$') {
        return Err(SampleError::syntax(src, "`$` names are reserved"));
    }
    Ok(name)
}
