//! Field shapes
//!
//! A [`FieldShape`] is the type a path position must have: a scalar, an enum,
//! a message or a map, optionally repeated. Message and enum shapes carry only
//! the fully-qualified proto name; their contents are looked up through the
//! [`SchemaOracle`](crate::SchemaOracle) so cyclic schemas never have to be
//! materialized.

use crate::{GeneratorError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Scalar protobuf kinds, keeping the width the target language needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Bool,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Float,
    Double,
    String,
    Bytes,
}

impl ScalarKind {
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            ScalarKind::Int32 | ScalarKind::Int64 | ScalarKind::Uint32 | ScalarKind::Uint64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, ScalarKind::Float | ScalarKind::Double)
    }

    /// Proto spelling of the kind
    pub fn proto_name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int32 => "int32",
            ScalarKind::Int64 => "int64",
            ScalarKind::Uint32 => "uint32",
            ScalarKind::Uint64 => "uint64",
            ScalarKind::Float => "float",
            ScalarKind::Double => "double",
            ScalarKind::String => "string",
            ScalarKind::Bytes => "bytes",
        }
    }
}

/// Reference to a message type by fully-qualified proto name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub full_name: String,
}

impl MessageRef {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
        }
    }
}

/// Reference to an enum type by fully-qualified proto name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumRef {
    pub full_name: String,
}

impl EnumRef {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
        }
    }
}

/// The closed set of shapes a field can take
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeKind {
    Scalar { kind: ScalarKind },
    Enum { enum_ref: EnumRef },
    Message { message: MessageRef },
    Map { key: ScalarKind, value: Box<FieldShape> },
}

/// Type-checked shape of a path position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldShape {
    pub kind: ShapeKind,
    pub repeated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_pattern: Option<NamePattern>,
}

impl FieldShape {
    pub fn scalar(kind: ScalarKind) -> Self {
        Self::from_kind(ShapeKind::Scalar { kind })
    }

    pub fn enumeration(enum_ref: EnumRef) -> Self {
        Self::from_kind(ShapeKind::Enum { enum_ref })
    }

    pub fn message(message: MessageRef) -> Self {
        Self::from_kind(ShapeKind::Message { message })
    }

    pub fn map(key: ScalarKind, value: FieldShape) -> Self {
        Self::from_kind(ShapeKind::Map {
            key,
            value: Box::new(value),
        })
    }

    fn from_kind(kind: ShapeKind) -> Self {
        Self {
            kind,
            repeated: false,
            name_pattern: None,
        }
    }

    /// Mark the shape as repeated
    pub fn into_repeated(mut self) -> Self {
        self.repeated = true;
        self
    }

    /// Attach a resource name pattern
    ///
    /// Only a non-repeated `string` may carry a pattern.
    pub fn with_name_pattern(mut self, pattern: NamePattern) -> Result<Self> {
        if self.repeated || self.scalar_kind() != Some(ScalarKind::String) {
            return Err(GeneratorError::Parse(format!(
                "name pattern `{}` can only be attached to a singular string, not {}",
                pattern, self
            )));
        }
        self.name_pattern = Some(pattern);
        Ok(self)
    }

    /// Shape of one element of a repeated field
    pub fn element(&self) -> Self {
        Self {
            repeated: false,
            ..self.clone()
        }
    }

    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self.kind {
            ShapeKind::Scalar { kind } => Some(kind),
            _ => None,
        }
    }

    /// The message behind a singular message shape
    pub fn as_message(&self) -> Option<&MessageRef> {
        match &self.kind {
            ShapeKind::Message { message } if !self.repeated => Some(message),
            _ => None,
        }
    }

    /// Key and value shapes of a singular map shape
    pub fn as_map(&self) -> Option<(ScalarKind, &FieldShape)> {
        match &self.kind {
            ShapeKind::Map { key, value } if !self.repeated => Some((*key, value.as_ref())),
            _ => None,
        }
    }

    /// Whether a literal can be assigned at this position
    pub fn is_terminal(&self) -> bool {
        !self.repeated && matches!(self.kind, ShapeKind::Scalar { .. } | ShapeKind::Enum { .. })
    }
}

impl fmt::Display for FieldShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.repeated {
            write!(f, "repeated ")?;
        }
        match &self.kind {
            ShapeKind::Scalar { kind } => write!(f, "{}", kind.proto_name()),
            ShapeKind::Enum { enum_ref } => write!(f, "enum {}", enum_ref.full_name),
            ShapeKind::Message { message } => write!(f, "message {}", message.full_name),
            ShapeKind::Map { key, value } => write!(f, "map<{}, {}>", key.proto_name(), value),
        }
    }
}

/// One segment of a resource name pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternSegment {
    Literal(String),
    Placeholder(String),
}

/// Resource name template such as `shelves/{shelf}/books/{book}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamePattern {
    pub segments: Vec<PatternSegment>,
}

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex is valid")
    })
}

impl NamePattern {
    /// Parse a `{placeholder}` template
    ///
    /// # Examples
    /// ```
    /// use protosample_common::{NamePattern, PatternSegment};
    ///
    /// let pattern = NamePattern::parse("shelves/{shelf}").unwrap();
    /// assert_eq!(pattern.placeholders().collect::<Vec<_>>(), vec!["shelf"]);
    /// ```
    pub fn parse(template: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut last = 0;

        for captures in placeholder_regex().captures_iter(template) {
            let whole = captures.get(0).expect("capture 0 always matches");
            if whole.start() > last {
                segments.push(PatternSegment::Literal(
                    template[last..whole.start()].to_string(),
                ));
            }
            segments.push(PatternSegment::Placeholder(captures[1].to_string()));
            last = whole.end();
        }
        if last < template.len() {
            segments.push(PatternSegment::Literal(template[last..].to_string()));
        }

        let stray_brace = segments.iter().any(|s| {
            matches!(s, PatternSegment::Literal(text) if text.contains('{') || text.contains('}'))
        });
        if stray_brace {
            return Err(GeneratorError::Parse(format!(
                "malformed placeholder in name pattern `{}`",
                template
            )));
        }

        let pattern = Self { segments };
        if pattern.placeholders().next().is_none() {
            return Err(GeneratorError::Parse(format!(
                "name pattern `{}` has no placeholders",
                template
            )));
        }
        Ok(pattern)
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            PatternSegment::Placeholder(name) => Some(name.as_str()),
            PatternSegment::Literal(_) => None,
        })
    }

    pub fn has_placeholder(&self, name: &str) -> bool {
        self.placeholders().any(|p| p == name)
    }

    /// printf-style format with one `%s` per placeholder
    pub fn format_string(&self) -> String {
        self.segments
            .iter()
            .map(|s| match s {
                PatternSegment::Literal(text) => text.replace('%', "%%"),
                PatternSegment::Placeholder(_) => "%s".to_string(),
            })
            .collect()
    }
}

impl fmt::Display for NamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                PatternSegment::Literal(text) => write!(f, "{}", text)?,
                PatternSegment::Placeholder(name) => write!(f, "{{{}}}", name)?,
            }
        }
        Ok(())
    }
}
