//! Response-handling interpreter
//!
//! Walks the `response` actions of a sample and emits Go statements through a
//! [`SourceWriter`]. Declarations go through the [`ScopeTable`]; loop bodies
//! run in a child scope that is closed with the loop.

use crate::golang;
use crate::lexer::parse_identifier;
use crate::resolver::PathResolver;
use crate::scope::ScopeTable;
use crate::writer::SourceWriter;
use protosample_common::{FieldShape, OutputSpec, SampleError};

/// The single action an [`OutputSpec`] carries
#[derive(Debug, Clone)]
pub enum OutputAction<'s> {
    Define {
        name: String,
        path: &'s str,
    },
    Print {
        format: &'s str,
        args: &'s [String],
    },
    LoopOverCollection {
        variable: String,
        collection: &'s str,
        body: &'s [OutputSpec],
    },
    LoopOverMap {
        key: Option<String>,
        value: Option<String>,
        map: &'s str,
        body: &'s [OutputSpec],
    },
}

impl<'s> OutputAction<'s> {
    /// Classify `spec`, which must carry exactly one action
    pub fn from_spec(spec: &'s OutputSpec) -> Result<Self, SampleError> {
        let found = [
            spec.define.is_some(),
            spec.print.is_some(),
            spec.loop_spec.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count();
        if found != 1 {
            return Err(SampleError::ConflictingActions {
                spec: spec_text(spec),
                found,
            });
        }

        if let Some(define) = &spec.define {
            let (name, path) = define
                .split_once('=')
                .ok_or_else(|| SampleError::syntax(define, "expected `name=path`"))?;
            return Ok(OutputAction::Define {
                name: parse_identifier(name)?,
                path: path.trim(),
            });
        }

        if let Some(print) = &spec.print {
            let (format, args) = print
                .split_first()
                .ok_or_else(|| SampleError::syntax(&spec_text(spec), "print needs a format string"))?;
            return Ok(OutputAction::Print {
                format: format.as_str(),
                args,
            });
        }

        let lp = match &spec.loop_spec {
            Some(lp) => lp,
            None => {
                return Err(SampleError::ConflictingActions {
                    spec: spec_text(spec),
                    found: 0,
                })
            }
        };
        match (&lp.collection, &lp.map) {
            (Some(collection), None) => {
                let variable = lp.variable.as_deref().ok_or_else(|| SampleError::MissingBinding {
                    path: collection.clone(),
                })?;
                Ok(OutputAction::LoopOverCollection {
                    variable: parse_identifier(variable)?,
                    collection: collection.as_str(),
                    body: &lp.body,
                })
            }
            (None, Some(map)) => Ok(OutputAction::LoopOverMap {
                key: lp.key.as_deref().map(parse_identifier).transpose()?,
                value: lp.value.as_deref().map(parse_identifier).transpose()?,
                map: map.as_str(),
                body: &lp.body,
            }),
            (collection, map) => Err(SampleError::ConflictingActions {
                spec: spec_text(spec),
                found: usize::from(collection.is_some()) + usize::from(map.is_some()),
            }),
        }
    }
}

/// Compact rendering of a spec for diagnostics
fn spec_text(spec: &OutputSpec) -> String {
    serde_json::to_string(spec).unwrap_or_else(|_| format!("{:?}", spec))
}

/// Go print statement for a `%s` format and resolved argument accessors
fn print_statement(format: &str, args: &[String]) -> Result<String, SampleError> {
    let pieces: Vec<&str> = format.split("%s").collect();
    if pieces.len() - 1 != args.len() {
        return Err(SampleError::syntax(
            format,
            format!(
                "format has {} placeholders but {} arguments were given",
                pieces.len() - 1,
                args.len()
            ),
        ));
    }

    if args.is_empty() {
        return Ok(format!("fmt.Println({})", golang::quote(format)));
    }

    let go_format = pieces
        .iter()
        .map(|piece| piece.replace('%', "%%"))
        .collect::<Vec<_>>()
        .join("%v");
    Ok(format!(
        "fmt.Printf({}, {})",
        golang::quote(&format!("{}\n", go_format)),
        args.join(", ")
    ))
}

/// Interprets response actions into statements
pub struct OutputInterpreter<'a, 'w> {
    resolver: PathResolver<'a>,
    writer: &'w mut SourceWriter,
    uses_fmt: bool,
}

impl<'a, 'w> OutputInterpreter<'a, 'w> {
    pub fn new(resolver: PathResolver<'a>, writer: &'w mut SourceWriter) -> Self {
        Self {
            resolver,
            writer,
            uses_fmt: false,
        }
    }

    /// Whether any emitted statement needs the `fmt` package
    pub fn uses_fmt(&self) -> bool {
        self.uses_fmt
    }

    /// Whether any action read the response
    pub fn uses_response(&self) -> bool {
        self.resolver.response_used()
    }

    /// Interpret `specs` in order
    ///
    /// Statements of actions before a failing one have already been written.
    pub fn run(&mut self, scope: &mut ScopeTable, specs: &[OutputSpec]) -> Result<(), SampleError> {
        for spec in specs {
            self.interpret(scope, spec)?;
        }
        Ok(())
    }

    fn interpret(&mut self, scope: &mut ScopeTable, spec: &OutputSpec) -> Result<(), SampleError> {
        match OutputAction::from_spec(spec)? {
            OutputAction::Define { name, path } => {
                let resolved = self.resolver.resolve(scope, path)?;
                scope.declare(&name, resolved.shape)?;
                self.writer
                    .line(format!("{} := {}", name, resolved.accessor));
            }
            OutputAction::Print { format, args } => {
                let accessors = args
                    .iter()
                    .map(|arg| self.resolver.resolve(scope, arg).map(|r| r.accessor))
                    .collect::<Result<Vec<_>, _>>()?;
                self.writer.line(print_statement(format, &accessors)?);
                self.uses_fmt = true;
            }
            OutputAction::LoopOverCollection {
                variable,
                collection,
                body,
            } => {
                let resolved = self.resolver.resolve(scope, collection)?;
                if !resolved.shape.repeated {
                    return Err(SampleError::NotIterable {
                        path: collection.to_string(),
                        shape: resolved.shape.to_string(),
                    });
                }

                let mut block = scope.enter_block();
                block.declare(&variable, resolved.shape.element())?;
                self.writer
                    .line(format!("for _, {} := range {} {{", variable, resolved.accessor));
                self.run(&mut block, body)?;
                self.writer.line("}");
            }
            OutputAction::LoopOverMap {
                key,
                value,
                map,
                body,
            } => {
                let resolved = self.resolver.resolve(scope, map)?;
                let (key_kind, value_shape) =
                    resolved
                        .shape
                        .as_map()
                        .ok_or_else(|| SampleError::NotAMap {
                            path: map.to_string(),
                            shape: resolved.shape.to_string(),
                        })?;
                if key.is_none() && value.is_none() {
                    return Err(SampleError::MissingBinding {
                        path: map.to_string(),
                    });
                }

                let mut block = scope.enter_block();
                if let Some(key) = &key {
                    block.declare(key, FieldShape::scalar(key_kind))?;
                }
                if let Some(value) = &value {
                    block.declare(value, value_shape.clone())?;
                }
                self.writer.line(format!(
                    "for {}, {} := range {} {{",
                    key.as_deref().unwrap_or("_"),
                    value.as_deref().unwrap_or("_"),
                    resolved.accessor
                ));
                self.run(&mut block, body)?;
                self.writer.line("}");
            }
        }
        Ok(())
    }
}
