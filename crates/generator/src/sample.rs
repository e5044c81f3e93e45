//! One sample, from config entry to Go function body
//!
//! Request entries are type-checked into a [`ValueTree`] first. Only then is
//! anything written, into a writer owned by this sample; a failure anywhere
//! drops the whole sample.

use crate::emitter::{GoImport, ValueEmitter};
use crate::lexer::parse_identifier;
use crate::output::OutputInterpreter;
use crate::resolver::{PathResolver, RESPONSE_VAR};
use crate::scope::{short_hash, ScopeTable};
use crate::value::{AssignOptions, Binding, ValueTree};
use crate::writer::SourceWriter;
use protosample_common::naming::{go_camel_case, go_lower_camel_case};
use protosample_common::{
    ClientInfo, FieldShape, GeneratorError, Result, SampleError, SampleSpec, ScalarKind,
    SchemaOracle,
};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Names used by the generated scaffolding
pub const RESERVED_NAMES: [&str; 5] = ["ctx", "c", "req", RESPONSE_VAR, "err"];

/// Standard library packages a sample may import
pub const STD_PACKAGES: [&str; 4] = ["context", "fmt", "log", "os"];

const REQUEST_VAR: &str = "req";

/// A parameter of the sample function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleParameter {
    pub name: String,
    pub shape: FieldShape,
    pub go_type: String,
    /// Go expression `main` passes in
    pub default_value: String,
}

/// A fully emitted sample
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedSample {
    /// Disambiguated sample id
    pub id: String,
    pub region_tag: Option<String>,
    pub description: Option<String>,
    pub function_name: String,
    pub service: String,
    pub rpc: String,
    pub parameters: Vec<SampleParameter>,
    /// The request composite literal on its own
    pub request_literal: String,
    /// Statements of the sample function, indented one level
    pub body: String,
    pub std_imports: Vec<String>,
    pub imports: Vec<GoImport>,
    /// Rendered Go file
    pub source: String,
}

struct PendingParameter {
    name: String,
    shape: FieldShape,
    literal: String,
}

/// Type-check and emit one sample
///
/// # Example
/// ```rust,ignore
/// let sample = build_sample(&oracle, &client, &spec, "get_book")?;
/// println!("{}", sample.body);
/// ```
pub fn build_sample(
    oracle: &dyn SchemaOracle,
    client: &ClientInfo,
    spec: &SampleSpec,
    id: &str,
) -> Result<GeneratedSample> {
    let method = oracle.method(&spec.service, &spec.rpc).ok_or_else(|| {
        GeneratorError::Generation(format!("Unknown RPC {}.{}", spec.service, spec.rpc))
    })?;

    let mut reserved = Vec::from(RESERVED_NAMES);
    reserved.extend(STD_PACKAGES);
    reserved.push(client.package.as_str());
    let mut scope = ScopeTable::with_reserved(reserved);
    let mut tree = ValueTree::new(method.input.clone());
    let mut pending = Vec::new();

    for field in &spec.request {
        let src = field.assignment();
        if field.value.is_none() && field.input_parameter.is_some() {
            return Err(SampleError::syntax(&src, "an input parameter needs a default value").into());
        }

        let options = AssignOptions {
            comment: field.comment.as_deref(),
            file_backed: field.value_is_file,
        };
        tree.assign(oracle, &src, options, |leaf| {
            let explicit = field
                .input_parameter
                .as_deref()
                .map(parse_identifier)
                .transpose()?;

            let (name, binding) = if field.value_is_file {
                let parameter = match explicit {
                    Some(name) => name,
                    None => scope.disambiguate(
                        &format!("{}Path", go_lower_camel_case(&leaf.field)),
                        &src,
                    ),
                };
                scope.declare(&parameter, leaf.shape.clone())?;
                let variable = scope.disambiguate(
                    &format!("{}Content", go_lower_camel_case(&leaf.field)),
                    &src,
                );
                scope.declare(&variable, FieldShape::scalar(ScalarKind::Bytes))?;
                (
                    parameter.clone(),
                    Binding::File {
                        parameter,
                        variable,
                    },
                )
            } else if let Some(name) = explicit {
                scope.declare(&name, leaf.shape.clone())?;
                (name.clone(), Binding::Parameter(name))
            } else {
                return Ok(Binding::Literal);
            };

            pending.push(PendingParameter {
                name,
                shape: leaf.shape.clone(),
                literal: leaf.literal.clone(),
            });
            Ok(binding)
        })?;
    }

    let mut emitter = ValueEmitter::new(oracle);
    let mut writer = SourceWriter::new(1);
    let client_import = GoImport {
        path: client.import_path.clone(),
        alias: client.package.clone(),
    };

    writer.line("ctx := context.Background()");
    writer.line(format!(
        "c, err := {}.{}(ctx)",
        client_import.alias, client.constructor
    ));
    return_on_error(&mut writer);
    writer.line("defer c.Close()");
    writer.blank();

    let file_refs = tree.file_refs();
    for file in &file_refs {
        writer.line(format!(
            "{}, err := os.ReadFile({})",
            file.variable, file.parameter
        ));
        return_on_error(&mut writer);
    }
    if !file_refs.is_empty() {
        writer.blank();
    }

    emitter.emit_request(&tree, REQUEST_VAR, &mut writer)?;

    let returns_empty = method.returns_empty();
    let mut uses_fmt = emitter.uses_fmt();
    let mut actions = SourceWriter::new(1);
    let binds_response = if spec.response.is_empty() {
        if !returns_empty {
            actions.blank();
            actions.line(format!("fmt.Println({})", RESPONSE_VAR));
            uses_fmt = true;
        }
        !returns_empty
    } else {
        actions.blank();
        let response = (!returns_empty).then(|| method.output.clone());
        let resolver = PathResolver::new(oracle, response);
        let mut interpreter = OutputInterpreter::new(resolver, &mut actions);
        interpreter.run(&mut scope, &spec.response)?;
        uses_fmt |= interpreter.uses_fmt();
        interpreter.uses_response()
    };

    let call = format!("c.{}(ctx, {})", method.name, REQUEST_VAR);
    if returns_empty {
        writer.line(format!("err = {}", call));
    } else if binds_response {
        writer.line(format!("{}, err := {}", RESPONSE_VAR, call));
    } else {
        writer.line(format!("_, err = {}", call));
    }
    return_on_error(&mut writer);
    writer.append(actions);
    writer.line("return nil");

    let mut literal_writer = SourceWriter::new(0);
    emitter.emit_request(&tree, REQUEST_VAR, &mut literal_writer)?;

    let parameters = pending
        .into_iter()
        .map(|p| {
            Ok(SampleParameter {
                go_type: emitter.go_type(&p.shape)?,
                default_value: emitter.literal_expr(&p.shape, &p.literal)?,
                name: p.name,
                shape: p.shape,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut std_imports = vec!["context", "log"];
    if uses_fmt {
        std_imports.push("fmt");
    }
    if !file_refs.is_empty() {
        std_imports.push("os");
    }
    std_imports.sort_unstable();

    if let Some(taken) = emitter
        .imports()
        .iter()
        .find(|import| import.path != client_import.path && scope.is_used(&import.alias))
    {
        return Err(SampleError::DuplicateName {
            name: taken.alias.clone(),
        }
        .into());
    }

    let mut imports: BTreeSet<GoImport> = emitter.imports().clone();
    imports.insert(client_import);

    Ok(GeneratedSample {
        id: id.to_string(),
        region_tag: spec.region_tag.clone(),
        description: spec.description.clone(),
        function_name: function_name(id),
        service: spec.service.clone(),
        rpc: method.name,
        parameters,
        request_literal: literal_writer.finish(),
        body: writer.finish(),
        std_imports: std_imports.into_iter().map(str::to_string).collect(),
        imports: imports.into_iter().collect(),
        source: String::new(),
    })
}

fn return_on_error(writer: &mut SourceWriter) {
    writer.line("if err != nil {");
    writer.line("return err");
    writer.line("}");
}

/// Go function name for a sample id (`get_book` -> `sampleGetBook`)
///
/// Ids with separators are lowercased first (`GET-BOOK` -> `sampleGetBook`);
/// a camel-case id keeps its word boundaries (`getBook` -> `sampleGetBook`).
pub fn function_name(id: &str) -> String {
    let separated = id.chars().any(|c| !c.is_ascii_alphanumeric());
    let sanitized: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let words = if separated {
        sanitized.to_ascii_lowercase()
    } else {
        sanitized
    };
    format!("sample{}", go_camel_case(&words))
}

/// Output ids for `samples`, in order
///
/// Ids that occur once are kept. Every occurrence of a repeated id gets a
/// suffix hashed from the sample's content; samples with identical content
/// also get their position appended.
pub fn disambiguate_sample_ids(samples: &[SampleSpec]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for sample in samples {
        *counts.entry(sample.id.as_str()).or_default() += 1;
    }

    let mut used: HashSet<String> = samples.iter().map(|s| s.id.clone()).collect();
    samples
        .iter()
        .enumerate()
        .map(|(position, sample)| {
            if counts[sample.id.as_str()] == 1 {
                return sample.id.clone();
            }

            let content = serde_yaml::to_string(sample).unwrap_or_else(|_| format!("{:?}", sample));
            let mut id = format!("{}_{}", sample.id, short_hash(&content, 0));
            if used.contains(&id) {
                id = format!("{}_{}", id, position);
            }
            used.insert(id.clone());
            id
        })
        .collect()
}
