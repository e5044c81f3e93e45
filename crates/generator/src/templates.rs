//! Template loading and management

use protosample_common::{GeneratorError, Result};
use std::collections::HashMap;
use tera::{Tera, Value};

/// Load all templates
pub fn load_templates() -> Result<Tera> {
    let mut tera = Tera::default();

    // Register custom filters
    tera.register_filter("go_comment", go_comment_filter);

    tera.add_raw_template("sample.go", include_str!("../templates/sample.go.tera"))
        .map_err(|e| {
            GeneratorError::Generation(format!("Failed to load sample.go template: {}", e))
        })?;

    Ok(tera)
}

/// Filter to turn free text into `//` comment lines
fn go_comment_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("go_comment filter expects a string"))?;

    let comment = text
        .trim()
        .lines()
        .map(|line| {
            let line = line.trim_end();
            if line.is_empty() {
                "//".to_string()
            } else {
                format!("// {}", line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    Ok(Value::String(comment))
}
