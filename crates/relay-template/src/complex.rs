//! Template detection and rendering over nested config values
//!
//! Script and automation configuration carries template strings embedded in
//! arbitrarily nested JSON values. These helpers are the only two operations
//! callers need: detect whether a value contains any template at any depth,
//! and render every template inside a value against a context.

use crate::engine::TemplateEngine;
use crate::error::TemplateResult;
use serde::Serialize;
use serde_json::Value;

/// Check whether a value contains a template expression at any depth
///
/// Object keys are inspected too, matching how configs may template keys.
pub fn is_complex(value: &Value) -> bool {
    match value {
        Value::String(s) => TemplateEngine::is_template(s),
        Value::Array(arr) => arr.iter().any(is_complex),
        Value::Object(obj) => obj
            .iter()
            .any(|(k, v)| TemplateEngine::is_template(k) || is_complex(v)),
        _ => false,
    }
}

/// Recursively render every template expression inside a value
///
/// Template strings are rendered with `context` as the variable namespace.
/// The rendered output is parsed back as JSON where possible so that
/// `"{{ 1 + 1 }}"` yields the number `2` rather than the string `"2"`;
/// output that is not valid JSON stays a string. Templated object keys are
/// rendered too, with the output kept verbatim as the string key.
/// Non-template scalars are returned unchanged.
pub fn render_complex<C: Serialize>(
    engine: &TemplateEngine,
    value: &Value,
    context: &C,
) -> TemplateResult<Value> {
    match value {
        Value::String(s) if TemplateEngine::is_template(s) => {
            let rendered = engine.render_with_context(s, context)?;

            // Try to parse as JSON, otherwise keep as string
            Ok(serde_json::from_str(&rendered).unwrap_or(Value::String(rendered)))
        }
        Value::Object(obj) => {
            let mut new_obj = serde_json::Map::new();
            for (k, v) in obj {
                let key = if TemplateEngine::is_template(k) {
                    engine.render_with_context(k, context)?
                } else {
                    k.clone()
                };
                new_obj.insert(key, render_complex(engine, v, context)?);
            }
            Ok(Value::Object(new_obj))
        }
        Value::Array(arr) => {
            let new_arr: Result<Vec<_>, _> = arr
                .iter()
                .map(|v| render_complex(engine, v, context))
                .collect();
            Ok(Value::Array(new_arr?))
        }
        _ => Ok(value.clone()),
    }
}
