//! Script variable resolution
//!
//! A script declares static variables up front; each run may additionally
//! supply its own run variables. [`ScriptVariables`] combines the two into
//! the concrete variable namespace for one run, defining evaluation order,
//! override precedence, and which template expressions get evaluated at all.

use indexmap::IndexMap;
use relay_template::{is_complex, render_complex, TemplateEngine, TemplateError};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::trace;

/// An ordered mapping of variable names to (possibly templated) values
///
/// Definition order matters: earlier variables are visible to the templates
/// of later ones within the same render.
pub type Variables = IndexMap<String, Value>;

/// Errors from rendering script variables
#[derive(Debug, Error)]
pub enum VariablesError {
    /// A variable's template failed to evaluate
    #[error("failed to render variable '{key}': {source}")]
    Render {
        key: String,
        #[source]
        source: TemplateError,
    },
}

/// Result type for variable rendering
pub type VariablesResult<T> = Result<T, VariablesError>;

/// Holds and renders a script's static variable definitions
///
/// Whether the definitions contain any template expression is classified
/// lazily on the first [`render`](Self::render) and cached for the lifetime
/// of the instance; the engine handle is attached in the same step. The
/// definitions are frozen from that point on, which is why
/// [`as_map`](Self::as_map) hands out only a shared borrow.
///
/// Renders on one instance are expected to be serialized by the caller
/// (`render` takes `&mut self`); there is no internal locking.
#[derive(Clone, Default, Deserialize)]
#[serde(from = "Variables")]
pub struct ScriptVariables {
    variables: Variables,
    has_template: Option<bool>,
    engine: Option<Arc<TemplateEngine>>,
}

impl ScriptVariables {
    /// Create from static variable definitions
    pub fn new(variables: Variables) -> Self {
        Self {
            variables,
            has_template: None,
            engine: None,
        }
    }

    /// Render the variables for one run
    ///
    /// The run variables are used to compute the static variables, but
    /// afterwards are also merged on top of them: a run-supplied key wins on
    /// collision AND suppresses evaluation of the corresponding static
    /// definition entirely. Run variables are never treated as templates,
    /// even when they contain template syntax.
    ///
    /// Static definitions are evaluated in definition order, each with the
    /// variables resolved so far as its template context, so later
    /// definitions can reference earlier ones. A failed evaluation aborts
    /// the render; no partial result is returned.
    ///
    /// Only definition values participate in the one-time template
    /// classification. Top-level keys are variable names, never rendered,
    /// so template syntax in a name does not put the instance on the
    /// template path (keys inside nested values do, and are rendered).
    pub fn render(
        &mut self,
        engine: &Arc<TemplateEngine>,
        run_variables: Option<&Variables>,
    ) -> VariablesResult<Variables> {
        let has_template = match self.has_template {
            Some(classified) => classified,
            None => {
                // One-time classification and engine attachment
                let classified = self.variables.values().any(is_complex);
                self.has_template = Some(classified);
                self.engine = Some(Arc::clone(engine));
                classified
            }
        };

        if !has_template {
            let mut rendered_variables = self.variables.clone();

            if let Some(run_variables) = run_variables {
                rendered_variables.extend(run_variables.clone());
            }

            return Ok(rendered_variables);
        }

        let engine = self.engine.as_deref().unwrap_or(&**engine);

        let mut rendered_variables = run_variables.cloned().unwrap_or_default();

        for (key, value) in &self.variables {
            // We can skip if we're going to override this key with
            // run variables anyway
            if rendered_variables.contains_key(key) {
                trace!("Skipping variable '{}': overridden by run variables", key);
                continue;
            }

            let resolved = render_complex(engine, value, &rendered_variables).map_err(
                |source| VariablesError::Render {
                    key: key.clone(),
                    source,
                },
            )?;
            rendered_variables.insert(key.clone(), resolved);
        }

        if let Some(run_variables) = run_variables {
            if !run_variables.is_empty() {
                rendered_variables.extend(run_variables.clone());
            }
        }

        Ok(rendered_variables)
    }

    /// The static variable definitions, unevaluated
    ///
    /// Returns the stored definitions regardless of how many renders have
    /// happened.
    pub fn as_map(&self) -> &Variables {
        &self.variables
    }

    /// Whether any definition contains a template expression
    ///
    /// `None` until the first render classifies the definitions.
    pub fn has_template(&self) -> Option<bool> {
        self.has_template
    }
}

impl From<Variables> for ScriptVariables {
    fn from(variables: Variables) -> Self {
        Self::new(variables)
    }
}

impl Serialize for ScriptVariables {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.variables.serialize(serializer)
    }
}

impl fmt::Debug for ScriptVariables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptVariables")
            .field("variables", &self.variables)
            .field("has_template", &self.has_template)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(pairs: &[(&str, Value)]) -> Variables {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn engine() -> Arc<TemplateEngine> {
        Arc::new(TemplateEngine::new())
    }

    #[test]
    fn test_fast_path_merge() {
        let mut sv = ScriptVariables::new(vars(&[("a", json!(1)), ("b", json!("two"))]));
        let run = vars(&[("b", json!(2)), ("c", json!(3))]);

        let rendered = sv.render(&engine(), Some(&run)).unwrap();
        assert_eq!(
            rendered,
            vars(&[("a", json!(1)), ("b", json!(2)), ("c", json!(3))])
        );
        assert_eq!(sv.has_template(), Some(false));
    }

    #[test]
    fn test_fast_path_run_variables_not_rendered() {
        // Template-looking run variables stay verbatim on the fast path
        let mut sv = ScriptVariables::new(vars(&[("a", json!(1))]));
        let run = vars(&[("b", json!("{{ 1 / 0 }}"))]);

        let rendered = sv.render(&engine(), Some(&run)).unwrap();
        assert_eq!(rendered.get("b"), Some(&json!("{{ 1 / 0 }}")));
    }

    #[test]
    fn test_chained_definitions_see_earlier_values() {
        let mut sv = ScriptVariables::new(vars(&[
            ("a", json!("{{ 1 }}")),
            ("b", json!("{{ a + 1 }}")),
        ]));

        let rendered = sv.render(&engine(), None).unwrap();
        assert_eq!(rendered, vars(&[("a", json!(1)), ("b", json!(2))]));
    }

    #[test]
    fn test_forward_reference_fails() {
        // b is defined before a, so a is not in b's context yet
        let mut sv = ScriptVariables::new(vars(&[
            ("b", json!("{{ a + 1 }}")),
            ("a", json!("{{ 1 }}")),
        ]));

        let err = sv.render(&engine(), None).unwrap_err();
        let VariablesError::Render { key, .. } = err;
        assert_eq!(key, "b");
    }

    #[test]
    fn test_run_override_suppresses_evaluation() {
        // The static template would raise, but the run variable wins without
        // the template ever being evaluated
        let mut sv = ScriptVariables::new(vars(&[("a", json!("{{ 1 / 0 }}"))]));
        let run = vars(&[("a", json!(5))]);

        let rendered = sv.render(&engine(), Some(&run)).unwrap();
        assert_eq!(rendered, vars(&[("a", json!(5))]));
    }

    #[test]
    fn test_template_path_union_of_keys() {
        let mut sv = ScriptVariables::new(vars(&[
            ("a", json!("{{ 2 * 2 }}")),
            ("b", json!("static")),
        ]));
        let run = vars(&[("c", json!(3))]);

        let rendered = sv.render(&engine(), Some(&run)).unwrap();
        assert_eq!(rendered.get("a"), Some(&json!(4)));
        assert_eq!(rendered.get("b"), Some(&json!("static")));
        assert_eq!(rendered.get("c"), Some(&json!(3)));
        assert_eq!(rendered.len(), 3);
    }

    #[test]
    fn test_error_carries_key_and_cause() {
        let mut sv = ScriptVariables::new(vars(&[("broken", json!("{{ 1 / 0 }}"))]));

        let err = sv.render(&engine(), None).unwrap_err();
        let VariablesError::Render { ref key, .. } = err;
        assert_eq!(key, "broken");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_none_equals_empty_run_variables() {
        let mut a = ScriptVariables::new(vars(&[("x", json!("{{ 1 + 1 }}"))]));
        let mut b = a.clone();

        let from_none = a.render(&engine(), None).unwrap();
        let from_empty = b.render(&engine(), Some(&Variables::new())).unwrap();
        assert_eq!(from_none, from_empty);
    }

    #[test]
    fn test_classification_is_cached() {
        let mut sv = ScriptVariables::new(vars(&[("a", json!(1))]));
        let engine = engine();

        assert_eq!(sv.has_template(), None);
        sv.render(&engine, None).unwrap();
        assert_eq!(sv.has_template(), Some(false));

        // Second render with different run variables behaves identically
        let run = vars(&[("b", json!(2))]);
        let rendered = sv.render(&engine, Some(&run)).unwrap();
        assert_eq!(rendered, vars(&[("a", json!(1)), ("b", json!(2))]));
        assert_eq!(sv.has_template(), Some(false));
    }

    #[test]
    fn test_result_does_not_alias_definitions() {
        let mut sv = ScriptVariables::new(vars(&[("a", json!(1))]));
        let mut rendered = sv.render(&engine(), None).unwrap();
        rendered.insert("a".to_string(), json!(99));

        assert_eq!(sv.as_map().get("a"), Some(&json!(1)));
    }

    #[test]
    fn test_as_map_returns_unevaluated_definitions() {
        let mut sv = ScriptVariables::new(vars(&[("a", json!("{{ 1 }}"))]));
        sv.render(&engine(), None).unwrap();
        sv.render(&engine(), None).unwrap();

        assert_eq!(sv.as_map(), &vars(&[("a", json!("{{ 1 }}"))]));
    }

    #[test]
    fn test_nested_template_values() {
        let mut sv = ScriptVariables::new(vars(&[
            ("base", json!("{{ 10 }}")),
            ("config", json!({"level": "{{ base * 2 }}", "tags": ["{{ base }}", "fixed"]})),
        ]));

        let rendered = sv.render(&engine(), None).unwrap();
        assert_eq!(
            rendered.get("config"),
            Some(&json!({"level": 20, "tags": [10, "fixed"]}))
        );
    }

    #[test]
    fn test_template_syntax_in_variable_name_stays_verbatim() {
        // Variable names are never rendered, so a template-looking name does
        // not trigger the template path
        let mut sv = ScriptVariables::new(vars(&[("{{ name }}", json!(1))]));

        let rendered = sv.render(&engine(), None).unwrap();
        assert_eq!(sv.has_template(), Some(false));
        assert_eq!(rendered, vars(&[("{{ name }}", json!(1))]));
    }

    #[test]
    fn test_templated_key_in_nested_value_is_rendered() {
        let mut sv = ScriptVariables::new(vars(&[
            ("who", json!("{{ 'Bob' | slugify }}")),
            ("data", json!({"{{ who }}": true})),
        ]));

        let rendered = sv.render(&engine(), None).unwrap();
        assert_eq!(sv.has_template(), Some(true));
        assert_eq!(rendered.get("data"), Some(&json!({"bob": true})));
    }

    #[test]
    fn test_serde_round_trip() {
        let sv: ScriptVariables =
            serde_json::from_value(json!({"a": "{{ 1 }}", "b": 2})).unwrap();
        assert_eq!(sv.as_map().len(), 2);
        assert_eq!(sv.has_template(), None);

        let serialized = serde_json::to_value(&sv).unwrap();
        assert_eq!(serialized, json!({"a": "{{ 1 }}", "b": 2}));
    }
}
