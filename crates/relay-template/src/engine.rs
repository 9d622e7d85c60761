//! Template engine for Relay
//!
//! Provides Jinja2-compatible template rendering with Relay-specific
//! functions and filters.

use crate::error::TemplateResult;
use crate::filters;
use crate::globals;
use minijinja::Environment;
use tracing::debug;

/// Template engine with Relay extensions
///
/// The engine provides:
/// - Time functions like `now()`, `utcnow()`, `as_timestamp()`
/// - Filters like `int`, `float`, `bool`, `slugify`, `regex_replace`
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine
    pub fn new() -> Self {
        let mut env = Environment::new();

        // Configure environment
        env.set_debug(true);

        // Register filters
        Self::register_filters(&mut env);

        // Register global functions
        Self::register_globals(&mut env);

        // Register tests
        Self::register_tests(&mut env);

        Self { env }
    }

    fn register_filters(env: &mut Environment<'static>) {
        // String filters
        env.add_filter("slugify", filters::slugify);
        env.add_filter("regex_replace", filters::regex_replace);

        // Type conversion
        env.add_filter("float", filters::to_float);
        env.add_filter("int", filters::to_int);
        env.add_filter("bool", filters::to_bool);

        // Type checking
        env.add_filter("is_number", filters::is_number);
        env.add_filter("is_string", filters::is_string);
    }

    fn register_globals(env: &mut Environment<'static>) {
        // Time functions
        env.add_function("now", globals::now);
        env.add_function("utcnow", globals::utcnow);
        env.add_function("as_timestamp", globals::as_timestamp);

        // Utility functions
        env.add_function("iif", globals::iif);
    }

    fn register_tests(env: &mut Environment<'static>) {
        env.add_test("number", filters::is_number);
        env.add_test("string", filters::is_string);
        env.add_test("defined", filters::is_defined);
    }

    /// Render a template string
    pub fn render(&self, template: &str) -> TemplateResult<String> {
        debug!("Rendering template: {}", template);

        let tmpl = self.env.template_from_str(template)?;
        let result = tmpl.render(())?;

        Ok(result)
    }

    /// Render a template with additional context variables
    pub fn render_with_context(
        &self,
        template: &str,
        context: impl serde::Serialize,
    ) -> TemplateResult<String> {
        let tmpl = self.env.template_from_str(template)?;
        let result = tmpl.render(context)?;
        Ok(result)
    }

    /// Check if a template string contains template syntax
    pub fn is_template(template: &str) -> bool {
        template.contains("{{") || template.contains("{%") || template.contains("{#")
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}
