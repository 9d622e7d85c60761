//! Jinja2-compatible template engine for Relay
//!
//! This crate provides the template engine used by Relay scripts and
//! automations, built on minijinja with a few Relay-specific extensions:
//!
//! # Time Functions
//!
//! - `now()` - Current local time (RFC 3339)
//! - `utcnow()` - Current UTC time (RFC 3339)
//! - `as_timestamp(datetime)` - Convert to UNIX timestamp
//!
//! # Filters
//!
//! - `| int` / `| float` / `| bool` - Type conversion
//! - `| slugify` - Convert to slug
//! - `| regex_replace(pattern, replacement)` - Regex substitution
//!
//! # Complex values
//!
//! Script and automation configuration embeds template strings inside
//! arbitrarily nested JSON values. [`is_complex`] detects whether a value
//! contains any template at any depth, and [`render_complex`] resolves
//! every template in a value against a context.
//!
//! # Example
//!
//! ```ignore
//! use relay_template::TemplateEngine;
//!
//! let engine = TemplateEngine::new();
//! let result = engine.render_with_context(
//!     "{{ brightness | int }}",
//!     serde_json::json!({"brightness": "128"}),
//! )?;
//! ```

mod complex;
mod engine;
mod error;
mod filters;
mod globals;

pub use complex::{is_complex, render_complex};
pub use engine::TemplateEngine;
pub use error::{TemplateError, TemplateResult};

// Re-export minijinja Value for convenience
pub use minijinja::Value;
