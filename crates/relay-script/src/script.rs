//! Script definition
//!
//! A Script is a named sequence of actions with a block of static variables
//! that is rendered once per run.

use crate::variables::{ScriptVariables, Variables, VariablesResult};
use relay_template::TemplateEngine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Script execution mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScriptMode {
    /// Default - ignore new calls while running
    #[default]
    Single,

    /// Restart from beginning on new call
    Restart,

    /// Queue calls (up to max)
    Queued,

    /// Run all simultaneously (up to max)
    Parallel,
}

/// Script configuration from YAML/JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptConfig {
    /// Script alias (human-readable name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Execution mode
    #[serde(default)]
    pub mode: ScriptMode,

    /// Static variables, rendered per run
    #[serde(default)]
    pub variables: ScriptVariables,

    /// Action sequence (raw JSON)
    pub sequence: Vec<serde_json::Value>,
}

/// A loaded script
#[derive(Debug, Clone)]
pub struct Script {
    /// Script ID (e.g., "turn_on_lights")
    pub id: String,

    /// Human-readable name
    pub alias: Option<String>,

    /// Description
    pub description: Option<String>,

    /// Execution mode
    pub mode: ScriptMode,

    /// Static variables
    pub variables: ScriptVariables,

    /// Action sequence (raw JSON)
    pub sequence: Vec<serde_json::Value>,
}

impl Script {
    /// Create from config
    pub fn from_config(id: impl Into<String>, config: ScriptConfig) -> Self {
        Self {
            id: id.into(),
            alias: config.alias,
            description: config.description,
            mode: config.mode,
            variables: config.variables,
            sequence: config.sequence,
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.id)
    }

    /// Render this script's variables for one run
    pub fn render_variables(
        &mut self,
        engine: &Arc<TemplateEngine>,
        run_variables: Option<&Variables>,
    ) -> VariablesResult<Variables> {
        self.variables.render(engine, run_variables)
    }
}
