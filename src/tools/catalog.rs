//! Tool catalog — typed metadata, parameter validation, schema generation.
//!
//! Owns tool *metadata* (not implementations — the dispatcher binds names to
//! client calls). Descriptors advertised through `tools/list` are generated
//! from the same parameter definitions used to validate arguments, so the two
//! cannot drift.

use crate::types::Error;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

/// Tool name: list accounts with balances.
pub const GET_ACCOUNTS: &str = "get_accounts";

/// Tool name: trigger an automation rule.
pub const TRIGGER_RULE: &str = "trigger_rule";

// =============================================================================
// Parameter types
// =============================================================================

/// Parameter type for tool inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    String,
    Object,
    Optional(Box<ParamType>),
}

impl ParamType {
    /// Validate a JSON value against this parameter type.
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        match self {
            ParamType::String => {
                if value.is_string() {
                    Ok(())
                } else {
                    Err(format!("expected string, got {}", value_type_name(value)))
                }
            }
            ParamType::Object => {
                if value.is_object() {
                    Ok(())
                } else {
                    Err(format!("expected object, got {}", value_type_name(value)))
                }
            }
            ParamType::Optional(inner) => {
                if value.is_null() {
                    Ok(())
                } else {
                    inner.validate(value)
                }
            }
        }
    }

    /// JSON-schema `type` keyword for this parameter.
    pub fn schema_type(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Object => "object",
            ParamType::Optional(inner) => inner.schema_type(),
        }
    }
}

fn value_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A value the caller effectively did not supply.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

// =============================================================================
// Parameter definition
// =============================================================================

/// A single parameter definition for a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDef {
    pub name: String,
    pub param_type: ParamType,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ParamDef {
    pub fn required(name: &str, param_type: ParamType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            description: description.to_string(),
            default: None,
        }
    }

    pub fn optional(name: &str, param_type: ParamType, description: &str) -> Self {
        Self::required(name, ParamType::Optional(Box::new(param_type)), description)
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none() && !matches!(self.param_type, ParamType::Optional(_))
    }

    fn to_schema(&self) -> Value {
        let mut schema = json!({
            "type": self.param_type.schema_type(),
            "description": self.description,
        });
        if let (Some(default), Some(map)) = (&self.default, schema.as_object_mut()) {
            map.insert("default".to_string(), default.clone());
        }
        schema
    }
}

// =============================================================================
// Tool entry
// =============================================================================

/// Complete tool metadata entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolEntry {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParamDef>,
}

/// Descriptor advertised for capability discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl ToolEntry {
    /// JSON schema for this tool's argument object.
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| (p.name.clone(), p.to_schema()))
            .collect();
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.is_required())
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    pub fn to_descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema(),
        }
    }
}

// =============================================================================
// Tool catalog
// =============================================================================

/// In-memory tool catalog. Owns metadata, not implementations.
#[derive(Debug, Default)]
pub struct ToolCatalog {
    entries: HashMap<String, ToolEntry>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Catalog with the two Sequence tools registered.
    pub fn sequence() -> crate::types::Result<Self> {
        let mut catalog = Self::new();
        catalog.register(get_accounts_entry())?;
        catalog.register(trigger_rule_entry())?;
        Ok(catalog)
    }

    /// Register a tool entry.
    pub fn register(&mut self, entry: ToolEntry) -> crate::types::Result<()> {
        if entry.name.is_empty() {
            return Err(Error::validation("Tool name cannot be empty"));
        }
        self.entries.insert(entry.name.clone(), entry);
        Ok(())
    }

    /// Get a tool entry by name.
    pub fn get(&self, name: &str) -> Option<&ToolEntry> {
        self.entries.get(name)
    }

    /// Check if a tool exists.
    pub fn has_tool(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// List all tool entries, sorted by name.
    pub fn list_entries(&self) -> Vec<&ToolEntry> {
        let mut entries: Vec<&ToolEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    /// Descriptors for every registered tool, sorted by name.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.list_entries()
            .into_iter()
            .map(ToolEntry::to_descriptor)
            .collect()
    }

    /// Validate arguments against a tool's parameter definitions.
    ///
    /// Returns a list of validation errors in parameter declaration order
    /// (empty = valid). Null and empty-string values count as missing.
    /// Arguments the tool does not declare are ignored, as is the whole
    /// argument value for a tool that declares no parameters.
    pub fn validate_params(&self, name: &str, params: &Value) -> crate::types::Result<Vec<String>> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| Error::validation(format!("Unknown tool: {}", name)))?;

        // A tool without parameters ignores whatever it is handed.
        if entry.parameters.is_empty() {
            return Ok(Vec::new());
        }

        let empty = Map::new();
        let param_map = match params {
            Value::Null => &empty,
            Value::Object(map) => map,
            _ => return Err(Error::validation("Arguments must be a JSON object")),
        };

        let mut errors = Vec::new();
        for param_def in &entry.parameters {
            match param_map.get(&param_def.name) {
                Some(value) if !is_blank(value) => {
                    if let Err(e) = param_def.param_type.validate(value) {
                        errors.push(format!("{} is invalid: {}", param_def.name, e));
                    }
                }
                _ => {
                    if param_def.is_required() {
                        errors.push(format!("{} is required", param_def.name));
                    }
                }
            }
        }

        Ok(errors)
    }

    /// Fill in default values for missing, null or empty optional parameters.
    pub fn fill_defaults(&self, name: &str, params: &mut Value) -> crate::types::Result<()> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| Error::validation(format!("Unknown tool: {}", name)))?;

        if params.is_null() {
            *params = Value::Object(Map::new());
        }
        if let Some(map) = params.as_object_mut() {
            for param_def in &entry.parameters {
                let missing = map.get(&param_def.name).map_or(true, is_blank);
                if missing {
                    if let Some(default) = &param_def.default {
                        map.insert(param_def.name.clone(), default.clone());
                    }
                }
            }
        }

        Ok(())
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Built-in entries
// =============================================================================

fn get_accounts_entry() -> ToolEntry {
    ToolEntry {
        name: GET_ACCOUNTS.to_string(),
        description: "Fetch all financial accounts from Sequence with their current balances. \
            Returns Pods, Income Sources, and external accounts with balance information. \
            Requires the SEQUENCE_ACCESS_TOKEN environment variable."
            .to_string(),
        parameters: Vec::new(),
    }
}

fn trigger_rule_entry() -> ToolEntry {
    ToolEntry {
        name: TRIGGER_RULE.to_string(),
        description: "Trigger an automation rule in Sequence. \
            Rules can automate financial workflows like transfers. \
            Requires the rule ID and its associated API secret."
            .to_string(),
        parameters: vec![
            ParamDef::required(
                "rule_id",
                ParamType::String,
                "The ID of the rule to trigger (e.g., 'ru_12345')",
            ),
            ParamDef::required(
                "api_secret",
                ParamType::String,
                "The API secret associated with this rule",
            ),
            ParamDef::optional(
                "payload",
                ParamType::Object,
                "Optional JSON payload to send with the trigger",
            )
            .with_default(json!({})),
            ParamDef::optional(
                "idempotency_key",
                ParamType::String,
                "Optional key to prevent duplicate triggers on retry",
            ),
        ],
    }
}

// =============================================================================
// Tests
// =============================================================================
