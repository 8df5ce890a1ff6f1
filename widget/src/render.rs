use serde_json::Value;
use shared::substitute::substitute;
use std::collections::HashMap;

/// Tile markup with `:field:` tokens substituted from a payload's top-level
/// fields. The markup source is trusted configuration; substitution is blind
/// string replacement, same scheme as DAO URL assembly.
#[derive(Debug, Clone)]
pub struct Template {
    raw: String,
}

impl Template {
    pub fn new(raw: impl Into<String>) -> Self {
        Template { raw: raw.into() }
    }

    /// Renders with the given payload, or returns the markup unchanged when
    /// no data is given.
    pub fn render(&self, data: Option<&Value>) -> String {
        let Some(fields) = data.and_then(Value::as_object) else {
            return self.raw.clone();
        };

        let params: HashMap<String, String> = fields
            .iter()
            .map(|(name, value)| (name.clone(), field_to_string(value)))
            .collect();

        substitute(&self.raw, &params)
    }
}

fn field_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
