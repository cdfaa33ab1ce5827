//! JSON schema for schema-constrained tree generation.

use lucid_core::{ExplanationMode, OutputSchema};
use serde_json::{Value, json};

pub const TREE_SCHEMA_NAME: &str = "explanation_tree";

/// Schema for a whole tree; the layer array is pinned to the mode's
/// layer count.
pub fn tree_schema(mode: ExplanationMode) -> OutputSchema {
    let layers = mode.expected_layers();
    let description = match mode {
        ExplanationMode::Layered => {
            "Topics, concepts and three what/why/how layers per concept, plus a main takeaway"
                .to_string()
        }
        ExplanationMode::Leveled(level) => format!(
            "Topics, concepts and one what/why/how layer per concept written for a {} reader, \
             plus a main takeaway",
            level.label()
        )
    };

    OutputSchema {
        name: TREE_SCHEMA_NAME.to_string(),
        description,
        schema: tree_schema_value(layers),
        strict: true
    }
}

fn tree_schema_value(layers: usize) -> Value {
    let layer = object(json!({
        "what": { "type": "string", "description": "What it is" },
        "why": { "type": "string", "description": "Why it matters" },
        "how": { "type": "string", "description": "How it works" }
    }));

    let concept = object(json!({
        "name": { "type": "string" },
        "layers": {
            "type": "array",
            "items": layer,
            "minItems": layers,
            "maxItems": layers
        }
    }));

    let topic = object(json!({
        "name": { "type": "string" },
        "concepts": { "type": "array", "items": concept, "minItems": 1 }
    }));

    object(json!({
        "topics": { "type": "array", "items": topic, "minItems": 1 },
        "main_takeaway": { "type": "string" }
    }))
}

// Strict structured output needs every property required and no extras.
fn object(properties: Value) -> Value {
    let required: Vec<Value> = properties
        .as_object()
        .map(|props| props.keys().map(|k| Value::String(k.clone())).collect())
        .unwrap_or_default();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false
    })
}
