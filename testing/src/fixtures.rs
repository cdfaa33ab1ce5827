//! Canned documents and oracle payloads.

use serde_json::{Value, json};

pub const PHOTOSYNTHESIS_TEXT: &str = "Photosynthesis is the process by which green plants \
convert light energy into chemical energy. Chlorophyll in the chloroplasts absorbs light, \
which drives the splitting of water and the release of oxygen. The energy captured is stored \
as ATP and NADPH, which the Calvin cycle then uses to fix carbon dioxide into sugars.";

fn layer(what: &str) -> Value {
    json!({
        "what": what,
        "why": format!("Why {what} matters"),
        "how": format!("How {what} works")
    })
}

fn concept(name: &str, layer_count: usize) -> Value {
    let layers: Vec<Value> = (1..=layer_count)
        .map(|i| layer(&format!("{name} layer {i}")))
        .collect();
    json!({ "name": name, "layers": layers })
}

/// Structured-completion payload with two topics.
pub fn structured_tree_value(layer_count: usize) -> Value {
    json!({
        "topics": [
            {
                "name": "Light Reactions",
                "concepts": [
                    concept("Chlorophyll", layer_count),
                    concept("Water Splitting", layer_count)
                ]
            },
            {
                "name": "Calvin Cycle",
                "concepts": [concept("Carbon Fixation", layer_count)]
            }
        ],
        "main_takeaway": "Plants turn light into stored chemical energy."
    })
}

/// Three-layer structured payload.
pub fn layered_tree_value() -> Value {
    structured_tree_value(3)
}

/// Single-layer structured payload.
pub fn leveled_tree_value() -> Value {
    structured_tree_value(1)
}

/// A JSON layer reply as a chained layer call would return it.
pub fn layer_reply(what: &str) -> String {
    layer(what).to_string()
}
