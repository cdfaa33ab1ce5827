//! Accepted input shapes for explanation trees.
//!
//! Older producers emitted layers as bare strings, as `{"layer_1": text}`
//! maps, or as `{layer_name, explanation}` records, and trees as a bare
//! list of topics or under an `explanations` key. All of them are folded
//! into the canonical types here so nothing downstream sees them.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::{ExplanationLayer, ExplanationTree, Topic};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawLayer {
    Plain(String),
    Triple {
        what: String,
        #[serde(default)]
        why: String,
        #[serde(default)]
        how: String
    },
    Named {
        explanation: String
    },
    Keyed(BTreeMap<String, String>)
}

impl TryFrom<RawLayer> for ExplanationLayer {
    type Error = String;

    fn try_from(raw: RawLayer) -> Result<Self, Self::Error> {
        match raw {
            RawLayer::Plain(text) => Ok(ExplanationLayer::from_plain(text)),
            RawLayer::Triple { what, why, how } => Ok(ExplanationLayer { what, why, how }),
            RawLayer::Named { explanation, .. } => Ok(ExplanationLayer::from_plain(explanation)),
            RawLayer::Keyed(map) => {
                let mut values = map.into_values();
                match (values.next(), values.next()) {
                    (Some(text), None) => Ok(ExplanationLayer::from_plain(text)),
                    (None, _) => Err("layer object is empty".to_string()),
                    (Some(_), Some(_)) => Err(
                        "layer object must have what/why/how fields or a single keyed text"
                            .to_string()
                    )
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawTree {
    Canonical {
        #[serde(alias = "explanations")]
        topics: Vec<Topic>,
        #[serde(default)]
        main_takeaway: Option<String>
    },
    Bare(Vec<Topic>)
}

impl From<RawTree> for ExplanationTree {
    fn from(raw: RawTree) -> Self {
        match raw {
            RawTree::Canonical {
                topics,
                main_takeaway
            } => ExplanationTree {
                topics,
                main_takeaway
            },
            RawTree::Bare(topics) => ExplanationTree {
                topics,
                main_takeaway: None
            }
        }
    }
}
