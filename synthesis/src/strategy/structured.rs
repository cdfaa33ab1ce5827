use async_trait::async_trait;
use errors::{OracleError, SynthesisError};
use lucid_core::{ExplanationTree, StrategyKind, TreeRules};
use tracing::info;

use super::{SynthesisOptions, SynthesisStrategy};
use crate::guard::CallGuard;
use crate::prompts::PromptBuilder;
use crate::schema::tree_schema;

/// The whole tree in one schema-constrained call. The reply is
/// re-validated even though the oracle promises schema conformance.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredStrategy {
    prompts: PromptBuilder
}

impl StructuredStrategy {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SynthesisStrategy for StructuredStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Structured
    }

    async fn synthesize(
        &self,
        text: &str,
        guard: &CallGuard,
        options: &SynthesisOptions
    ) -> Result<ExplanationTree, SynthesisError> {
        let prompt = self.prompts.generate_structured_tree(text, options.mode);
        let schema = tree_schema(options.mode);

        let value = guard.structured(&prompt, &schema).await?;
        let tree = into_tree(value, options)?;

        info!(
            topics = tree.topics.len(),
            concepts = tree.concept_count(),
            "Structured tree received"
        );
        Ok(tree)
    }
}

fn into_tree(
    value: serde_json::Value,
    options: &SynthesisOptions
) -> Result<ExplanationTree, OracleError> {
    let tree: ExplanationTree = serde_json::from_value(value)
        .map_err(|e| OracleError::malformed(format!("structured reply is not a tree: {e}")))?;

    tree.validate(&TreeRules::structured(options.mode))
        .map_err(|v| OracleError::malformed(format!("structured reply violates the tree shape: {v}")))?;

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lucid_core::{ExplanationMode, ReadingLevel};
    use serde_json::json;
    use testing::{layered_tree_value, leveled_tree_value};

    fn options(mode: ExplanationMode) -> SynthesisOptions {
        SynthesisOptions::new(mode)
    }

    #[test]
    fn test_valid_layered_reply() {
        let tree = into_tree(layered_tree_value(), &options(ExplanationMode::Layered)).unwrap();
        assert_eq!(tree.topics.len(), 2);
        assert_eq!(tree.layer_count(), 9);
        assert!(tree.main_takeaway.is_some());
    }

    #[test]
    fn test_layer_count_must_match_mode() {
        let leveled = ExplanationMode::Leveled(ReadingLevel::K3);
        assert!(into_tree(leveled_tree_value(), &options(leveled)).is_ok());

        let err = into_tree(layered_tree_value(), &options(leveled)).unwrap_err();
        assert!(matches!(err, OracleError::MalformedResponse { ref reason } if reason.contains("layers")));
    }

    #[test]
    fn test_missing_takeaway_is_malformed() {
        let mut value = layered_tree_value();
        value["main_takeaway"] = json!("   ");
        let err = into_tree(value, &options(ExplanationMode::Layered)).unwrap_err();
        assert!(matches!(err, OracleError::MalformedResponse { ref reason } if reason.contains("main_takeaway")));
    }

    #[test]
    fn test_plain_layers_are_rejected() {
        let value = json!({
            "topics": [{
                "name": "T",
                "concepts": [{ "name": "C", "layers": ["just text"] }]
            }],
            "main_takeaway": "x"
        });
        let leveled = ExplanationMode::Leveled(ReadingLevel::College);
        let err = into_tree(value, &options(leveled)).unwrap_err();
        assert!(matches!(err, OracleError::MalformedResponse { .. }));
    }

    #[test]
    fn test_wrong_shape_is_malformed() {
        let err = into_tree(json!({ "topics": "nope" }), &options(ExplanationMode::Layered))
            .unwrap_err();
        assert!(matches!(err, OracleError::MalformedResponse { .. }));
    }
}
