use async_trait::async_trait;
use errors::{DecompositionStage, OracleError, SynthesisError};
use futures_util::{StreamExt, TryStreamExt, stream};
use lucid_core::{
    Concept, EmptyTopicPolicy, ExplanationLayer, ExplanationMode, ExplanationTree, StrategyKind,
    Topic, TreeRules
};
use serde::Deserialize;
use tracing::{Instrument, info, info_span, warn};

use super::{SynthesisOptions, SynthesisStrategy};
use crate::guard::CallGuard;
use crate::normalize::split_names;
use crate::prompts::{LayerDepth, PromptBuilder};
use crate::telemetry::ExplainTelemetry;

/// Topics, then concepts per topic, then layers per concept. One call
/// extracts the topics, one call per topic lists its concepts, and each
/// layer is one call, so a run costs `1 + T + ΣL` calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainedStrategy {
    prompts: PromptBuilder,
    telemetry: ExplainTelemetry
}

impl ChainedStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    async fn topic_branch(
        &self,
        name: String,
        guard: &CallGuard,
        options: &SynthesisOptions
    ) -> Result<Option<Topic>, SynthesisError> {
        let raw = guard.chat(&self.prompts.extract_concepts(&name)).await?;
        let concept_names = split_names(&raw);
        info!("{} concepts found", concept_names.len());

        if concept_names.is_empty() {
            return match options.empty_topic_policy {
                EmptyTopicPolicy::Drop => {
                    warn!(topic = %name, "Dropping topic without concepts");
                    self.telemetry.record_topic_dropped();
                    Ok(None)
                }
                EmptyTopicPolicy::Fail => Err(SynthesisError::empty(
                    DecompositionStage::Concepts,
                    format!("topic '{name}'")
                ))
            };
        }

        let concepts: Vec<Concept> = stream::iter(concept_names)
            .map(|concept| self.concept_branch(concept, guard, options.mode))
            .buffered(options.max_concurrency.max(1))
            .try_collect()
            .await?;

        Ok(Some(Topic { name, concepts }))
    }

    async fn concept_branch(
        &self,
        name: String,
        guard: &CallGuard,
        mode: ExplanationMode
    ) -> Result<Concept, SynthesisError> {
        let layers = match mode {
            ExplanationMode::Leveled(level) => {
                let prompt = self.prompts.generate_leveled_layer(&name, level);
                vec![parse_layer_reply(&guard.chat(&prompt).await?)?]
            }
            ExplanationMode::Layered => {
                let mut layers = Vec::with_capacity(LayerDepth::ALL.len());
                for depth in LayerDepth::ALL {
                    let prompt = self.prompts.generate_layer(&name, depth, &layers);
                    layers.push(parse_layer_reply(&guard.chat(&prompt).await?)?);
                }
                layers
            }
        };

        Ok(Concept { name, layers })
    }
}

#[async_trait]
impl SynthesisStrategy for ChainedStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Chained
    }

    async fn synthesize(
        &self,
        text: &str,
        guard: &CallGuard,
        options: &SynthesisOptions
    ) -> Result<ExplanationTree, SynthesisError> {
        info!("Synthesizing major topics");
        let raw = guard.chat(&self.prompts.extract_topics(text)).await?;
        let topic_names = split_names(&raw);
        info!("{} topics found", topic_names.len());

        if topic_names.is_empty() {
            return Err(SynthesisError::empty(
                DecompositionStage::Topics,
                "the input text"
            ));
        }

        let branches: Vec<Option<Topic>> = stream::iter(topic_names.into_iter().enumerate())
            .map(|(index, name)| {
                let span = info_span!("chained.topic", index, topic = %name);
                self.topic_branch(name, guard, options).instrument(span)
            })
            .buffered(options.max_concurrency.max(1))
            .try_collect()
            .await?;

        let topics: Vec<Topic> = branches.into_iter().flatten().collect();
        if topics.is_empty() {
            return Err(SynthesisError::empty(
                DecompositionStage::Concepts,
                "every extracted topic"
            ));
        }

        let tree = ExplanationTree {
            topics,
            main_takeaway: None
        };
        tree.validate(&TreeRules::chained(options.mode))
            .map_err(|v| OracleError::malformed(format!("assembled tree is invalid: {v}")))?;

        Ok(tree)
    }
}

#[derive(Deserialize)]
struct LayerReply {
    what: String,
    #[serde(default)]
    why: String,
    #[serde(default)]
    how: String
}

/// Reads one layer reply: a `{what, why, how}` object when the oracle
/// followed the format, else the whole text as a plain layer.
pub fn parse_layer_reply(raw: &str) -> Result<ExplanationLayer, OracleError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(OracleError::malformed("layer reply is empty"));
    }

    match serde_json::from_str::<LayerReply>(strip_code_fence(trimmed)) {
        Ok(reply) if reply.what.trim().is_empty() => {
            Err(OracleError::malformed("layer reply has a blank 'what'"))
        }
        Ok(reply) => Ok(ExplanationLayer::new(
            reply.what.trim(),
            reply.why.trim(),
            reply.how.trim()
        )),
        Err(_) => Ok(ExplanationLayer::from_plain(trimmed))
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_reply_becomes_degraded_layer() {
        let layer = parse_layer_reply("  Layer text \n").unwrap();
        assert_eq!(layer, ExplanationLayer::from_plain("Layer text"));
    }

    #[test]
    fn test_json_reply_becomes_triple() {
        let layer =
            parse_layer_reply(r#"{"what": " A ", "why": "B", "how": "C"}"#).unwrap();
        assert_eq!(layer, ExplanationLayer::new("A", "B", "C"));
    }

    #[test]
    fn test_fenced_json_reply() {
        let raw = "```json\n{\"what\": \"A\", \"why\": \"B\", \"how\": \"C\"}\n```";
        assert_eq!(
            parse_layer_reply(raw).unwrap(),
            ExplanationLayer::new("A", "B", "C")
        );
    }

    #[test]
    fn test_empty_reply_is_malformed() {
        assert!(matches!(
            parse_layer_reply("   \n"),
            Err(OracleError::MalformedResponse { .. })
        ));
        assert!(matches!(
            parse_layer_reply(r#"{"what": "  "}"#),
            Err(OracleError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_unrelated_json_is_kept_as_plain_text() {
        let layer = parse_layer_reply(r#"{"summary": "x"}"#).unwrap();
        assert_eq!(layer.what, r#"{"summary": "x"}"#);
        assert!(layer.why.is_empty());
    }

    #[test]
    fn test_strip_code_fence_variants() {
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("{}"), "{}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}"), "{\"a\":1}");
    }
}
