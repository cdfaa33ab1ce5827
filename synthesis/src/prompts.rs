use lucid_core::{ExplanationLayer, ExplanationMode, ReadingLevel};

/// A system/user prompt pair for one oracle call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String
}

/// Depth of one layer in layered mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerDepth {
    Beginner,
    Detailed,
    Technical
}

impl LayerDepth {
    pub const ALL: [LayerDepth; 3] = [
        LayerDepth::Beginner,
        LayerDepth::Detailed,
        LayerDepth::Technical
    ];

    /// 1-based position in the concept's layer sequence.
    pub fn index(self) -> usize {
        match self {
            LayerDepth::Beginner => 1,
            LayerDepth::Detailed => 2,
            LayerDepth::Technical => 3
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.index() == index)
    }

    fn template(self) -> &'static str {
        match self {
            LayerDepth::Beginner => LAYER_BEGINNER_USER,
            LayerDepth::Detailed => LAYER_DETAILED_USER,
            LayerDepth::Technical => LAYER_TECHNICAL_USER
        }
    }
}

const TOPICS_SYSTEM: &str =
    "You are an expert at synthesizing complex information into easily understandable topics.";

const CONCEPTS_SYSTEM: &str =
    "You are an expert at breaking down topics into core concepts for non-expert audiences.";

const LAYER_SYSTEM: &str =
    "You are a knowledgeable tutor explaining complex topics in simple and technical layers.";

const TREE_SYSTEM: &str = "You are a knowledgeable tutor who turns documents into structured, \
layered explanations. You always answer with JSON that matches the provided schema.";

const CARDINALITY_RULE: &str = "Do not assume a fixed number of items. Let the content decide: \
if there is one clear, dominant item give only that one, and if there are several equally \
important ones list them all.";

const LIST_FORMAT_RULE: &str =
    "Put each item on its own line with no numbering, bullets or extra commentary.";

const LAYER_FORMAT_RULE: &str = "Respond with a single JSON object with the string fields \
\"what\" (what it is), \"why\" (why it matters) and \"how\" (how it works), and nothing else.";

const BUILD_ON_PRIOR_RULE: &str = "Build strictly on the earlier layers below. Do not repeat \
anything they already say; only add what is new at this depth.";

const TOPICS_USER: &str = "Analyze the following text and identify its overarching major topics \
in clear, simple language. Keep each topic concise and aimed at a general audience.\n\n\
{cardinality}\n{list_format}\n\nText:\n\n{content}\n";

const CONCEPTS_USER: &str = "For the topic '{topic}', break it down into its simplest major \
concepts, using clear and accessible language. Ensure that these concepts are understandable to \
someone unfamiliar with the field.\n\n{cardinality}\n{list_format}\n";

const LAYER_BEGINNER_USER: &str = "Explain what {concept} is, why it's important, and how it works \
in the simplest terms possible, as if explaining to a complete beginner or non-scientific \
audience.";

const LAYER_DETAILED_USER: &str = "Provide a more detailed explanation of {concept}. Include \
examples, analogies and practical applications to help a general audience understand why it is \
significant and how it works.";

const LAYER_TECHNICAL_USER: &str = "Give a thorough, technical explanation of {concept}, including \
its terminology, components, importance, and real-world technical implications. This explanation \
should be suitable for someone with more advanced knowledge of the subject.";

const LEVELED_USER: &str = "Explain what {concept} is, why it's important, and how it works for \
the following reader. Match their age and vocabulary band exactly in sentence length, word \
choice and depth.\n\nReader: {level_description}";

const TREE_USER: &str = "Break the following text down into its major topics, break each topic \
into its major concepts, and explain every concept. {cardinality}\n\n{layer_rule}\n\nFinish with \
\"main_takeaway\": one sentence that captures the most important idea of the whole text.\n\n\
Text:\n\n{content}\n";

const TREE_LAYERED_RULE: &str = "Give every concept exactly three layers, each with what, why \
and how. Layer 1 is a beginner-accessible explanation in plain language. Layer 2 adds concrete \
examples, analogies and practical applications. Layer 3 adds technical depth: terminology, \
components and real-world technical implications. Each layer builds strictly on the previous one \
without repeating it.";

const TREE_LEVELED_RULE: &str = "Give every concept exactly one layer with what, why and how, \
written for the following reader and matching their age and vocabulary band exactly.\n\n\
Reader: {level_description}";

/// Builds the prompts for every synthesis stage. Pure; holds no state.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn extract_topics(&self, text: &str) -> Prompt {
        Prompt {
            system: TOPICS_SYSTEM.to_string(),
            user: fill_list_rules(TOPICS_USER).replace("{content}", text)
        }
    }

    pub fn extract_concepts(&self, topic: &str) -> Prompt {
        Prompt {
            system: CONCEPTS_SYSTEM.to_string(),
            user: fill_list_rules(CONCEPTS_USER).replace("{topic}", topic)
        }
    }

    /// Layer prompt for `depth`; `prior` holds the concept's already
    /// generated shallower layers, in order.
    pub fn generate_layer(
        &self,
        concept: &str,
        depth: LayerDepth,
        prior: &[ExplanationLayer]
    ) -> Prompt {
        let mut user = depth.template().replace("{concept}", concept);

        if !prior.is_empty() {
            user.push_str("\n\n");
            user.push_str(BUILD_ON_PRIOR_RULE);
            for (i, layer) in prior.iter().enumerate() {
                user.push_str(&format!("\n\nLayer {}:\n{}", i + 1, render_layer(layer)));
            }
        }

        user.push_str("\n\n");
        user.push_str(LAYER_FORMAT_RULE);

        Prompt {
            system: LAYER_SYSTEM.to_string(),
            user
        }
    }

    pub fn generate_leveled_layer(&self, concept: &str, level: ReadingLevel) -> Prompt {
        let user = format!(
            "{}\n\n{}",
            LEVELED_USER
                .replace("{concept}", concept)
                .replace("{level_description}", level.description()),
            LAYER_FORMAT_RULE
        );

        Prompt {
            system: LAYER_SYSTEM.to_string(),
            user
        }
    }

    pub fn generate_structured_tree(&self, text: &str, mode: ExplanationMode) -> Prompt {
        let layer_rule = match mode {
            ExplanationMode::Layered => TREE_LAYERED_RULE.to_string(),
            ExplanationMode::Leveled(level) => {
                TREE_LEVELED_RULE.replace("{level_description}", level.description())
            }
        };

        Prompt {
            system: TREE_SYSTEM.to_string(),
            user: TREE_USER
                .replace("{cardinality}", CARDINALITY_RULE)
                .replace("{layer_rule}", &layer_rule)
                .replace("{content}", text)
        }
    }
}

fn fill_list_rules(template: &str) -> String {
    template
        .replace("{cardinality}", CARDINALITY_RULE)
        .replace("{list_format}", LIST_FORMAT_RULE)
}

fn render_layer(layer: &ExplanationLayer) -> String {
    let mut out = format!("What: {}", layer.what);
    if !layer.why.is_empty() {
        out.push_str(&format!("\nWhy: {}", layer.why));
    }
    if !layer.how.is_empty() {
        out.push_str(&format!("\nHow: {}", layer.how));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_prompt_embeds_text_and_cardinality() {
        let prompt = PromptBuilder::new().extract_topics("The mitochondria is the powerhouse.");

        assert!(prompt.system.contains("synthesizing complex information"));
        assert!(prompt.user.contains("The mitochondria is the powerhouse."));
        assert!(prompt.user.contains("Do not assume a fixed number"));
        assert!(prompt.user.contains("own line"));
        assert!(!prompt.user.contains('{'));
    }

    #[test]
    fn test_concept_prompt_names_topic() {
        let prompt = PromptBuilder::new().extract_concepts("Cell Biology");

        assert!(prompt.system.contains("core concepts"));
        assert!(prompt.user.contains("'Cell Biology'"));
        assert!(prompt.user.contains("Let the content decide"));
    }

    #[test]
    fn test_layer_depths_differ() {
        let builder = PromptBuilder::new();
        let beginner = builder.generate_layer("ATP", LayerDepth::Beginner, &[]);
        let detailed = builder.generate_layer("ATP", LayerDepth::Detailed, &[]);
        let technical = builder.generate_layer("ATP", LayerDepth::Technical, &[]);

        assert!(beginner.user.contains("complete beginner"));
        assert!(detailed.user.contains("examples"));
        assert!(technical.user.contains("technical"));
        assert!(technical.user.contains("components"));
        for prompt in [&beginner, &detailed, &technical] {
            assert!(prompt.user.contains("\"what\""));
            assert_eq!(prompt.system, LAYER_SYSTEM);
        }
    }

    #[test]
    fn test_first_layer_has_no_prior_section() {
        let prompt = PromptBuilder::new().generate_layer("ATP", LayerDepth::Beginner, &[]);
        assert!(!prompt.user.contains("Do not repeat"));
    }

    #[test]
    fn test_later_layers_embed_prior_layers() {
        let prior = vec![
            ExplanationLayer::new("Energy coin", "Cells spend it", "Phosphate bonds"),
            ExplanationLayer::from_plain("Like a rechargeable battery")
        ];
        let prompt = PromptBuilder::new().generate_layer("ATP", LayerDepth::Technical, &prior);

        assert!(prompt.user.contains("Do not repeat"));
        assert!(prompt.user.contains("Layer 1:\nWhat: Energy coin\nWhy: Cells spend it"));
        assert!(prompt.user.contains("Layer 2:\nWhat: Like a rechargeable battery"));
        assert!(!prompt.user.contains("Layer 2:\nWhat: Like a rechargeable battery\nWhy"));
    }

    #[test]
    fn test_leveled_prompt_injects_description_verbatim() {
        for level in ReadingLevel::ALL {
            let prompt = PromptBuilder::new().generate_leveled_layer("Gravity", level);
            assert!(prompt.user.contains(level.description()));
            assert!(prompt.user.contains("Gravity"));
        }
    }

    #[test]
    fn test_structured_prompt_by_mode() {
        let builder = PromptBuilder::new();

        let layered = builder.generate_structured_tree("Some text", ExplanationMode::Layered);
        assert!(layered.user.contains("exactly three layers"));
        assert!(layered.user.contains("main_takeaway"));
        assert!(layered.user.contains("Some text"));
        assert!(layered.user.contains("Let the content decide"));

        let leveled = builder
            .generate_structured_tree("Some text", ExplanationMode::Leveled(ReadingLevel::K6));
        assert!(leveled.user.contains("exactly one layer"));
        assert!(leveled.user.contains(ReadingLevel::K6.description()));
        assert!(!leveled.user.contains("{level_description}"));
    }

    #[test]
    fn test_layer_depth_index_round_trip() {
        for depth in LayerDepth::ALL {
            assert_eq!(LayerDepth::from_index(depth.index()), Some(depth));
        }
        assert_eq!(LayerDepth::from_index(0), None);
        assert_eq!(LayerDepth::from_index(4), None);
    }
}
