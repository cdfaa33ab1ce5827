use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Audience band that parameterizes prose depth without changing tree shape.
///
/// Wire names are the labels shown to readers ("Basic", "Middle School",
/// ...). Parsing, including deserialization, also accepts the grade codes
/// and ignores case.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumString,
    Display,
)]
#[serde(try_from = "String")]
#[strum(ascii_case_insensitive)]
pub enum ReadingLevel {
    #[serde(rename = "Basic")]
    #[strum(serialize = "K3", to_string = "Basic")]
    K3,
    #[serde(rename = "Elementary")]
    #[strum(serialize = "K6", to_string = "Elementary")]
    K6,
    #[serde(rename = "Middle School")]
    #[strum(serialize = "K9", to_string = "Middle School")]
    K9,
    #[serde(rename = "High School")]
    #[strum(serialize = "K12", to_string = "High School")]
    K12,
    #[default]
    #[serde(rename = "College")]
    #[strum(serialize = "College")]
    College,
    #[serde(rename = "Graduate")]
    #[strum(serialize = "Graduate")]
    Graduate
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Unknown reading level '{input}': expected one of Basic, Elementary, Middle School, High \
     School, College, Graduate (or K3, K6, K9, K12)"
)]
pub struct ParseReadingLevelError {
    pub input: String
}

impl TryFrom<String> for ReadingLevel {
    type Error = ParseReadingLevelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ReadingLevel::parse(&value)
    }
}

impl ReadingLevel {
    pub const ALL: [ReadingLevel; 6] = [
        ReadingLevel::K3,
        ReadingLevel::K6,
        ReadingLevel::K9,
        ReadingLevel::K12,
        ReadingLevel::College,
        ReadingLevel::Graduate
    ];

    pub fn parse(input: &str) -> Result<Self, ParseReadingLevelError> {
        input
            .trim()
            .parse::<ReadingLevel>()
            .map_err(|_| ParseReadingLevelError {
                input: input.to_string()
            })
    }

    pub fn label(self) -> &'static str {
        match self {
            ReadingLevel::K3 => "Basic",
            ReadingLevel::K6 => "Elementary",
            ReadingLevel::K9 => "Middle School",
            ReadingLevel::K12 => "High School",
            ReadingLevel::College => "College",
            ReadingLevel::Graduate => "Graduate"
        }
    }

    pub fn grade_code(self) -> &'static str {
        match self {
            ReadingLevel::K3 => "K3",
            ReadingLevel::K6 => "K6",
            ReadingLevel::K9 => "K9",
            ReadingLevel::K12 => "K12",
            ReadingLevel::College => "College",
            ReadingLevel::Graduate => "Graduate"
        }
    }

    pub fn age_range(self) -> &'static str {
        match self {
            ReadingLevel::K3 => "ages 8-9",
            ReadingLevel::K6 => "ages 11-12",
            ReadingLevel::K9 => "ages 14-15",
            ReadingLevel::K12 => "ages 17-18",
            ReadingLevel::College => "ages 18-22",
            ReadingLevel::Graduate => "ages 22 and up"
        }
    }

    /// Audience description injected verbatim into prompts.
    pub fn description(self) -> &'static str {
        match self {
            ReadingLevel::K3 => K3_DESCRIPTION,
            ReadingLevel::K6 => K6_DESCRIPTION,
            ReadingLevel::K9 => K9_DESCRIPTION,
            ReadingLevel::K12 => K12_DESCRIPTION,
            ReadingLevel::College => COLLEGE_DESCRIPTION,
            ReadingLevel::Graduate => GRADUATE_DESCRIPTION
        }
    }
}

const K3_DESCRIPTION: &str = "\
Third grade reader (ages 8-9). Use short sentences, everyday words and familiar examples from \
home and school. Avoid jargon entirely. Example of the expected style: \"Plants need sunlight to \
make their own food. The green parts of a leaf catch the light, a bit like a tiny solar panel.\"";

const K6_DESCRIPTION: &str = "\
Sixth grade reader (ages 11-12). Use clear sentences and common vocabulary; introduce at most a \
few new terms and define each one right away. Example of the expected style: \"Photosynthesis is \
how plants turn sunlight, water and carbon dioxide into sugar. Chlorophyll, the green pigment in \
leaves, is what captures the light.\"";

const K9_DESCRIPTION: &str = "\
Ninth grade reader (ages 14-15). Use moderately complex sentences and basic subject vocabulary, \
connecting ideas with cause and effect. Example of the expected style: \"During photosynthesis, \
chloroplasts convert light energy into chemical energy stored in glucose, releasing oxygen as a \
by-product.\"";

const K12_DESCRIPTION: &str = "\
Twelfth grade reader (ages 17-18). Use the vocabulary of an introductory textbook and explain \
mechanisms step by step. Example of the expected style: \"The light-dependent reactions in the \
thylakoid membranes produce ATP and NADPH, which the Calvin cycle then uses to fix carbon dioxide \
into sugars.\"";

const COLLEGE_DESCRIPTION: &str = "\
Undergraduate reader (ages 18-22). Use precise disciplinary terminology, quantitative detail \
where it helps, and connections to related concepts. Example of the expected style: \"Photosystem \
II oxidizes water to replenish electrons lost to the electron transport chain, establishing the \
proton gradient that drives ATP synthase.\"";

const GRADUATE_DESCRIPTION: &str = "\
Graduate or professional reader (ages 22 and up). Assume fluency with the field; discuss \
mechanisms, assumptions, limitations and open research questions concisely. Example of the \
expected style: \"Non-photochemical quenching dissipates excess excitation energy via the \
xanthophyll cycle, trading quantum yield for protection against photo-oxidative damage under \
fluctuating irradiance.\"";

/// How many layers each concept carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExplanationMode {
    /// Beginner, detailed and technical layers.
    Layered,
    /// A single layer pitched at one reading level.
    Leveled(ReadingLevel)
}

impl ExplanationMode {
    pub fn from_flags(leveled: bool, reading_level: ReadingLevel) -> Self {
        if leveled {
            ExplanationMode::Leveled(reading_level)
        } else {
            ExplanationMode::Layered
        }
    }

    pub fn expected_layers(self) -> usize {
        match self {
            ExplanationMode::Layered => 3,
            ExplanationMode::Leveled(_) => 1
        }
    }

    pub fn reading_level(self) -> Option<ReadingLevel> {
        match self {
            ExplanationMode::Layered => None,
            ExplanationMode::Leveled(level) => Some(level)
        }
    }
}

/// Which synthesis architecture builds the tree.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StrategyKind {
    /// Topic, concept and layer calls issued one stage after another.
    Chained,
    /// One schema-constrained call per document.
    #[default]
    Structured
}

/// What to do with a topic whose concept extraction came back empty.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EmptyTopicPolicy {
    #[default]
    Drop,
    Fail
}

/// One What/Why/How explanation unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "crate::wire::RawLayer")]
pub struct ExplanationLayer {
    pub what: String,
    pub why: String,
    pub how: String
}

impl ExplanationLayer {
    pub fn new(what: impl Into<String>, why: impl Into<String>, how: impl Into<String>) -> Self {
        Self {
            what: what.into(),
            why: why.into(),
            how: how.into()
        }
    }

    /// Normalizes a single opaque text into a layer.
    pub fn from_plain(text: impl Into<String>) -> Self {
        Self {
            what: text.into(),
            why: String::new(),
            how: String::new()
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.what.trim().is_empty() && !self.why.trim().is_empty() && !self.how.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Concept {
    #[serde(alias = "concept")]
    pub name: String,
    pub layers: Vec<ExplanationLayer>
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Topic {
    #[serde(alias = "topic")]
    pub name: String,
    pub concepts: Vec<Concept>
}

/// Root of a synthesized explanation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "crate::wire::RawTree")]
pub struct ExplanationTree {
    pub topics: Vec<Topic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_takeaway: Option<String>
}

impl ExplanationTree {
    pub fn concept_count(&self) -> usize {
        self.topics.iter().map(|t| t.concepts.len()).sum()
    }

    pub fn layer_count(&self) -> usize {
        self.topics
            .iter()
            .flat_map(|t| t.concepts.iter())
            .map(|c| c.layers.len())
            .sum()
    }

    /// Checks the structural invariants for a tree built under `rules`.
    pub fn validate(&self, rules: &TreeRules) -> Result<(), TreeViolation> {
        if self.topics.is_empty() {
            return Err(TreeViolation::new("topics", "tree has no topics"));
        }

        for (ti, topic) in self.topics.iter().enumerate() {
            let topic_path = format!("topics[{ti}]");
            if topic.name.trim().is_empty() {
                return Err(TreeViolation::new(format!("{topic_path}.name"), "blank name"));
            }
            if topic.concepts.is_empty() {
                return Err(TreeViolation::new(
                    format!("{topic_path}.concepts"),
                    "topic has no concepts"
                ));
            }

            for (ci, concept) in topic.concepts.iter().enumerate() {
                let concept_path = format!("{topic_path}.concepts[{ci}]");
                if concept.name.trim().is_empty() {
                    return Err(TreeViolation::new(format!("{concept_path}.name"), "blank name"));
                }
                if concept.layers.len() != rules.layers_per_concept {
                    return Err(TreeViolation::new(
                        format!("{concept_path}.layers"),
                        format!(
                            "expected {} layer(s), found {}",
                            rules.layers_per_concept,
                            concept.layers.len()
                        )
                    ));
                }

                for (li, layer) in concept.layers.iter().enumerate() {
                    let layer_path = format!("{concept_path}.layers[{li}]");
                    if layer.what.trim().is_empty() {
                        return Err(TreeViolation::new(format!("{layer_path}.what"), "blank text"));
                    }
                    if rules.require_complete_layers && !layer.is_complete() {
                        return Err(TreeViolation::new(
                            layer_path,
                            "what, why and how must all be present"
                        ));
                    }
                }
            }
        }

        if rules.require_takeaway
            && self
                .main_takeaway
                .as_deref()
                .is_none_or(|t| t.trim().is_empty())
        {
            return Err(TreeViolation::new("main_takeaway", "missing main takeaway"));
        }

        Ok(())
    }
}

/// Structural expectations a finished tree must meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeRules {
    pub layers_per_concept: usize,
    pub require_complete_layers: bool,
    pub require_takeaway: bool
}

impl TreeRules {
    /// Chained output: degraded plain layers allowed, no takeaway.
    pub fn chained(mode: ExplanationMode) -> Self {
        Self {
            layers_per_concept: mode.expected_layers(),
            require_complete_layers: false,
            require_takeaway: false
        }
    }

    /// Schema-constrained output: full triples and a takeaway.
    pub fn structured(mode: ExplanationMode) -> Self {
        Self {
            layers_per_concept: mode.expected_layers(),
            require_complete_layers: true,
            require_takeaway: true
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{path}: {problem}")]
pub struct TreeViolation {
    pub path: String,
    pub problem: String
}

impl TreeViolation {
    pub fn new(path: impl Into<String>, problem: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            problem: problem.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(text: &str) -> ExplanationLayer {
        ExplanationLayer::new(text, format!("why {text}"), format!("how {text}"))
    }

    fn tree(layers_per_concept: usize, takeaway: Option<&str>) -> ExplanationTree {
        ExplanationTree {
            topics: vec![Topic {
                name: "Photosynthesis".to_string(),
                concepts: vec![Concept {
                    name: "Chlorophyll".to_string(),
                    layers: (0..layers_per_concept)
                        .map(|i| layer(&format!("layer {i}")))
                        .collect()
                }]
            }],
            main_takeaway: takeaway.map(String::from)
        }
    }

    #[test]
    fn test_reading_level_parse_accepts_labels_and_codes() {
        assert_eq!(ReadingLevel::parse("Basic").unwrap(), ReadingLevel::K3);
        assert_eq!(ReadingLevel::parse("k3").unwrap(), ReadingLevel::K3);
        assert_eq!(
            ReadingLevel::parse("middle school").unwrap(),
            ReadingLevel::K9
        );
        assert_eq!(ReadingLevel::parse(" K12 ").unwrap(), ReadingLevel::K12);
        assert_eq!(
            ReadingLevel::parse("Graduate").unwrap(),
            ReadingLevel::Graduate
        );

        let err = ReadingLevel::parse("PhD").unwrap_err();
        assert_eq!(err.input, "PhD");
    }

    #[test]
    fn test_reading_level_display_and_serde_use_labels() {
        assert_eq!(ReadingLevel::K9.to_string(), "Middle School");
        assert_eq!(
            serde_json::to_string(&ReadingLevel::K12).unwrap(),
            "\"High School\""
        );
        let parsed: ReadingLevel = serde_json::from_str("\"K6\"").unwrap();
        assert_eq!(parsed, ReadingLevel::K6);
    }

    #[test]
    fn test_reading_level_deserialize_ignores_case() {
        for (raw, expected) in [
            ("\"college\"", ReadingLevel::College),
            ("\"high school\"", ReadingLevel::K12),
            ("\" k3 \"", ReadingLevel::K3),
            ("\"GRADUATE\"", ReadingLevel::Graduate)
        ] {
            let parsed: ReadingLevel = serde_json::from_str(raw).unwrap();
            assert_eq!(parsed, expected);
        }

        let err = serde_json::from_str::<ReadingLevel>("\"Toddler\"").unwrap_err();
        assert!(err.to_string().contains("Toddler"));
    }

    #[test]
    fn test_reading_level_descriptions_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for level in ReadingLevel::ALL {
            assert!(level.description().contains(level.age_range()));
            assert!(seen.insert(level.description()));
        }
        assert_eq!(ReadingLevel::default(), ReadingLevel::College);
    }

    #[test]
    fn test_mode_layer_counts() {
        assert_eq!(ExplanationMode::Layered.expected_layers(), 3);
        assert_eq!(
            ExplanationMode::from_flags(true, ReadingLevel::K6).expected_layers(),
            1
        );
        assert_eq!(
            ExplanationMode::from_flags(false, ReadingLevel::K6),
            ExplanationMode::Layered
        );
    }

    #[test]
    fn test_strategy_kind_parse() {
        assert_eq!(
            "chained".parse::<StrategyKind>().unwrap(),
            StrategyKind::Chained
        );
        assert_eq!(
            "Structured".parse::<StrategyKind>().unwrap(),
            StrategyKind::Structured
        );
        assert_eq!(StrategyKind::Chained.to_string(), "chained");
    }

    #[test]
    fn test_validate_accepts_well_formed_trees() {
        let layered = tree(3, Some("Plants run on light."));
        assert!(
            layered
                .validate(&TreeRules::structured(ExplanationMode::Layered))
                .is_ok()
        );

        let leveled = tree(1, None);
        let mode = ExplanationMode::Leveled(ReadingLevel::K3);
        assert!(leveled.validate(&TreeRules::chained(mode)).is_ok());
        assert_eq!(leveled.layer_count(), 1);
        assert_eq!(leveled.concept_count(), 1);
    }

    #[test]
    fn test_validate_rejects_wrong_layer_count() {
        let two = tree(2, Some("x"));
        let err = two
            .validate(&TreeRules::structured(ExplanationMode::Layered))
            .unwrap_err();
        assert_eq!(err.path, "topics[0].concepts[0].layers");
        assert!(err.problem.contains("expected 3"));
    }

    #[test]
    fn test_validate_rejects_empty_structures() {
        let rules = TreeRules::chained(ExplanationMode::Layered);

        let empty = ExplanationTree {
            topics: vec![],
            main_takeaway: None
        };
        assert_eq!(empty.validate(&rules).unwrap_err().path, "topics");

        let mut no_concepts = tree(3, None);
        no_concepts.topics[0].concepts.clear();
        assert_eq!(
            no_concepts.validate(&rules).unwrap_err().path,
            "topics[0].concepts"
        );
    }

    #[test]
    fn test_structured_rules_require_takeaway_and_full_layers() {
        let rules = TreeRules::structured(ExplanationMode::Layered);

        let missing = tree(3, None);
        assert_eq!(missing.validate(&rules).unwrap_err().path, "main_takeaway");

        let blank = tree(3, Some("   "));
        assert_eq!(blank.validate(&rules).unwrap_err().path, "main_takeaway");

        let mut degraded = tree(3, Some("ok"));
        degraded.topics[0].concepts[0].layers[1] = ExplanationLayer::from_plain("only what");
        let err = degraded.validate(&rules).unwrap_err();
        assert_eq!(err.path, "topics[0].concepts[0].layers[1]");

        assert!(
            degraded
                .validate(&TreeRules::chained(ExplanationMode::Layered))
                .is_ok()
        );
    }
}
