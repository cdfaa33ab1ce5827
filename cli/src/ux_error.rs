use colored::Colorize;
use errors::{ErrorKind, ExplainError};
use lucid_core::ReadingLevel;

#[derive(Debug)]
pub struct UxError {
    pub what: String,
    pub why: Option<String>,
    pub how_to_fix: Vec<String>,
    pub suggested_command: Option<String>
}

impl UxError {
    pub fn new(what: impl Into<String>) -> Self {
        Self {
            what: what.into(),
            why: None,
            how_to_fix: Vec::new(),
            suggested_command: None
        }
    }

    pub fn why(mut self, reason: impl Into<String>) -> Self {
        self.why = Some(reason.into());
        self
    }

    pub fn fix(mut self, suggestion: impl Into<String>) -> Self {
        self.how_to_fix.push(suggestion.into());
        self
    }

    pub fn suggest(mut self, cmd: impl Into<String>) -> Self {
        self.suggested_command = Some(cmd.into());
        self
    }

    pub fn display(&self) {
        eprintln!();
        eprintln!("{} {}", "error:".red().bold(), self.what.white().bold());

        if let Some(why) = &self.why {
            eprintln!("       {}", why.dimmed());
        }

        if !self.how_to_fix.is_empty() {
            eprintln!();
            eprintln!("{}", "How to fix:".yellow().bold());
            for (i, fix) in self.how_to_fix.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, fix);
            }
        }

        if let Some(cmd) = &self.suggested_command {
            eprintln!();
            eprintln!("{}", "Try this:".green().bold());
            eprintln!("  $ {}", cmd.cyan());
        }
        eprintln!();
    }
}

impl std::fmt::Display for UxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.what)
    }
}

impl std::error::Error for UxError {}

pub fn oracle_not_configured(reason: &str) -> UxError {
    UxError::new("Cannot reach the text-generation service")
        .why(reason.to_string())
        .fix("Export an API key in OPENAI_API_KEY or LUCID_ORACLE_API_KEY")
        .fix("Point LUCID_ORACLE_BASE_URL at any OpenAI-compatible endpoint")
        .suggest("OPENAI_API_KEY=sk-... lucid explain --text \"...\"")
}

pub fn empty_input() -> UxError {
    UxError::new("Nothing to explain")
        .why("The input text is empty or only whitespace")
        .fix("Pass text with --text, a file with --file, or pipe it on stdin")
        .suggest("lucid explain --file notes.txt")
}

pub fn input_unreadable(source: &str, reason: &str) -> UxError {
    UxError::new(format!("Cannot read input from {}", source))
        .why(reason.to_string())
        .fix("Check the path exists and is readable")
}

pub fn invalid_reading_level(input: &str) -> UxError {
    let valid: Vec<&str> = ReadingLevel::ALL.iter().map(|l| l.label()).collect();
    UxError::new(format!("Unknown reading level: '{}'", input))
        .why(format!("Valid levels are: {}", valid.join(", ")))
        .fix("Use a level label or its grade code (K3, K6, K9, K12)")
        .suggest("lucid levels")
}

pub fn config_error(message: &str) -> UxError {
    UxError::new(format!("Configuration error: {}", message))
        .why("The configuration file or LUCID_* environment may be invalid")
        .fix("Check the file passed with --config")
        .fix("Unset LUCID_* variables that hold unexpected values")
}

/// Presentation for a failed explanation, by failure kind.
pub fn explain_failed(err: &ExplainError) -> UxError {
    let base = UxError::new(err.to_string());
    match err.kind() {
        ErrorKind::InvalidInput => empty_input(),
        ErrorKind::EmptyDecomposition => base
            .why("The model found no topics or concepts to explain")
            .fix("Provide a longer or more substantive text")
            .fix("Try the other synthesis strategy")
            .suggest("lucid explain --strategy structured --file notes.txt"),
        ErrorKind::OracleUnavailable => base
            .why("The text-generation service failed, rejected the request or timed out")
            .fix("Check the API key and network connectivity")
            .fix("Raise LUCID_ORACLE_TIMEOUT_SECONDS for long documents")
            .fix("Lower --concurrency if the service is rate limiting"),
        ErrorKind::OracleMalformedResponse => base
            .why("The model's reply did not have the expected shape")
            .fix("Run again; replies vary between calls")
            .fix("Use a model that supports structured JSON schema output")
    }
}
