//! Oracle clients for the explanation pipeline.
//!
//! [`OpenAiOracle`] talks to any endpoint that speaks the OpenAI chat
//! completions protocol, including structured output via `json_schema`
//! response formats.

mod openai;

pub use openai::OpenAiOracle;
