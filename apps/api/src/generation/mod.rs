// Generation: job description + resume in, cover letter or rewritten resume out.
// Every successful generation is persisted to history before it is returned.
// All provider calls go through llm_client::TextGenerator.

pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod validation;
