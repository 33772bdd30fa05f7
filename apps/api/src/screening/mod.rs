// Resume screening: LLM scoring of extracted resume text against a job description.
// All LLM calls go through llm_client.

pub mod handlers;
pub mod normalize;
pub mod prompts;
pub mod scorer;
pub mod store;
