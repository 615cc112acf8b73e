// Pack generation engine.
// Seed resolution, AI-or-template text, images, page rendering and manifests.
// All LLM calls go through llm_client; all image calls go through imaging.

pub mod events;
pub mod handlers;
pub mod manifest;
pub mod models;
pub mod page;
pub mod pipeline;
pub mod prompts;
pub mod seed;
pub mod templates;
pub mod writer;
