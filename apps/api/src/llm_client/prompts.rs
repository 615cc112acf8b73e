// Shared prompt fragments.
// Artifact-specific prompts live in generation::prompts alongside the pipeline.

/// Appended to prompts whose output is pasted verbatim into a file.
pub const PLAIN_OUTPUT_INSTRUCTION: &str = "\
    Return ONLY the requested content. \
    Do NOT include metadata, explanations, or surrounding quotes.";

/// One-line voice directive shared by every system prompt.
pub fn voice_directive(voice: &str) -> String {
    format!("Your writing style is {voice}.")
}
