//! Prompt construction for use case extraction

use casebook_domain::{Chunk, UseCaseField};

/// Builds the extraction prompt for one chunk
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    /// Create a new prompt builder
    pub fn new() -> Self {
        Self
    }

    /// Build the complete extraction prompt
    pub fn build(&self, chunk: &Chunk) -> String {
        let mut prompt = String::with_capacity(
            EXTRACTION_INSTRUCTIONS.len() + chunk.text.len() + OUTPUT_FORMAT_REMINDER.len() + 256,
        );

        // 1. Instructions
        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\n");

        // 2. The text to analyze
        prompt.push_str("Document:\n");
        prompt.push_str("---\n");
        prompt.push_str(chunk.text.trim());
        prompt.push_str("\n---\n\n");

        // 3. Output format, one label per line in schema order
        prompt.push_str("Format your output exactly like this for each Use Case:\n");
        for field in UseCaseField::ALL {
            prompt.push_str("- ");
            prompt.push_str(field.label());
            prompt.push_str(":\n");
        }
        prompt.push('\n');
        prompt.push_str(OUTPUT_FORMAT_REMINDER);

        prompt
    }
}

const EXTRACTION_INSTRUCTIONS: &str = r#"You are a Business Analyst assistant.

Analyze the following business-related text and extract detailed, structured Use Cases.

A Use Case describes one goal an actor achieves with the system:
- Use Case Title: a short verb phrase naming the goal
- Actor(s): people, roles or external systems taking part, comma separated
- Preconditions: what must be true before the use case starts
- Trigger: the event that starts it
- Main Flow: the numbered steps of the normal path
- Alternative Flows: numbered deviations, errors or optional paths
- Postconditions: what is true once it ends
- Notes: assumptions, open questions or business rules

Only describe use cases supported by the text. Write "None" for a field the text says nothing about."#;

const OUTPUT_FORMAT_REMINDER: &str = "Start every Use Case with its \"- Use Case Title:\" line. \
Do not include any extra text or explanations. Strictly follow the format. \
Be clean, professional, and concise.";
