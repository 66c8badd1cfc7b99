//! Prompt assembly.
//!
//! Context is passed through in full. If a backend has an input limit the
//! generation call reports `ContextTooLarge`; nothing is truncated here.

use crate::chunking::Chunk;
use crate::config::Prompts;
use std::collections::HashMap;

/// Retrieved context and the question, before rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Chunk texts joined in retrieval order.
    pub context_text: String,
    pub question: String,
    rendered: String,
}

impl Prompt {
    /// The single string sent to the model.
    pub fn text(&self) -> &str {
        &self.rendered
    }

    pub fn into_text(self) -> String {
        self.rendered
    }
}

/// Composes context and question into a model input.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    prompts: Prompts,
}

impl PromptBuilder {
    pub fn new(prompts: Prompts) -> Self {
        Self { prompts }
    }

    /// Join chunk texts in order under the QA template.
    pub fn build(&self, chunks: &[Chunk], question: &str) -> Prompt {
        let context_text = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(&self.prompts.qa.context_delimiter);

        let mut vars = HashMap::new();
        vars.insert("context".to_string(), context_text.clone());
        vars.insert("question".to_string(), question.to_string());
        let rendered = self.prompts.render_with_custom(&self.prompts.qa.template, &vars);

        Prompt {
            context_text,
            question: question.to_string(),
            rendered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(order: usize, text: &str) -> Chunk {
        Chunk {
            text: text.to_string(),
            source_page_index: 0,
            offset: 0,
            order,
        }
    }

    #[test]
    fn test_renders_default_template() {
        let builder = PromptBuilder::default();
        let prompt = builder.build(
            &[chunk(2, "Pax lived in a teapot."), chunk(0, "Din rubbed it.")],
            "Who is Pax?",
        );

        assert_eq!(prompt.context_text, "Pax lived in a teapot.\n\nDin rubbed it.");
        assert_eq!(
            prompt.text(),
            "Answer based on this story context:\nPax lived in a teapot.\n\nDin rubbed it.\n\nQuestion: Who is Pax?\nAnswer:"
        );
    }

    #[test]
    fn test_no_truncation_of_long_context() {
        let long = "w".repeat(50_000);
        let prompt = PromptBuilder::default().build(&[chunk(0, &long)], "q");
        assert!(prompt.text().contains(&long));
    }

    #[test]
    fn test_empty_context() {
        let prompt = PromptBuilder::default().build(&[], "Anyone there?");
        assert_eq!(prompt.context_text, "");
        assert!(prompt.into_text().ends_with("Question: Anyone there?\nAnswer:"));
    }

    #[test]
    fn test_placeholders_in_question_and_story_are_kept_verbatim() {
        let builder = PromptBuilder::default();
        let expected = "Answer based on this story context:\nPax said {{question}}.\n\nQuestion: What does {{context}} mean?\nAnswer:";

        for _ in 0..100 {
            let prompt = builder.build(
                &[chunk(0, "Pax said {{question}}.")],
                "What does {{context}} mean?",
            );
            assert_eq!(prompt.text(), expected);
        }
    }

    #[test]
    fn test_custom_variables_fill_template() {
        let mut prompts = Prompts::default();
        prompts.qa.template = "[{{story}}] {{context}} | {{question}}".to_string();
        prompts.variables.insert("story".to_string(), "Wish Dragon".to_string());

        let prompt = PromptBuilder::new(prompts).build(&[chunk(0, "ctx")], "q?");
        assert_eq!(prompt.text(), "[Wish Dragon] ctx | q?");
    }
}
