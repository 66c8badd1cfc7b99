//! Prompt templates for StoryQA.
//!
//! The question-answering template can be customized by placing a `qa.toml`
//! file in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub qa: QaPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompt used to answer questions about the story.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QaPrompts {
    /// Template with `{{context}}` and `{{question}}` placeholders.
    pub template: String,
    /// Separator placed between retrieved chunk texts.
    pub context_delimiter: String,
}

impl Default for QaPrompts {
    fn default() -> Self {
        Self {
            template: "Answer based on this story context:\n{{context}}\n\nQuestion: {{question}}\nAnswer:"
                .to_string(),
            context_delimiter: "\n\n".to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let qa_path = custom_path.join("qa.toml");
            if qa_path.exists() {
                let content = std::fs::read_to_string(&qa_path)?;
                prompts.qa = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are resolved in one left-to-right pass: substituted
    /// values are copied verbatim and never expanded again. Unknown
    /// placeholders are left as written.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => match vars.get(&after[..end]) {
                    Some(value) => {
                        result.push_str(value);
                        rest = &after[end + 2..];
                    }
                    None => {
                        result.push_str("{{");
                        rest = after;
                    }
                },
                None => {
                    result.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }

        result.push_str(rest);
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_has_placeholders() {
        let prompts = Prompts::default();
        assert!(prompts.qa.template.starts_with("Answer based on this story context:"));
        assert!(prompts.qa.template.contains("{{context}}"));
        assert!(prompts.qa.template.ends_with("Question: {{question}}\nAnswer:"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} wishes.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Pax".to_string());
        vars.insert("count".to_string(), "3".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Pax, you have 3 wishes.");
    }

    #[test]
    fn test_render_does_not_expand_substituted_values() {
        let mut vars = HashMap::new();
        vars.insert("a".to_string(), "{{b}}".to_string());
        vars.insert("b".to_string(), "{{a}}".to_string());

        for _ in 0..50 {
            assert_eq!(Prompts::render("{{a}}|{{b}}", &vars), "{{b}}|{{a}}");
        }
    }

    #[test]
    fn test_render_keeps_unknown_and_unclosed_placeholders() {
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Pax".to_string());

        assert_eq!(Prompts::render("{{who}} {{name}}", &vars), "{{who}} Pax");
        assert_eq!(Prompts::render("{{x {{name}}", &vars), "{{x Pax");
        assert_eq!(Prompts::render("tail {{name", &vars), "tail {{name");
    }

    #[test]
    fn test_call_site_variables_override_custom() {
        let mut custom = HashMap::new();
        custom.insert("question".to_string(), "ignored".to_string());
        custom.insert("tone".to_string(), "brief".to_string());
        let prompts = Prompts::load(None, Some(&custom)).unwrap();

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "Who?".to_string());

        let result = prompts.render_with_custom("{{question}} ({{tone}})", &vars);
        assert_eq!(result, "Who? (brief)");
    }

    #[test]
    fn test_load_custom_qa_prompt() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("qa.toml"),
            "template = \"Context: {{context}} Q: {{question}}\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.qa.template, "Context: {{context}} Q: {{question}}");
        assert_eq!(prompts.qa.context_delimiter, "\n\n");
    }
}
