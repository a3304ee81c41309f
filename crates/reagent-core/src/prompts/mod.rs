//! Prompt templates with `{placeholder}` substitution

use std::collections::HashMap;

/// A prompt template rendered against a data map
///
/// Placeholders are written `{key}` and replaced by the matching entry;
/// unknown placeholders are left as-is so a missing datum is visible in
/// the rendered prompt rather than silently dropped.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Create a template from its source text
    pub fn new<S: Into<String>>(template: S) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Get the raw template text
    pub fn source(&self) -> &str {
        &self.template
    }

    /// Render the template against a data map
    pub fn render(&self, data: &HashMap<String, String>) -> String {
        let mut rendered = self.template.clone();
        for (key, value) in data {
            rendered = rendered.replace(&format!("{{{key}}}"), value);
        }
        rendered
    }
}

impl From<&str> for PromptTemplate {
    fn from(template: &str) -> Self {
        Self::new(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_substitutes_placeholders() {
        let template = PromptTemplate::new("You are {name}. Task: {task}");
        let rendered = template.render(&data(&[("name", "crawler"), ("task", "fetch docs")]));
        assert_eq!(rendered, "You are crawler. Task: fetch docs");
    }

    #[test]
    fn test_unknown_placeholder_left_visible() {
        let template = PromptTemplate::new("Hello {missing}");
        assert_eq!(template.render(&HashMap::new()), "Hello {missing}");
    }

    #[test]
    fn test_repeated_placeholder() {
        let template = PromptTemplate::new("{x} and {x}");
        assert_eq!(template.render(&data(&[("x", "y")])), "y and y");
    }
}
