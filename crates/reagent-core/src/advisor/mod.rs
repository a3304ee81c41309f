//! Retrieval-augmented prompt advisor

use crate::error::AgentResult;
use crate::llm::messages::ChatMessage;
use crate::prompts::PromptTemplate;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Default advice wrapped around retrieved documents
pub const DEFAULT_ADVISE_TEMPLATE: &str = "Remember the following material; it may help \
answer the question.\n---------------------\n{documents}\n---------------------\n";

/// A retrieved document
#[derive(Debug, Clone)]
pub struct Document {
    /// Document content
    pub content: String,
    /// Source metadata (origin, score, ...)
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Document {
    /// Create a document from its content
    pub fn new<S: Into<String>>(content: S) -> Self {
        Self {
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata entry
    pub fn with_metadata<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Retrieves documents relevant to a query
pub trait DocumentRetriever: Send + Sync {
    /// Retrieve documents for a query, most relevant first
    fn retrieve(&self, query: &str) -> AgentResult<Vec<Document>>;
}

/// Prompt produced by the advisor: the advice message plus the documents
/// that went into it, so callers can surface what was used
#[derive(Debug, Clone)]
pub struct AdvisedPrompt {
    /// System message carrying the retrieved material
    pub message: ChatMessage,
    /// Documents included in the message
    pub documents: Vec<Document>,
}

/// Augments prompts with retrieved documents
pub struct RetrievalAdvisor {
    retriever: Arc<dyn DocumentRetriever>,
    advise_template: PromptTemplate,
}

impl RetrievalAdvisor {
    /// Create an advisor with the default advice template
    pub fn new(retriever: Arc<dyn DocumentRetriever>) -> Self {
        Self {
            retriever,
            advise_template: PromptTemplate::new(DEFAULT_ADVISE_TEMPLATE),
        }
    }

    /// Replace the advice template; it must contain a `{documents}` placeholder
    pub fn with_template<S: Into<String>>(mut self, template: S) -> Self {
        self.advise_template = PromptTemplate::new(template.into());
        self
    }

    /// Retrieve documents for the query and build the advice message
    ///
    /// Returns `None` when nothing was retrieved, leaving the prompt
    /// untouched.
    pub fn advise(&self, query: &str) -> AgentResult<Option<AdvisedPrompt>> {
        let documents = self.retriever.retrieve(query)?;
        if documents.is_empty() {
            return Ok(None);
        }

        debug!(count = documents.len(), "retrieved documents for prompt");

        let joined = documents
            .iter()
            .map(|d| d.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let mut data = HashMap::new();
        data.insert("documents".to_string(), joined);
        let message = ChatMessage::system(self.advise_template.render(&data));

        Ok(Some(AdvisedPrompt { message, documents }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRetriever {
        documents: Vec<&'static str>,
    }

    impl DocumentRetriever for FixedRetriever {
        fn retrieve(&self, _query: &str) -> AgentResult<Vec<Document>> {
            Ok(self.documents.iter().copied().map(Document::new).collect())
        }
    }

    #[test]
    fn test_advise_joins_documents() {
        let advisor = RetrievalAdvisor::new(Arc::new(FixedRetriever {
            documents: vec!["first fact", "second fact"],
        }));

        let advised = advisor.advise("anything").unwrap().unwrap();
        assert_eq!(advised.documents.len(), 2);
        assert!(advised.message.content.contains("first fact\nsecond fact"));
        assert!(!advised.message.content.contains("{documents}"));
    }

    #[test]
    fn test_no_documents_no_message() {
        let advisor = RetrievalAdvisor::new(Arc::new(FixedRetriever { documents: vec![] }));
        assert!(advisor.advise("anything").unwrap().is_none());
    }

    #[test]
    fn test_custom_template() {
        let advisor = RetrievalAdvisor::new(Arc::new(FixedRetriever {
            documents: vec!["doc"],
        }))
        .with_template("Context: {documents}");

        let advised = advisor.advise("q").unwrap().unwrap();
        assert_eq!(advised.message.content, "Context: doc");
    }
}
