use tracing::{debug, info};

use super::prompt;
use super::record::JustificationRecord;
use crate::gemini::{GeminiError, GenerationClient};
use crate::pubmed::{Citation, LiteratureLookup, LiteratureSource};

/// Generated justification text (verbatim from the model) and its citations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Justification {
    pub text: String,
    pub citations: Vec<Citation>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("missing required field(s): {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("justification generation failed: {0}")]
    Generation(#[from] GeminiError),

    #[error("unreadable CSV row at line {line}: {reason}")]
    UnreadableRow { line: u64, reason: String },
}

/// Turns one record into a justification plus supporting citations.
pub struct RecordProcessor<G, S> {
    generator: G,
    literature: LiteratureLookup<S>,
    max_citations: usize,
}

impl<G: GenerationClient, S: LiteratureSource> RecordProcessor<G, S> {
    pub fn new(generator: G, literature: LiteratureLookup<S>, max_citations: usize) -> Self {
        Self {
            generator,
            literature,
            max_citations,
        }
    }

    /// Incomplete records are rejected before any remote call. Generation
    /// errors propagate; citation lookup failures yield an empty list.
    pub async fn process(&self, record: &JustificationRecord) -> Result<Justification, ProcessError> {
        let missing = record.missing_fields();
        if !missing.is_empty() {
            return Err(ProcessError::MissingFields(missing));
        }

        if !record.has_known_formulation() {
            debug!(formulation = %record.formulation_type, "free-text formulation type");
        }
        if !record.has_known_role() {
            debug!(role = %record.excipient_role, "free-text excipient role");
        }

        let prompt = prompt::render(record);
        let query = record.citation_query();

        let (text, citations) = futures::join!(
            self.generator.generate(&prompt),
            self.literature.lookup(&query, self.max_citations)
        );
        let text = text?;

        info!(
            drug = %record.drug_name,
            excipient = %record.excipient,
            citations = citations.len(),
            "justification generated"
        );
        Ok(Justification { text, citations })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Scripted `GenerationClient` that records every prompt it receives.
    /// When the script runs out it echoes a fixed answer.
    pub struct MockGenerator {
        responses: Mutex<VecDeque<Result<String, GeminiError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl MockGenerator {
        pub fn with_responses(responses: Vec<Result<String, GeminiError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn always_ok() -> Self {
            Self::with_responses(Vec::new())
        }

        pub fn captured_prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    impl GenerationClient for MockGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, GeminiError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses.lock().unwrap().pop_front().unwrap_or_else(|| {
                Ok("CMC is a suitable disintegrant per ICH Q8.".to_string())
            })
        }
    }
}
