//! Document classification.

use docflow_core::Classification;
use docflow_llm::TextGenerator;
use std::sync::Arc;
use tracing::{debug, warn};

/// Labels a document sample as invoice, contract or unknown.
#[derive(Clone)]
pub struct Classifier {
    generator: Arc<dyn TextGenerator>,
    sample_chars: usize,
}

impl Classifier {
    pub fn new(generator: Arc<dyn TextGenerator>, sample_chars: usize) -> Self {
        Self {
            generator,
            sample_chars,
        }
    }

    /// Classify a text sample. Model failures yield `Unknown`, never an error.
    pub async fn classify(&self, text: &str) -> Classification {
        let prompt = classification_prompt(text, self.sample_chars);

        match self.generator.generate_text(&prompt).await {
            Ok(reply) => {
                let label = Classification::from_reply(&reply);
                if label == Classification::Unknown {
                    warn!("Classifier returned an unrecognised label: '{}'", reply.trim());
                } else {
                    debug!("Classified as {}", label);
                }
                label
            }
            Err(e) => {
                warn!("Classification request failed: {}", e);
                Classification::Unknown
            }
        }
    }
}

/// Classification prompt over the first `sample_chars` characters of `text`.
pub fn classification_prompt(text: &str, sample_chars: usize) -> String {
    let sample: String = text.chars().take(sample_chars).collect();

    format!(
        "Išanalizuokite šio dokumento tekstą ir nustatykite jo tipą.
Jums reikia pasirinkti TIK iš šių dviejų variantų: 'invoice' (sąskaita faktūra) ARBA 'contract' (sutartis).

Atsakymą pateikite TIK vienu žodžiu be jokių papildomų paaiškinimų, kabučių ar ženklų.
Jei nerandate aiškaus tipo, grąžinkite 'unknown'.

Dokumento tekstas:
```
{}
```
",
        sample
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedGenerator;

    #[tokio::test]
    async fn test_reply_is_normalized() {
        let generator = Arc::new(ScriptedGenerator::replies(["  Invoice\n"]));
        let classifier = Classifier::new(generator.clone(), 1000);

        assert_eq!(classifier.classify("PVM SĄSKAITA FAKTŪRA").await, Classification::Invoice);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_unexpected_reply_is_unknown() {
        let generator = Arc::new(ScriptedGenerator::replies(["Tai yra sutartis."]));
        let classifier = Classifier::new(generator, 1000);

        assert_eq!(classifier.classify("...").await, Classification::Unknown);
    }

    #[tokio::test]
    async fn test_model_failure_is_unknown() {
        let generator = Arc::new(ScriptedGenerator::unreachable());
        let classifier = Classifier::new(generator, 1000);

        assert_eq!(classifier.classify("SUTARTIS").await, Classification::Unknown);
    }

    #[tokio::test]
    async fn test_sample_is_bounded_in_characters() {
        let generator = Arc::new(ScriptedGenerator::replies(["contract"]));
        let classifier = Classifier::new(generator.clone(), 5);

        classifier.classify("ŠĄČĘĖĮŠŲŪ and more").await;

        let prompt = generator.last_prompt().unwrap();
        assert!(prompt.contains("```\nŠĄČĘĖ\n```"));
        assert!(!prompt.contains("and more"));
    }
}
