//! Translate-then-classify gate for anonymous submissions.
//!
//! The pipeline is stateless per call: two oracle invocations and a verdict.
//! A rejected submission is terminal and nothing is persisted; an oracle
//! transport failure is a retryable upstream error, kept distinct from a
//! rejection.

use crate::error::{ServiceError, ServiceResult};
use crate::oracles::{SentimentClassifier, SentimentLabel, Translator};
use std::sync::Arc;

pub const REPHRASE_HINT: &str =
    "Your post contains negative sentiment. Consider rephrasing.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationVerdict {
    /// Translation used for classification only; the raw text is what gets
    /// persisted, never this.
    pub translated: String,
    pub label_was_positive: bool,
}

#[derive(Clone)]
pub struct ModerationPipeline {
    translator: Arc<dyn Translator>,
    classifier: Arc<dyn SentimentClassifier>,
}

impl ModerationPipeline {
    pub fn new(translator: Arc<dyn Translator>, classifier: Arc<dyn SentimentClassifier>) -> Self {
        Self {
            translator,
            classifier,
        }
    }

    pub async fn moderate(&self, raw_text: &str) -> ServiceResult<ModerationVerdict> {
        if raw_text.trim().is_empty() {
            return Err(ServiceError::validation("post text is required"));
        }

        let translated = self
            .translator
            .translate(raw_text)
            .await
            .map_err(|err| ServiceError::Upstream(format!("translation failed: {err}")))?;
        if translated.is_empty() {
            return Err(ServiceError::Upstream(
                "translation failed or returned empty result".into(),
            ));
        }
        tracing::debug!(chars = translated.len(), "translation received");

        let label = self
            .classifier
            .classify(&translated)
            .await
            .map_err(|err| ServiceError::Upstream(format!("classification failed: {err}")))?;

        match label {
            SentimentLabel::Negative => {
                Err(ServiceError::ModerationRejected(REPHRASE_HINT.into()))
            }
            SentimentLabel::Positive => Ok(ModerationVerdict {
                translated,
                label_was_positive: true,
            }),
            SentimentLabel::Other(label) => {
                tracing::debug!(%label, "non-negative label, accepting");
                Ok(ModerationVerdict {
                    translated,
                    label_was_positive: false,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracles::OracleError;
    use async_trait::async_trait;

    struct FixedTranslator(String);

    #[async_trait]
    impl Translator for FixedTranslator {
        async fn translate(&self, _text: &str) -> Result<String, OracleError> {
            Ok(self.0.clone())
        }
    }

    struct FailingTranslator;

    #[async_trait]
    impl Translator for FailingTranslator {
        async fn translate(&self, _text: &str) -> Result<String, OracleError> {
            Err(OracleError::Timeout)
        }
    }

    struct FixedClassifier(SentimentLabel);

    #[async_trait]
    impl SentimentClassifier for FixedClassifier {
        async fn classify(&self, _text: &str) -> Result<SentimentLabel, OracleError> {
            Ok(self.0.clone())
        }
    }

    fn pipeline(translated: &str, label: SentimentLabel) -> ModerationPipeline {
        ModerationPipeline::new(
            Arc::new(FixedTranslator(translated.to_string())),
            Arc::new(FixedClassifier(label)),
        )
    }

    #[tokio::test]
    async fn empty_translation_is_an_upstream_failure() {
        let pipeline = pipeline("", SentimentLabel::Positive);
        let err = pipeline.moderate("kya haal hai").await.unwrap_err();
        assert!(matches!(err, ServiceError::Upstream(_)));
    }

    #[tokio::test]
    async fn translator_timeout_is_an_upstream_failure() {
        let pipeline = ModerationPipeline::new(
            Arc::new(FailingTranslator),
            Arc::new(FixedClassifier(SentimentLabel::Positive)),
        );
        let err = pipeline.moderate("kya haal hai").await.unwrap_err();
        assert!(matches!(err, ServiceError::Upstream(_)));
    }

    #[tokio::test]
    async fn negative_label_rejects_with_rephrase_hint() {
        let pipeline = pipeline("I hate this", SentimentLabel::Negative);
        let err = pipeline.moderate("text").await.unwrap_err();
        match err {
            ServiceError::ModerationRejected(hint) => assert_eq!(hint, REPHRASE_HINT),
            other => panic!("expected moderation rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn positive_and_unknown_labels_accept() {
        let verdict = pipeline("great day", SentimentLabel::Positive)
            .moderate("text")
            .await
            .unwrap();
        assert_eq!(verdict.translated, "great day");

        let verdict = pipeline("meh", SentimentLabel::Other("NEUTRAL".into()))
            .moderate("text")
            .await
            .unwrap();
        assert!(!verdict.label_was_positive);
    }

    #[tokio::test]
    async fn empty_submission_is_validation_not_upstream() {
        let pipeline = pipeline("anything", SentimentLabel::Positive);
        let err = pipeline.moderate("   ").await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
