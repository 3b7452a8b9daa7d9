//! Fakes for the model and extraction seams.

use crate::error::{IngestError, IngestResult};
use crate::parsers::TextExtractor;
use async_trait::async_trait;
use docflow_llm::{Embedder, LlmError, LlmResult, TextGenerator};
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Mutex;

/// Replies with queued answers in order, recording each prompt.
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<LlmResult<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails as if the service were down.
    pub fn unreachable() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate_text(&self, prompt: &str) -> LlmResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(LlmError::ServerNotRunning {
                    host: "fake".to_string(),
                })
            })
    }
}

/// Embeds text as `[len, 1.0]`, or fails for texts containing a marker.
pub struct FakeEmbedder {
    fail_on: Option<String>,
    calls: Mutex<usize>,
}

impl FakeEmbedder {
    pub fn new() -> Self {
        Self {
            fail_on: None,
            calls: Mutex::new(0),
        }
    }

    pub fn failing_on(marker: &str) -> Self {
        Self {
            fail_on: Some(marker.to_string()),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed_text(&self, text: &str) -> LlmResult<Vec<f32>> {
        *self.calls.lock().unwrap() += 1;
        if let Some(marker) = &self.fail_on {
            if text.contains(marker.as_str()) {
                return Err(LlmError::ServerNotRunning {
                    host: "fake".to_string(),
                });
            }
        }
        Ok(vec![text.chars().count() as f32, 1.0])
    }
}

/// Serves canned text per file stem instead of parsing PDFs.
#[derive(Default)]
pub struct FakeExtractor {
    texts: HashMap<String, String>,
}

impl FakeExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, stem: &str, text: &str) -> Self {
        self.texts.insert(stem.to_string(), text.to_string());
        self
    }

    fn text_for(&self, path: &Path) -> IngestResult<String> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        self.texts
            .get(stem)
            .cloned()
            .ok_or_else(|| IngestError::ParseError {
                path: path.to_path_buf(),
                message: "no text".to_string(),
            })
    }
}

impl TextExtractor for FakeExtractor {
    fn first_page(&self, path: &Path) -> IngestResult<String> {
        self.text_for(path)
            .map(|text| text.lines().next().unwrap_or_default().to_string())
    }

    fn full_text(&self, path: &Path) -> IngestResult<String> {
        self.text_for(path)
    }

    fn extensions(&self) -> &[&str] {
        &["pdf"]
    }
}
