//! Offline stand-ins for the model and OCR collaborators.

use crate::error::DocExtractError;
use crate::model::{GenerationRequest, ModelAdapter};
use crate::pipeline::ocr::OcrEngine;
use async_trait::async_trait;
use image::{GrayImage, ImageFormat, Luma};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Replies with a fixed script, one entry per call; the last entry repeats.
pub struct ScriptedModel {
    replies: Vec<String>,
    prompts: Mutex<Vec<String>>,
    systems: Mutex<Vec<String>>,
    contexts: Mutex<Vec<Option<String>>>,
}

impl ScriptedModel {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: replies.into_iter().map(Into::into).collect(),
            prompts: Mutex::new(Vec::new()),
            systems: Mutex::new(Vec::new()),
            contexts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn system_messages(&self) -> Vec<String> {
        self.systems.lock().unwrap().clone()
    }

    pub fn contexts(&self) -> Vec<Option<String>> {
        self.contexts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelAdapter for ScriptedModel {
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, DocExtractError> {
        let mut prompts = self.prompts.lock().unwrap();
        let idx = prompts.len().min(self.replies.len().saturating_sub(1));
        prompts.push(request.prompt.to_string());
        self.systems.lock().unwrap().push(request.system_message());
        self.contexts.lock().unwrap().push(request.context_message());
        Ok(self.replies.get(idx).cloned().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// OCR engine that ignores the image and returns fixed text.
pub struct FixedOcr(pub String);

#[async_trait]
impl OcrEngine for FixedOcr {
    async fn recognize(&self, _image: &GrayImage) -> Result<String, DocExtractError> {
        Ok(self.0.clone())
    }
}

/// Write a small two-tone PNG that decodes cleanly.
pub fn write_card_png(dir: &Path, name: &str) -> PathBuf {
    let img = GrayImage::from_fn(64, 32, |x, y| {
        if (x / 8 + y / 8) % 2 == 0 {
            Luma([20])
        } else {
            Luma([235])
        }
    });
    let path = dir.join(name);
    img.save_with_format(&path, ImageFormat::Png).unwrap();
    path
}
