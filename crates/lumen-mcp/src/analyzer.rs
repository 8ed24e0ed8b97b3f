use futures_util::future::try_join_all;
use lumen_config::Config;
use lumen_image::{ImageNormalizer, NormalizedImage, validate_image_input};
use lumen_llm::{ChatMessage, ChatRequest, ContentBlock, StreamAccumulator, UpstreamClient};

use crate::ToolError;

/// Prompt used by `summarize_image` when none is supplied
pub const DEFAULT_SUMMARIZE_PROMPT: &str = "Describe this image in detail, including all text.";

/// Prompt used by `compare_images` when none is supplied
pub const DEFAULT_COMPARE_PROMPT: &str =
    "Compare these images in detail, including all text, and describe the similarities and differences.";

/// Minimum number of references `compare` accepts
pub const MIN_COMPARE_IMAGES: usize = 2;

/// Normalizes image references and asks the upstream model about them
#[derive(Debug, Clone)]
pub struct ImageAnalyzer {
    normalizer: ImageNormalizer,
    client: UpstreamClient,
    model: String,
    stream: bool,
}

impl ImageAnalyzer {
    pub fn new(normalizer: ImageNormalizer, client: UpstreamClient, model: impl Into<String>, stream: bool) -> Self {
        Self {
            normalizer,
            client,
            model: model.into(),
            stream,
        }
    }

    /// Build an analyzer from resolved configuration
    ///
    /// # Errors
    ///
    /// Returns an error if either HTTP client cannot be constructed
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let normalizer = ImageNormalizer::new()?;
        let client = UpstreamClient::new(&config.upstream)?;

        Ok(Self::new(
            normalizer,
            client,
            config.upstream.model.clone(),
            config.server.stream,
        ))
    }

    pub const fn streaming(&self) -> bool {
        self.stream
    }

    /// Describe a single image
    pub async fn summarize(&self, image_url: &str, custom_prompt: Option<&str>) -> Result<String, ToolError> {
        let prompt = prompt_or_default(custom_prompt, DEFAULT_SUMMARIZE_PROMPT);
        let images = self.normalize_all(&[image_url]).await?;

        self.ask(prompt, &images).await
    }

    /// Compare two or more images
    ///
    /// Fails before touching any file or network when fewer than two
    /// references are given.
    pub async fn compare<S: AsRef<str>>(&self, image_urls: &[S], custom_prompt: Option<&str>) -> Result<String, ToolError> {
        if image_urls.len() < MIN_COMPARE_IMAGES {
            return Err(ToolError::InvalidInput(format!(
                "at least {MIN_COMPARE_IMAGES} image URLs are required for comparison, got {}",
                image_urls.len()
            )));
        }

        let prompt = prompt_or_default(custom_prompt, DEFAULT_COMPARE_PROMPT);
        let images = self.normalize_all(image_urls).await?;

        self.ask(prompt, &images).await
    }

    /// Normalize every reference concurrently, preserving input order
    async fn normalize_all<S: AsRef<str>>(&self, references: &[S]) -> Result<Vec<NormalizedImage>, ToolError> {
        for reference in references {
            validate_image_input(reference.as_ref())?;
        }

        let images = try_join_all(references.iter().map(|r| self.normalizer.normalize(r.as_ref()))).await?;
        Ok(images)
    }

    /// Single user message: prompt first, then images in caller order
    pub fn build_request(&self, prompt: &str, images: &[NormalizedImage]) -> ChatRequest {
        let content = std::iter::once(ContentBlock::text(prompt))
            .chain(images.iter().map(|image| ContentBlock::image(image.data_url.clone())))
            .collect();

        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(content)],
            stream: self.stream,
        }
    }

    async fn ask(&self, prompt: &str, images: &[NormalizedImage]) -> Result<String, ToolError> {
        let request = self.build_request(prompt, images);

        tracing::debug!(
            model = %request.model,
            images = images.len(),
            stream = request.stream,
            "requesting completion"
        );

        let text = if request.stream {
            let mut accumulator = StreamAccumulator::new();
            self.client
                .chat_completion(&request, |chunk| accumulator.push(chunk))
                .await?;
            accumulator.into_text()
        } else {
            let response = self.client.complete(&request).await?;
            response.text().unwrap_or_default().to_owned()
        };

        if text.trim().is_empty() {
            return Err(ToolError::EmptyResponse);
        }

        Ok(text)
    }
}

fn prompt_or_default<'a>(custom: Option<&'a str>, default: &'a str) -> &'a str {
    custom.map(str::trim).filter(|p| !p.is_empty()).unwrap_or(default)
}
