use anyhow::bail;
use async_trait::async_trait;
use serde_json::json;

use crate::models::generation::GenerationConfig;

/// External image-generation collaborator. Returns an opaque image reference.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, config: &GenerationConfig) -> Result<String, anyhow::Error>;
}

pub struct ImagenApi {
    api_key: String,
    url: String,
    model: String,
    client: reqwest::Client,
}

impl ImagenApi {
    pub fn new(api_key: String, url: String, model: String) -> Self {
        Self {
            api_key,
            url: url.trim_end_matches('/').to_string(),
            model,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ImageGenerator for ImagenApi {
    async fn generate(&self, config: &GenerationConfig) -> Result<String, anyhow::Error> {
        let mut parameters = json!({
            "sampleCount": 1,
            "aspectRatio": config.aspect_ratio.as_str(),
        });
        if !config.negative_prompt.trim().is_empty() {
            parameters["negativePrompt"] = json!(config.negative_prompt);
        }
        let payload = json!({
            "instances": [{ "prompt": config.prompt }],
            "parameters": parameters,
        });

        let response = self
            .client
            .post(format!("{}/v1beta/models/{}:predict", self.url, self.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body: serde_json::Value = response.json().await?;

        if let Some(message) = body["error"]["message"].as_str() {
            bail!("Image generation failed: {}", message);
        }
        if !status.is_success() {
            bail!("Image generation failed with status {}.", status);
        }

        let prediction = &body["predictions"][0];
        match prediction["bytesBase64Encoded"].as_str() {
            Some(bytes) => {
                let mime = prediction["mimeType"].as_str().unwrap_or("image/png");
                Ok(format!("data:{};base64,{}", mime, bytes))
            }
            None => bail!("Image generation returned no image. Try a different prompt."),
        }
    }
}
