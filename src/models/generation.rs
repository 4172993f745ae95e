use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const STYLE_PRESETS: [&str; 6] = [
    "Photorealistic",
    "Anime",
    "Fantasy",
    "Cyberpunk",
    "Minimalist",
    "3D Render",
];

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "4:3")]
    Standard,
    #[serde(rename = "3:4")]
    Tall,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Square,
        AspectRatio::Landscape,
        AspectRatio::Portrait,
        AspectRatio::Standard,
        AspectRatio::Tall,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Standard => "4:3",
            AspectRatio::Tall => "3:4",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unsupported aspect ratio: {0}")]
pub struct UnknownAspectRatio(String);

impl FromStr for AspectRatio {
    type Err = UnknownAspectRatio;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AspectRatio::ALL
            .into_iter()
            .find(|ratio| ratio.as_str() == s.trim())
            .ok_or_else(|| UnknownAspectRatio(s.to_string()))
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct GenerationConfig {
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
    pub negative_prompt: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct GeneratedImage {
    pub id: String,
    pub src: String,
    pub prompt: String,
}

impl GeneratedImage {
    pub fn new(src: String, prompt: &str) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            src,
            prompt: prompt.to_string(),
        }
    }

    pub fn download_file_name(&self) -> String {
        let head: String = self.prompt.chars().take(30).collect();
        let mut name = String::with_capacity(head.len() + 4);
        let mut in_space = false;
        for c in head.chars() {
            if c.is_whitespace() {
                if !in_space {
                    name.push('_');
                }
                in_space = true;
            } else {
                name.push(c);
                in_space = false;
            }
        }
        name.push_str(".png");
        name
    }
}
