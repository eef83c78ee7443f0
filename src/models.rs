use std::{fmt, str::FromStr};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_AI_MODE: &str = "Cinematic";
pub const DEFAULT_DURATION_SECS: u32 = 30;
pub const MIN_DURATION_SECS: u32 = 5;
pub const MAX_DURATION_SECS: u32 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    #[default]
    Standard,
    Hd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoType {
    Ad,
    #[default]
    Shorts,
    Video,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Landscape,
    #[default]
    #[serde(rename = "9:16")]
    Portrait,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    #[default]
    Upload,
    Url,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Ready,
    Failed,
}

/// Returned by the `FromStr` impls when a form value names no known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized {field} value: {value:?}")]
pub struct UnknownVariant {
    pub field: &'static str,
    pub value: String,
}

macro_rules! form_enum {
    ($ty:ty, $field:literal, { $($text:literal => $variant:path),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($variant => $text,)+
                }
            }
        }

        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                $(if trimmed.eq_ignore_ascii_case($text) { return Ok($variant); })+
                Err(UnknownVariant { field: $field, value: s.to_string() })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

form_enum!(Quality, "quality", { "standard" => Quality::Standard, "hd" => Quality::Hd });
form_enum!(VideoType, "videoType", { "ad" => VideoType::Ad, "shorts" => VideoType::Shorts, "video" => VideoType::Video });
form_enum!(AspectRatio, "aspectRatio", { "1:1" => AspectRatio::Square, "16:9" => AspectRatio::Landscape, "9:16" => AspectRatio::Portrait });
form_enum!(InputSource, "inputSource", { "upload" => InputSource::Upload, "url" => InputSource::Url });
form_enum!(JobStatus, "status", {
    "queued" => JobStatus::Queued,
    "processing" => JobStatus::Processing,
    "ready" => JobStatus::Ready,
    "failed" => JobStatus::Failed,
});

/// Image bytes received in the `characterImage` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub file_name: Option<String>,
    pub mime_type: String,
    pub data: Bytes,
}

/// The authoritative character reference, already resolved from `inputSource`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharacterSource {
    Upload(UploadedImage),
    Url(String),
}

/// A submission that passed server-side validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub description: String,
    pub quality: Quality,
    pub ai_mode: String,
    pub video_type: VideoType,
    pub duration: u32,
    pub aspect_ratio: AspectRatio,
    pub character: CharacterSource,
}

impl GenerationRequest {
    pub fn input_source(&self) -> InputSource {
        match self.character {
            CharacterSource::Upload(_) => InputSource::Upload,
            CharacterSource::Url(_) => InputSource::Url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub job_id: String,
    pub status: JobStatus,
    pub quality: Quality,
    pub video_url: String,
    pub thumbnail_url: String,
    pub character_reference: String,
    pub message: String,
    pub synopsis: String,
    pub video_type: VideoType,
    pub aspect_ratio: AspectRatio,
    pub duration: u32,
    pub ai_mode: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
