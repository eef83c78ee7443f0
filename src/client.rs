//! Form controller for the generation endpoint.
//!
//! [`FormController`] owns the field state, checks it before anything goes
//! over the wire, and keeps the last [`GenerationResult`] (or error message)
//! for whatever renders the form. The network hop sits behind
//! [`GenerationTransport`]; [`HttpTransport`] is the reqwest implementation.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{multipart, Client};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{
    AspectRatio, CharacterSource, ErrorBody, GenerationRequest, GenerationResult, InputSource,
    Quality, UploadedImage, VideoType, DEFAULT_AI_MODE, DEFAULT_DURATION_SECS, MAX_DURATION_SECS,
    MIN_DURATION_SECS,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Please describe the video you want to generate.")]
    DescriptionRequired,
    #[error("Please choose a character image to upload.")]
    ImageRequired,
    #[error("The selected file is not an image ({0}).")]
    ImageNotAnImage(String),
    #[error("Please enter a character image URL.")]
    UrlRequired,
    #[error("Duration must be between 5 and 180 seconds (got {0}).")]
    DurationOutOfRange(u32),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("Network error: {0}")]
    Http(String),
    /// Carries the server's own `error` text so it can be shown as-is.
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("Unexpected response: {0}")]
    Decode(String),
    #[error("Invalid MIME type for upload: {0}")]
    InvalidMime(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A file the user picked for the character reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: Option<String>,
    pub data: Bytes,
}

impl SelectedFile {
    /// Falls back to sniffing the magic bytes when the picker gave no MIME type.
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>, mime_type: Option<String>) -> Self {
        let data = data.into();
        let mime_type = mime_type
            .filter(|m| !m.trim().is_empty())
            .or_else(|| sniff_mime(&data));
        Self { name: name.into(), mime_type, data }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "character".to_string());
        Ok(Self::new(name, data, None))
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.as_deref().is_some_and(|m| m.starts_with("image/"))
    }
}

fn sniff_mime(data: &[u8]) -> Option<String> {
    image::guess_format(data).ok().map(|f| f.to_mime_type().to_string())
}

/// Which character reference the form is collecting. Only the active variant
/// exists, so there is never a question of which one counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharacterInput {
    Upload(Option<SelectedFile>),
    Url(String),
}

impl Default for CharacterInput {
    fn default() -> Self {
        Self::Upload(None)
    }
}

impl CharacterInput {
    pub fn source(&self) -> InputSource {
        match self {
            Self::Upload(_) => InputSource::Upload,
            Self::Url(_) => InputSource::Url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub description: String,
    pub quality: Quality,
    pub ai_mode: String,
    pub video_type: VideoType,
    pub duration: u32,
    pub aspect_ratio: AspectRatio,
    pub character: CharacterInput,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            description: String::new(),
            quality: Quality::default(),
            ai_mode: DEFAULT_AI_MODE.to_string(),
            video_type: VideoType::default(),
            duration: DEFAULT_DURATION_SECS,
            aspect_ratio: AspectRatio::default(),
            character: CharacterInput::default(),
        }
    }
}

impl FormState {
    pub fn validate(&self) -> Result<GenerationRequest, FormError> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(FormError::DescriptionRequired);
        }

        let character = match &self.character {
            CharacterInput::Upload(None) => return Err(FormError::ImageRequired),
            CharacterInput::Upload(Some(file)) if !file.is_image() => {
                let mime = file.mime_type.clone().unwrap_or_else(|| "unknown type".to_string());
                return Err(FormError::ImageNotAnImage(mime));
            }
            CharacterInput::Upload(Some(file)) => CharacterSource::Upload(UploadedImage {
                file_name: Some(file.name.clone()),
                mime_type: file.mime_type.clone().unwrap_or_default(),
                data: file.data.clone(),
            }),
            CharacterInput::Url(url) => {
                let url = url.trim();
                if url.is_empty() {
                    return Err(FormError::UrlRequired);
                }
                CharacterSource::Url(url.to_string())
            }
        };

        if !(MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(&self.duration) {
            return Err(FormError::DurationOutOfRange(self.duration));
        }

        Ok(GenerationRequest {
            description: description.to_string(),
            quality: self.quality,
            ai_mode: self.ai_mode.trim().to_string(),
            video_type: self.video_type,
            duration: self.duration,
            aspect_ratio: self.aspect_ratio,
            character,
        })
    }
}

#[async_trait]
pub trait GenerationTransport: Send + Sync {
    async fn send(&self, request: &GenerationRequest) -> Result<GenerationResult, ClientError>;
}

pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }
}

pub fn to_multipart(request: &GenerationRequest) -> Result<multipart::Form, ClientError> {
    let form = multipart::Form::new()
        .text("description", request.description.clone())
        .text("quality", request.quality.as_str())
        .text("aiMode", request.ai_mode.clone())
        .text("videoType", request.video_type.as_str())
        .text("duration", request.duration.to_string())
        .text("aspectRatio", request.aspect_ratio.as_str())
        .text("inputSource", request.input_source().as_str());

    let form = match &request.character {
        CharacterSource::Url(url) => form.text("characterImageUrl", url.clone()),
        CharacterSource::Upload(image) => {
            let part = multipart::Part::bytes(image.data.to_vec())
                .file_name(image.file_name.clone().unwrap_or_else(|| "character".to_string()))
                .mime_str(&image.mime_type)
                .map_err(|_| ClientError::InvalidMime(image.mime_type.clone()))?;
            form.part("characterImage", part)
        }
    };
    Ok(form)
}

#[async_trait]
impl GenerationTransport for HttpTransport {
    async fn send(&self, request: &GenerationRequest) -> Result<GenerationResult, ClientError> {
        let url = self.endpoint();
        info!("🔗 Submitting generation request to: {}", url);

        let response = self
            .client
            .post(&url)
            .multipart(to_multipart(request)?)
            .send()
            .await
            .map_err(|e| ClientError::Http(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ClientError::Http(e.to_string()))?;
        info!("📥 Response status: {}", status);

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| format!("Request failed with status {}", status));
            warn!("❌ Generation rejected: {}", message);
            return Err(ClientError::Server { status: status.as_u16(), message });
        }

        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

/// A copy of the selected image on disk, for previewing. The file is removed on drop.
#[derive(Debug)]
pub struct PreviewFile {
    path: PathBuf,
}

impl PreviewFile {
    pub fn create_in(dir: &Path, file: &SelectedFile) -> io::Result<Self> {
        let extension = file
            .mime_type
            .as_deref()
            .and_then(image::ImageFormat::from_mime_type)
            .and_then(|f| f.extensions_str().first().copied())
            .unwrap_or("bin");
        let path = dir.join(format!("character-preview-{}.{}", Uuid::new_v4(), extension));
        fs::write(&path, &file.data)?;
        debug!(path = %path.display(), "created preview file");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PreviewFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "released preview file"),
            Err(e) => warn!(path = %self.path.display(), error = %e, "could not remove preview file"),
        }
    }
}

pub struct FormController<T> {
    transport: T,
    state: FormState,
    preview: Option<PreviewFile>,
    preview_dir: PathBuf,
    result: Option<GenerationResult>,
    error: Option<String>,
}

impl<T: GenerationTransport> FormController<T> {
    pub fn new(transport: T) -> Self {
        Self::with_preview_dir(transport, std::env::temp_dir())
    }

    pub fn with_preview_dir(transport: T, preview_dir: impl Into<PathBuf>) -> Self {
        Self {
            transport,
            state: FormState::default(),
            preview: None,
            preview_dir: preview_dir.into(),
            result: None,
            error: None,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn result(&self) -> Option<&GenerationResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn preview_path(&self) -> Option<&Path> {
        self.preview.as_ref().map(PreviewFile::path)
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.state.description = description.into();
    }

    pub fn set_quality(&mut self, quality: Quality) {
        self.state.quality = quality;
    }

    pub fn set_ai_mode(&mut self, ai_mode: impl Into<String>) {
        self.state.ai_mode = ai_mode.into();
    }

    pub fn set_video_type(&mut self, video_type: VideoType) {
        self.state.video_type = video_type;
    }

    pub fn set_duration(&mut self, duration: u32) {
        self.state.duration = duration;
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: AspectRatio) {
        self.state.aspect_ratio = aspect_ratio;
    }

    /// Switching source starts that source empty; leaving `upload` drops its preview.
    pub fn set_input_source(&mut self, source: InputSource) {
        if self.state.character.source() == source {
            return;
        }
        self.preview = None;
        self.state.character = match source {
            InputSource::Upload => CharacterInput::Upload(None),
            InputSource::Url => CharacterInput::Url(String::new()),
        };
    }

    pub fn set_image_url(&mut self, url: impl Into<String>) {
        self.preview = None;
        self.state.character = CharacterInput::Url(url.into());
    }

    /// Replaces the chosen file and releases the previous preview. Non-image
    /// selections get no preview. If the new preview cannot be written, the
    /// previous selection and its preview stay in place.
    pub fn select_file(&mut self, file: Option<SelectedFile>) -> Result<(), ClientError> {
        let preview = match file.as_ref().filter(|f| f.is_image()) {
            Some(image) => Some(PreviewFile::create_in(&self.preview_dir, image)?),
            None => None,
        };
        self.preview = preview;
        self.state.character = CharacterInput::Upload(file);
        Ok(())
    }

    /// Validates, then sends exactly one request. A validation failure keeps the
    /// previous result; any other attempt clears it first.
    pub async fn submit(&mut self) -> Result<&GenerationResult, ClientError> {
        let request = match self.state.validate() {
            Ok(request) => request,
            Err(e) => {
                self.error = Some(e.to_string());
                return Err(e.into());
            }
        };

        self.error = None;
        self.result = None;

        match self.transport.send(&request).await {
            Ok(result) => {
                info!("✅ Received job {} ({})", result.job_id, result.status);
                Ok(&*self.result.insert(result))
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
