use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    config::Config,
    error::{ApiError, DESCRIPTION_REQUIRED, UPLOAD_REQUIRED, URL_REQUIRED},
    generator::PlaceholderStudio,
    models::{
        CharacterSource, GenerationRequest, GenerationResult, InputSource, UploadedImage,
        DEFAULT_AI_MODE, DEFAULT_DURATION_SECS,
    },
};

const FALLBACK_MIME: &str = "application/octet-stream";

#[derive(Clone)]
pub struct AppState {
    pub studio: Arc<PlaceholderStudio>,
}

pub fn router(config: &Config) -> Router {
    let state = AppState {
        studio: Arc::new(PlaceholderStudio::new(config.assets.clone())),
    };

    Router::new()
        .route("/api/generate", post(generate))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn generate(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<GenerationResult>, ApiError> {
    let submission = FormSubmission::read(multipart?).await?;
    let request = submission.validate()?;

    info!(
        "🚀 Generating {} {} ({}, {}s) for: {}",
        request.quality,
        request.video_type,
        request.aspect_ratio,
        request.duration,
        request.description
    );

    let result = state.studio.synthesize(request);
    info!("✅ Job {} ready", result.job_id);
    Ok(Json(result))
}

/// The multipart fields as received, before any rule is applied.
#[derive(Debug, Default)]
pub struct FormSubmission {
    pub description: Option<String>,
    pub quality: Option<String>,
    pub ai_mode: Option<String>,
    pub video_type: Option<String>,
    pub duration: Option<String>,
    pub aspect_ratio: Option<String>,
    pub input_source: Option<String>,
    pub character_image_url: Option<String>,
    pub character_image: Option<UploadedImage>,
}

impl FormSubmission {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "characterImage" => {
                    let file_name = field.file_name().map(str::to_string);
                    let mime_type = field
                        .content_type()
                        .filter(|ct| !ct.is_empty())
                        .unwrap_or(FALLBACK_MIME)
                        .to_string();
                    let data = field.bytes().await?;
                    // Browsers send an empty part when no file was chosen.
                    if !data.is_empty() {
                        form.character_image = Some(UploadedImage { file_name, mime_type, data });
                    }
                }
                "description" => form.description = Some(field.text().await?),
                "quality" => form.quality = Some(field.text().await?),
                "aiMode" => form.ai_mode = Some(field.text().await?),
                "videoType" => form.video_type = Some(field.text().await?),
                "duration" => form.duration = Some(field.text().await?),
                "aspectRatio" => form.aspect_ratio = Some(field.text().await?),
                "inputSource" => form.input_source = Some(field.text().await?),
                "characterImageUrl" => form.character_image_url = Some(field.text().await?),
                _ => {
                    // apiKey and anything else the form sends is not consumed.
                }
            }
        }

        Ok(form)
    }

    /// Applies the server rules in order and stops at the first failure.
    pub fn validate(self) -> Result<GenerationRequest, ApiError> {
        let description = non_empty(self.description).ok_or(ApiError::Validation(DESCRIPTION_REQUIRED))?;

        let character = match lenient::<InputSource>(self.input_source.as_deref()) {
            InputSource::Upload => self
                .character_image
                .map(CharacterSource::Upload)
                .ok_or(ApiError::Validation(UPLOAD_REQUIRED))?,
            InputSource::Url => non_empty(self.character_image_url)
                .map(CharacterSource::Url)
                .ok_or(ApiError::Validation(URL_REQUIRED))?,
        };

        let duration = match self.duration.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_DURATION_SECS,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(value = raw, "unparseable duration, using default");
                DEFAULT_DURATION_SECS
            }),
        };

        Ok(GenerationRequest {
            description,
            quality: lenient(self.quality.as_deref()),
            ai_mode: non_empty(self.ai_mode).unwrap_or_else(|| DEFAULT_AI_MODE.to_string()),
            video_type: lenient(self.video_type.as_deref()),
            duration,
            aspect_ratio: lenient(self.aspect_ratio.as_deref()),
            character,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Unknown or missing enum values resolve to the default rather than failing the request.
fn lenient<T>(raw: Option<&str>) -> T
where
    T: std::str::FromStr<Err = crate::models::UnknownVariant> + Default,
{
    match raw.map(str::trim) {
        None | Some("") => T::default(),
        Some(value) => value.parse().unwrap_or_else(|e| {
            warn!("{}, using default", e);
            T::default()
        }),
    }
}
