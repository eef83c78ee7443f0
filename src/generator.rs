use base64::Engine;
use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use tracing::info;

use crate::{
    config::PlaceholderAssets,
    models::{CharacterSource, GenerationRequest, GenerationResult, JobStatus, Quality, UploadedImage},
};

const JOB_SUFFIX_LEN: usize = 8;

/// Stands in for a video backend: every request comes back `ready` with placeholder media.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderStudio {
    assets: PlaceholderAssets,
}

impl PlaceholderStudio {
    pub fn new(assets: PlaceholderAssets) -> Self {
        Self { assets }
    }

    pub fn assets(&self) -> &PlaceholderAssets {
        &self.assets
    }

    pub fn video_url(&self, quality: Quality) -> &str {
        match quality {
            Quality::Standard => &self.assets.standard_video,
            Quality::Hd => &self.assets.hd_video,
        }
    }

    pub fn synthesize(&self, request: GenerationRequest) -> GenerationResult {
        let job_id = new_job_id();
        let character_reference = match &request.character {
            CharacterSource::Upload(image) => to_data_uri(image),
            CharacterSource::Url(url) => url.clone(),
        };
        info!(
            "🎬 Job {} ({} input): {}",
            job_id,
            request.input_source(),
            preview(&character_reference)
        );

        GenerationResult {
            message: compose_message(&request),
            video_url: self.video_url(request.quality).to_string(),
            thumbnail_url: self.assets.thumbnail.clone(),
            status: JobStatus::Ready,
            quality: request.quality,
            video_type: request.video_type,
            aspect_ratio: request.aspect_ratio,
            duration: request.duration,
            synopsis: request.description,
            ai_mode: request.ai_mode,
            character_reference,
            job_id,
            created_at: Utc::now(),
        }
    }
}

/// `job_<unix millis>_<random alphanumerics>`; unique enough for display, not a secret.
pub fn new_job_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(JOB_SUFFIX_LEN)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect();
    format!("job_{}_{}", Utc::now().timestamp_millis(), suffix)
}

pub fn to_data_uri(image: &UploadedImage) -> String {
    let payload = base64::engine::general_purpose::STANDARD.encode(&image.data);
    format!("data:{};base64,{}", image.mime_type, payload)
}

pub fn compose_message(request: &GenerationRequest) -> String {
    format!(
        "{} render queued as {} {} at {}, {}s long.",
        request.ai_mode,
        request.quality.as_str().to_uppercase(),
        request.video_type,
        request.aspect_ratio,
        request.duration
    )
}

fn preview(reference: &str) -> String {
    if reference.len() > 50 {
        let head: String = reference.chars().take(50).collect();
        format!("{}...[{} chars total]", head, reference.len())
    } else {
        reference.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AspectRatio, VideoType};
    use bytes::Bytes;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn url_request(quality: Quality) -> GenerationRequest {
        GenerationRequest {
            description: "A hero unveils a product".into(),
            quality,
            ai_mode: "Cinematic+".into(),
            video_type: VideoType::Ad,
            duration: 45,
            aspect_ratio: AspectRatio::Landscape,
            character: CharacterSource::Url("https://example.com/hero.png".into()),
        }
    }

    #[test]
    fn message_interpolates_every_parameter() {
        assert_eq!(
            compose_message(&url_request(Quality::Hd)),
            "Cinematic+ render queued as HD ad at 16:9, 45s long."
        );
    }

    #[test]
    fn quality_picks_the_placeholder_video() {
        let studio = PlaceholderStudio::default();
        let hd = studio.synthesize(url_request(Quality::Hd));
        let standard = studio.synthesize(url_request(Quality::Standard));
        assert_eq!(hd.video_url, studio.assets().hd_video);
        assert_eq!(standard.video_url, studio.assets().standard_video);
        assert_eq!(hd.thumbnail_url, standard.thumbnail_url);
    }

    #[test]
    fn url_reference_passes_through() {
        let result = PlaceholderStudio::default().synthesize(url_request(Quality::Hd));
        assert_eq!(result.status, JobStatus::Ready);
        assert_eq!(result.character_reference, "https://example.com/hero.png");
        assert_eq!(result.synopsis, "A hero unveils a product");
    }

    #[test]
    fn upload_becomes_data_uri() {
        let image = UploadedImage {
            file_name: Some("hero.png".into()),
            mime_type: "image/png".into(),
            data: Bytes::from_static(b"hello"),
        };
        assert_eq!(to_data_uri(&image), "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn job_ids_do_not_repeat() {
        let ids: HashSet<String> = (0..500).map(|_| new_job_id()).collect();
        assert_eq!(ids.len(), 500);
        assert!(ids.iter().all(|id| id.starts_with("job_")));
    }
}
