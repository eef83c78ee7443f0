use character_video_studio::{
    client::{ClientError, FormController, HttpTransport, SelectedFile},
    config::{Config, DEFAULT_HD_VIDEO},
    models::{AspectRatio, InputSource, JobStatus, Quality, VideoType},
    routes,
};
use pretty_assertions::assert_eq;

async fn spawn_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = routes::router(&Config::default());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn preview_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("roundtrip-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[tokio::test]
async fn url_submission_round_trips() {
    let base = spawn_server().await;
    let mut controller = FormController::with_preview_dir(HttpTransport::new(base), preview_dir());
    controller.set_description("A hero unveils a product");
    controller.set_quality(Quality::Hd);
    controller.set_video_type(VideoType::Ad);
    controller.set_aspect_ratio(AspectRatio::Landscape);
    controller.set_duration(45);
    controller.set_ai_mode("Cinematic+");
    controller.set_input_source(InputSource::Url);
    controller.set_image_url("https://example.com/hero.png");

    let result = controller.submit().await.unwrap().clone();
    assert_eq!(result.status, JobStatus::Ready);
    assert_eq!(result.video_url, DEFAULT_HD_VIDEO);
    assert_eq!(result.character_reference, "https://example.com/hero.png");
    assert!(result.message.contains("45s"));
    assert_eq!(controller.error(), None);
}

#[tokio::test]
async fn upload_submission_round_trips() {
    let base = spawn_server().await;
    let mut controller = FormController::with_preview_dir(HttpTransport::new(base), preview_dir());
    controller.set_description("a knight at dawn");
    let file = SelectedFile::new("knight.png", b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR".to_vec(), None);
    controller.select_file(Some(file)).unwrap();
    assert!(controller.preview_path().is_some());

    let result = controller.submit().await.unwrap();
    assert!(result.character_reference.starts_with("data:image/png;base64,"));
    assert_eq!(result.synopsis, "a knight at dawn");
}

#[tokio::test]
async fn unreachable_server_is_reported() {
    // nothing listens on port 9 locally
    let mut controller =
        FormController::with_preview_dir(HttpTransport::new("http://127.0.0.1:9"), preview_dir());
    controller.set_description("hero");
    controller.set_image_url("https://example.com/hero.png");

    let err = controller.submit().await.unwrap_err();
    assert!(matches!(err, ClientError::Http(_)), "{err:?}");
    assert!(controller.error().is_some());
    assert!(controller.result().is_none());
}

#[tokio::test]
async fn server_rejection_is_shown_verbatim() {
    let base = spawn_server().await;
    let mut controller = FormController::with_preview_dir(HttpTransport::new(base), preview_dir());
    controller.set_description("a knight at dawn");
    // passes the client's checks, but the server treats a zero-byte part as no file
    let empty = SelectedFile::new("empty.png", Vec::<u8>::new(), Some("image/png".into()));
    controller.select_file(Some(empty)).unwrap();

    let err = controller.submit().await.unwrap_err();
    assert!(matches!(err, ClientError::Server { status: 400, .. }), "{err:?}");
    assert_eq!(controller.error(), Some("Character image upload is required."));
    assert!(controller.result().is_none());
}

#[tokio::test]
async fn non_json_failure_falls_back_to_status_text() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = axum::Router::new().route(
        "/api/generate",
        axum::routing::post(|| async { (axum::http::StatusCode::BAD_GATEWAY, "upstream down") }),
    );
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let mut controller =
        FormController::with_preview_dir(HttpTransport::new(format!("http://{addr}")), preview_dir());
    controller.set_description("hero");
    controller.set_image_url("https://example.com/hero.png");

    let err = controller.submit().await.unwrap_err();
    assert!(matches!(err, ClientError::Server { status: 502, .. }), "{err:?}");
    assert_eq!(controller.error(), Some("Request failed with status 502 Bad Gateway"));
}
