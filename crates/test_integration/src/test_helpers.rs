use crate::runner::context::test_context::TestContext;
use axum::Router;
use axum::routing::get;
use color_eyre::Result;
use common_types::{PhotoSummary, PhotoUploadRequest};
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use reqwest::StatusCode;
use serde_json::Value;
use std::io::Cursor;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x * 2) as u8, (y * 2) as u8, 128]));
    let mut out = Cursor::new(vec![]);
    img.write_to(&mut out, ImageFormat::Jpeg)
        .expect("encoding a jpeg in memory");
    out.into_inner()
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, _| Rgba([200, 0, 0, (x * 4) as u8]));
    let mut out = Cursor::new(vec![]);
    img.write_to(&mut out, ImageFormat::Png)
        .expect("encoding a png in memory");
    out.into_inner()
}

/// Serves the source images uploads point at. Unknown paths are 404.
pub async fn serve_sources() -> Result<(String, JoinHandle<()>)> {
    let router = Router::new()
        .route("/a1.jpg", get(|| async { jpeg(120, 80) }))
        .route("/b2.jpg", get(|| async { jpeg(60, 140) }))
        .route("/logo.png", get(|| async { png(50, 30) }));
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    Ok((format!("http://{address}"), handle))
}

pub fn upload_item(
    context: &TestContext,
    filename: &str,
    mime_type: &str,
    id: &str,
) -> PhotoUploadRequest {
    PhotoUploadRequest::builder()
        .source_url(format!("{}/{filename}", context.sources_url))
        .filename(filename)
        .mime_type(mime_type)
        .id(id)
        .build()
}

pub async fn list_photos(context: &TestContext) -> Result<Vec<PhotoSummary>> {
    let response = context
        .http_client
        .get(context.url("/photos/list"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(response.json().await?)
}

/// Asserts the `{error, code}` body every failing route returns.
pub async fn assert_error(response: reqwest::Response, expected: StatusCode) -> Result<String> {
    assert_eq!(response.status(), expected);
    let body: Value = response.json().await?;
    assert_eq!(body["code"], expected.as_u16());
    let message = body["error"].as_str().unwrap_or_default().to_string();
    assert!(!message.is_empty(), "error body without a message: {body}");
    Ok(message)
}
