#![allow(dead_code)]

use image::{DynamicImage, Rgba, RgbaImage};
use roast_core::{FeatureDescription, FeatureExtractor, Mode, RoastService};
use roast_core::ConversationAgent;
use roast_providers::{CompletionClient, GroqVision};
use serde_json::{json, Value};
use std::io::Cursor;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "test-key";

pub fn completion(content: &str) -> Value {
    json!({
        "id": "cmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

pub async fn mount_reply(server: &MockServer, content: &str) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(content)))
        .mount(server)
        .await;
}

pub async fn mount_status(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(status).set_body_string("upstream exploded"))
        .mount(server)
        .await;
}

pub fn client(server: &MockServer) -> CompletionClient {
    CompletionClient::new(&server.uri(), API_KEY).unwrap()
}

pub fn agent(chat: &MockServer, mode: Mode) -> ConversationAgent {
    ConversationAgent::new(
        client(chat),
        "dobby",
        FeatureDescription::new("short hair, glasses"),
        mode,
    )
}

pub fn service(vision: &MockServer, chat: &MockServer) -> RoastService {
    let extractor = FeatureExtractor::new(std::sync::Arc::new(GroqVision::new(
        client(vision),
        "vision-model",
    )));
    RoastService::new(extractor, client(chat), "dobby")
}

/// Bodies of every request the server has received, in arrival order
pub async fn request_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| r.body_json::<Value>().unwrap())
        .collect()
}

/// A small RGBA image with a transparent half
pub fn rgba_image() -> DynamicImage {
    let mut img = RgbaImage::from_pixel(8, 8, Rgba([30, 60, 90, 255]));
    for y in 0..8 {
        for x in 0..4 {
            img.put_pixel(x, y, Rgba([0, 0, 0, 0]));
        }
    }
    DynamicImage::ImageRgba8(img)
}

pub fn png_bytes(image: &DynamicImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}
