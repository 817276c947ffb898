//! HTTP client for end-to-end tests
//!
//! This module wraps reqwest and provides methods for all API endpoints.
//!
//! When API routes or request formats change, update only this file.
#![allow(dead_code)]

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ========================================================================
    // Service
    // ========================================================================

    /// GET /
    pub async fn home(&self) -> Response {
        self.client
            .get(self.url("/"))
            .send()
            .await
            .expect("Home request failed")
    }

    /// GET /api/health
    pub async fn health(&self) -> Response {
        self.client
            .get(self.url("/api/health"))
            .send()
            .await
            .expect("Health request failed")
    }

    // ========================================================================
    // Boards
    // ========================================================================

    /// POST /api/analyze-mood
    pub async fn analyze_mood(&self, description: &str) -> Response {
        self.analyze_mood_raw(json!({ "description": description }))
            .await
    }

    /// POST /api/analyze-mood with an arbitrary JSON body
    pub async fn analyze_mood_raw(&self, body: Value) -> Response {
        self.client
            .post(self.url("/api/analyze-mood"))
            .json(&body)
            .send()
            .await
            .expect("Analyze mood request failed")
    }

    /// POST /api/save-board
    pub async fn save_board(&self, board: &Value) -> Response {
        self.client
            .post(self.url("/api/save-board"))
            .json(board)
            .send()
            .await
            .expect("Save board request failed")
    }

    // ========================================================================
    // Images
    // ========================================================================

    /// GET /api/images
    pub async fn search_images(&self, query: &str, count: Option<usize>) -> Response {
        let mut params = vec![("query", query.to_string())];
        if let Some(count) = count {
            params.push(("count", count.to_string()));
        }
        self.client
            .get(self.url("/api/images"))
            .query(&params)
            .send()
            .await
            .expect("Image search request failed")
    }

    /// POST /api/generate-image
    pub async fn generate_image(&self, prompt: &str, style: Option<&str>) -> Response {
        let mut body = json!({ "prompt": prompt });
        if let Some(style) = style {
            body["style"] = json!(style);
        }
        self.client
            .post(self.url("/api/generate-image"))
            .json(&body)
            .send()
            .await
            .expect("Generate image request failed")
    }

    /// GET /api/example-prompts
    pub async fn example_prompts(&self) -> Response {
        self.client
            .get(self.url("/api/example-prompts"))
            .send()
            .await
            .expect("Example prompts request failed")
    }

    /// POST with a raw, possibly malformed body
    pub async fn post_raw(&self, path: &str, body: &str) -> Response {
        self.client
            .post(self.url(path))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("Raw request failed")
    }
}
