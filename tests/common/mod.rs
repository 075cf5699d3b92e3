//! テスト用の強調サービスモック

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// モックが受け取ったmultipartフィールド
#[derive(Debug, Clone)]
pub struct ReceivedField {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// モックの応答内容
#[derive(Clone)]
pub enum Reply {
    Json(Value),
    Status(StatusCode, String),
    Raw(String),
}

#[derive(Clone)]
pub struct MockState {
    pub reply: Reply,
    pub received: Arc<Mutex<Vec<ReceivedField>>>,
}

pub struct MockServer {
    pub base_url: String,
    pub received: Arc<Mutex<Vec<ReceivedField>>>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockServer {
    pub fn fields(&self) -> Vec<ReceivedField> {
        self.received.lock().unwrap().clone()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn collect_fields(state: &MockState, mut multipart: Multipart) {
    while let Some(field) = multipart.next_field().await.expect("read multipart field") {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.expect("read field bytes").to_vec();
        state.received.lock().unwrap().push(ReceivedField {
            name,
            file_name,
            content_type,
            bytes,
        });
    }
}

fn reply(state: &MockState) -> Response {
    match &state.reply {
        Reply::Json(value) => Json(value.clone()).into_response(),
        Reply::Status(status, body) => (*status, body.clone()).into_response(),
        Reply::Raw(body) => (StatusCode::OK, body.clone()).into_response(),
    }
}

async fn enhance_handler(State(state): State<MockState>, multipart: Multipart) -> Response {
    collect_fields(&state, multipart).await;
    reply(&state)
}

async fn health_handler() -> Json<Value> {
    Json(json!({"status": "ok", "model_loaded": true}))
}

/// `/enhance`, `/enhance_video`, `/health` を持つモックサーバーを起動
pub async fn start_server(reply: Reply) -> MockServer {
    let received = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        reply,
        received: received.clone(),
    };
    let app = Router::new()
        .route("/enhance", post(enhance_handler))
        .route("/enhance_video", post(enhance_handler))
        .route("/health", get(health_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test server");
    let addr = listener.local_addr().expect("get local addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .expect("serve test app");
    });

    MockServer {
        base_url: format!("http://{addr}"),
        received,
        shutdown: Some(shutdown_tx),
    }
}

/// 10x10の赤一色PNG
pub fn red_png() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(10, 10, image::Rgb([255, 0, 0]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).expect("encode png");
    buf.into_inner()
}
