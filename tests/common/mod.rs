#![allow(dead_code)]

use axum::http::HeaderMap;
use axum::Router;
use quizcraft::config::Config;
use quizcraft::QuizClient;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// Serves `app` on an ephemeral port and returns its base URL.
pub async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock server");
    });
    format!("http://{}", addr)
}

pub fn config_for(base: &str) -> Config {
    let socket = format!("{}/ws", base.replacen("http://", "ws://", 1));
    Config::for_base_url(base, &socket)
}

pub fn client_for(config: Config) -> QuizClient {
    QuizClient::new(config).expect("client")
}

/// What the mock server saw: path, bearer header and JSON body of each request.
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Recorded>>>);

#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub auth: Option<String>,
    pub body: Value,
}

impl Recorder {
    pub fn record(&self, path: &str, headers: &HeaderMap, body: Value) {
        let auth = headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.0.lock().unwrap().push(Recorded {
            path: path.to_string(),
            auth,
            body,
        });
    }

    pub fn all(&self) -> Vec<Recorded> {
        self.0.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}
