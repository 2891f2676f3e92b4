//! Mock YouTube Data API server for testing the client.
//!
//! The server binds to a random local port and answers `GET /youtube/v3/<endpoint>` with
//! responses queued per endpoint, in order. Every request is recorded so tests can assert on the
//! query parameters and credentials that were sent. An endpoint with nothing queued answers with
//! a 500, which makes unexpected extra requests fail loudly.

use crate::youtube_api::client::YouTubeClient;
use http_body_util::Full;
use hyper::body::{self, Bytes};
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use std::collections::{HashMap, VecDeque};
use std::convert::Infallible;
use std::sync::{Arc, Mutex};

/// One request the mock server received.
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    /// Endpoint name, e.g. `search`.
    pub endpoint: String,
    pub query: Vec<(String, String)>,
    /// Value of the `x-goog-api-key` header.
    pub api_key: Option<String>,
}

impl RecordedRequest {
    pub(crate) fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Default)]
struct MockState {
    responses: HashMap<String, VecDeque<(StatusCode, String)>>,
    requests: Vec<RecordedRequest>,
}

pub(crate) struct MockYouTube {
    base_url: String,
    state: Arc<Mutex<MockState>>,
}

impl MockYouTube {
    pub(crate) async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server to localhost");
        let addr = listener.local_addr().expect("get mock server address");
        let state = Arc::new(Mutex::new(MockState::default()));

        let server_state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Ok((conn, _)) = listener.accept().await {
                let state = Arc::clone(&server_state);
                tokio::spawn(async move {
                    let conn = hyper_util::rt::TokioIo::new(conn);
                    let service = service_fn(move |req: Request<body::Incoming>| {
                        let response = respond(&state, &req);
                        async move { Ok::<_, Infallible>(response) }
                    });
                    if let Err(e) = hyper::server::conn::http1::Builder::new()
                        .serve_connection(conn, service)
                        .await
                    {
                        tracing::debug!(error = %e, "mock connection closed with error");
                    }
                });
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// A client pointed at this server, using the key `test-key`.
    pub(crate) fn client(&self) -> YouTubeClient {
        let http = reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("building reqwest client should not fail");
        YouTubeClient::new("test-key", http).with_base_url(&self.base_url)
    }

    /// Queues a successful JSON response for `endpoint`.
    pub(crate) fn enqueue(&self, endpoint: &str, body: serde_json::Value) {
        self.enqueue_status(endpoint, StatusCode::OK, body.to_string());
    }

    /// Queues a response with an arbitrary status and body for `endpoint`.
    pub(crate) fn enqueue_status(&self, endpoint: &str, status: StatusCode, body: impl Into<String>) {
        self.state
            .lock()
            .unwrap()
            .responses
            .entry(endpoint.to_string())
            .or_default()
            .push_back((status, body.into()));
    }

    /// Every request received so far, in arrival order.
    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }
}

fn respond(state: &Mutex<MockState>, req: &Request<body::Incoming>) -> Response<Full<Bytes>> {
    let endpoint = req
        .uri()
        .path()
        .strip_prefix("/youtube/v3/")
        .unwrap_or(req.uri().path())
        .to_string();
    let query = form_urlencoded::parse(req.uri().query().unwrap_or("").as_bytes())
        .into_owned()
        .collect();
    let api_key = req
        .headers()
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let mut state = state.lock().unwrap();
    let next = state
        .responses
        .get_mut(&endpoint)
        .and_then(VecDeque::pop_front);
    state.requests.push(RecordedRequest {
        endpoint: endpoint.clone(),
        query,
        api_key,
    });
    drop(state);

    let (status, body) = next.unwrap_or_else(|| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::json!({
                "error": {
                    "code": 500,
                    "message": format!("no mock response queued for {endpoint}"),
                    "errors": [{"reason": "backendError"}]
                }
            })
            .to_string(),
        )
    });

    Response::builder()
        .status(status)
        .header("content-type", "application/json; charset=UTF-8")
        .body(Full::new(Bytes::from(body)))
        .expect("static response parts are valid")
}
