//! Canned-response raffle API served over real HTTP for integration tests.

#![allow(dead_code)]

use actix_web::{
    App,
    HttpRequest,
    HttpResponse,
    HttpServer,
    dev::ServerHandle,
    http::StatusCode,
    web,
};
use std::{
    collections::HashMap,
    net::TcpListener,
    sync::Mutex,
    thread::JoinHandle,
};

pub const PREFIX: &str = "/api/v1/raffle";

#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: String,
    pub content_type: String,
    pub body: String,
}

impl Recorded {
    pub fn json_body(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

#[derive(Default)]
struct MockState {
    replies: Mutex<HashMap<String, (u16, String)>>,
    requests: Mutex<Vec<Recorded>>,
}

pub struct MockRaffleServer {
    base_url: String,
    state: web::Data<MockState>,
    server_handle: ServerHandle,
    server_thread: Option<JoinHandle<()>>,
}

impl MockRaffleServer {
    pub fn start() -> Self {
        let listener = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let address = listener.local_addr().unwrap();
        let base_url = format!("http://{address}");
        let state = web::Data::new(MockState::default());

        let server_state = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(server_state.clone())
                .default_service(web::to(handle_any))
        })
        .workers(1)
        .listen(listener)
        .unwrap()
        .run();

        let server_handle = server.handle();
        let server_thread = std::thread::spawn(move || {
            let sys = actix_web::rt::System::new();
            let _ = sys.block_on(server);
        });

        Self {
            base_url,
            state,
            server_handle,
            server_thread: Some(server_thread),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Serves `body` with HTTP 200 for `path` (relative to the API prefix).
    pub fn reply(&self, path: &str, body: serde_json::Value) {
        self.reply_raw(path, 200, body.to_string());
    }

    pub fn reply_raw(&self, path: &str, status: u16, body: impl Into<String>) {
        self.state
            .replies
            .lock()
            .unwrap()
            .insert(format!("{PREFIX}{path}"), (status, body.into()));
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Recorded {
        self.requests().pop().expect("no request recorded")
    }
}

impl Drop for MockRaffleServer {
    fn drop(&mut self) {
        let _ = self.server_handle.stop(false);
        if let Some(thread) = self.server_thread.take() {
            let _ = thread.join();
        }
    }
}

async fn handle_any(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<MockState>,
) -> HttpResponse {
    let recorded = Recorded {
        method: req.method().to_string(),
        path: req.path().to_string(),
        query: req.query_string().to_string(),
        content_type: req
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string(),
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    state.requests.lock().unwrap().push(recorded);
    let reply = state.replies.lock().unwrap().get(req.path()).cloned();
    match reply {
        Some((status, body)) => HttpResponse::build(
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        )
        .content_type("application/json")
        .body(body),
        None => HttpResponse::NotFound().finish(),
    }
}
