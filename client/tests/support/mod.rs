//! Shared helpers for client integration tests.
//!
//! [`StubServer`] is a real Actix server on an ephemeral port that answers
//! every request from a queue of scripted responses and records what it
//! received, so the reqwest adapters are exercised over real sockets.

use std::collections::VecDeque;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use actix_web::dev::ServerHandle;
use actix_web::http::StatusCode;
use actix_web::http::header::{ACCEPT, AUTHORIZATION, HeaderName};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};

/// One request as seen by the stub.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub authorization: Option<String>,
    pub accept: Option<String>,
    pub body: String,
}

#[derive(Clone, Default)]
struct StubState {
    responses: Arc<Mutex<VecDeque<(u16, String)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

async fn respond(
    request: HttpRequest,
    body: web::Bytes,
    state: web::Data<StubState>,
) -> HttpResponse {
    let header = |name: HeaderName| {
        request
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };
    state
        .requests
        .lock()
        .expect("requests lock")
        .push(RecordedRequest {
            method: request.method().to_string(),
            path: request.path().to_owned(),
            query: request.query_string().to_owned(),
            authorization: header(AUTHORIZATION),
            accept: header(ACCEPT),
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    let scripted = state.responses.lock().expect("responses lock").pop_front();
    match scripted {
        Some((status, body)) => {
            HttpResponse::build(StatusCode::from_u16(status).expect("valid status"))
                .content_type("application/json")
                .body(body)
        }
        None => HttpResponse::NotFound().body("no scripted response"),
    }
}

/// Scripted REST server for adapter tests.
pub struct StubServer {
    base_url: String,
    handle: ServerHandle,
    state: StubState,
}

impl StubServer {
    /// Bind to `127.0.0.1:0` and start serving on the current Actix runtime.
    pub fn start() -> Self {
        let state = StubState::default();
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let data = web::Data::new(state.clone());
        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .default_service(web::to(respond))
        })
        .disable_signals()
        .workers(1)
        .listen(listener)
        .expect("listen")
        .run();

        let handle = server.handle();
        actix_web::rt::spawn(server);
        Self {
            base_url: format!("http://{addr}"),
            handle,
            state,
        }
    }

    /// URL of `path` on this server.
    pub fn url(&self, path: &str) -> url::Url {
        url::Url::parse(&format!("{}{path}", self.base_url)).expect("valid stub URL")
    }

    /// Queue the next response.
    pub fn respond(&self, status: u16, body: impl Into<String>) -> &Self {
        self.state
            .responses
            .lock()
            .expect("responses lock")
            .push_back((status, body.into()));
        self
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("requests lock").clone()
    }

    pub async fn stop(self) {
        self.handle.stop(true).await;
    }
}

/// JSON for one bulletin post.
pub fn entry_json(id: u32) -> String {
    format!(
        r#"{{"id":"{id}","title":"Post {id}","content":"Body {id}","createdAt":"2021-01-0{day}T00:00:00.000Z"}}"#,
        day = id % 9 + 1
    )
}

/// JSON for one page of bulletin posts with ids `ids`.
pub fn page_json(current_page: u32, page_size: u32, total_records: u64, ids: &[u32]) -> String {
    let total_pages = total_records.div_ceil(u64::from(page_size));
    let records = ids.iter().map(|id| entry_json(*id)).collect::<Vec<_>>();
    format!(
        r#"{{"page":{{"currentPage":{current_page},"pageSize":{page_size},"totalPages":{total_pages},"totalRecords":{total_records}}},"records":[{}]}}"#,
        records.join(",")
    )
}
