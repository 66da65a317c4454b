/// Test-only HTTP server standing in for GeoServer and CKAN.
///
/// Every request is recorded, and the response comes from a handler the
/// test supplies, so client tests can check the method, path and body
/// actually sent over the wire.

use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedRequest {
    pub method: String,
    /// Path and query, as received.
    pub url: String,
    pub authorization: Option<String>,
    pub body: String,
}

type Handler = Box<dyn FnMut(&RecordedRequest) -> (u16, String) + Send>;

pub(crate) struct FakeServer {
    server: Arc<tiny_http::Server>,
    base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeServer {
    pub fn start<F>(handler: F) -> Self
    where
        F: FnMut(&RecordedRequest) -> (u16, String) + Send + 'static,
    {
        let server = Arc::new(tiny_http::Server::http("127.0.0.1:0").expect("bind fake server"));
        let addr = server
            .server_addr()
            .to_ip()
            .expect("fake server listens on an IP address");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let mut handler: Handler = Box::new(handler);
        let worker_server = Arc::clone(&server);
        let worker_requests = Arc::clone(&requests);
        thread::spawn(move || {
            for mut request in worker_server.incoming_requests() {
                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);
                let recorded = RecordedRequest {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    authorization: request
                        .headers()
                        .iter()
                        .find(|h| h.field.equiv("Authorization"))
                        .map(|h| h.value.as_str().to_string()),
                    body,
                };

                let (status, response_body) = handler(&recorded);
                worker_requests.lock().unwrap().push(recorded);

                let response = tiny_http::Response::from_string(response_body)
                    .with_status_code(tiny_http::StatusCode::from(status))
                    .with_header(
                        tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                            .unwrap(),
                    );
                let _ = request.respond(response);
            }
        });

        Self {
            server,
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `(method, url)` of every request so far, in arrival order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.requests()
            .into_iter()
            .map(|r| (r.method, r.url))
            .collect()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        self.server.unblock();
    }
}
