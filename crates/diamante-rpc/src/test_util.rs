//! Canned-response HTTP server for tests.
//!
//! Serves fixed JSON responses per `(method, path)` on a loopback port and
//! records every request it receives. Unrouted requests get a 404 problem
//! document, like the ledger does for unknown accounts.

use http_body_util::{BodyExt, Full};
use hyper::{body::Bytes, server::conn::http1, service::service_fn, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A response the server hands back for a route.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
}

impl MockResponse {
    /// 200 with a JSON body.
    pub fn ok(body: serde_json::Value) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
        }
    }

    /// Arbitrary status with a raw body.
    pub fn status(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

/// A request as seen by the server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

type Route = (String, String, MockResponse);

pub struct MockServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: JoinHandle<()>,
}

impl MockServer {
    /// Start serving `(method, path, response)` routes on a random port.
    pub async fn start<P: Into<String>>(routes: Vec<(&str, P, MockResponse)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("mock server address");

        let routes: Arc<Vec<Route>> = Arc::new(
            routes
                .into_iter()
                .map(|(m, p, r)| (m.to_string(), p.into(), r))
                .collect(),
        );
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = requests.clone();
        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let io = TokioIo::new(stream);
                let routes = routes.clone();
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    let service = service_fn(|req| {
                        handle_request(req, routes.clone(), recorded.clone())
                    });
                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        log::debug!("mock server connection error: {:?}", err);
                    }
                });
            }
        });

        Self {
            addr,
            requests,
            handle,
        }
    }

    /// Base URL of the server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("request log").clone()
    }

    /// A loopback URL nothing is listening on.
    pub fn unreachable_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
        let addr = listener.local_addr().expect("free port address");
        drop(listener);
        format!("http://{}", addr)
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_request(
    req: Request<hyper::body::Incoming>,
    routes: Arc<Vec<Route>>,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let body = match req.into_body().collect().await {
        Ok(collected) => String::from_utf8_lossy(&collected.to_bytes()).to_string(),
        Err(_) => String::new(),
    };

    let response = routes
        .iter()
        .find(|(m, p, _)| *m == method && *p == path)
        .map(|(_, _, r)| r.clone())
        .unwrap_or_else(|| {
            MockResponse::status(404, r#"{"title":"Resource Missing","status":404}"#)
        });

    recorded
        .lock()
        .expect("request log")
        .push(RecordedRequest { method, path, body });

    let mut resp = Response::new(Full::new(Bytes::from(response.body)));
    *resp.status_mut() =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    resp.headers_mut().insert(
        hyper::header::CONTENT_TYPE,
        hyper::header::HeaderValue::from_static("application/json"),
    );
    Ok(resp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_kept_alive_connection_serves_every_request() {
        let server = MockServer::start(vec![
            ("GET", "/a", MockResponse::ok(json!({ "n": 1 }))),
            ("GET", "/b", MockResponse::ok(json!({ "n": 2 }))),
        ])
        .await;
        let client = reqwest::Client::new();

        for path in ["/a", "/b", "/a"] {
            let resp = client
                .get(format!("{}{}", server.url(), path))
                .send()
                .await
                .unwrap();
            assert_eq!(resp.status().as_u16(), 200);
        }

        let paths: Vec<_> = server.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["/a", "/b", "/a"]);
    }

    #[tokio::test]
    async fn test_chunked_body_is_recorded() {
        let server = MockServer::start(vec![(
            "POST",
            "/fund-account",
            MockResponse::ok(json!({ "message": "ok" })),
        )])
        .await;

        let mut stream = tokio::net::TcpStream::connect(server.addr).await.unwrap();
        stream
            .write_all(
                b"POST /fund-account HTTP/1.1\r\n\
                  Host: localhost\r\n\
                  Transfer-Encoding: chunked\r\n\
                  Connection: close\r\n\r\n\
                  6\r\n{\"a\":1\r\n1\r\n}\r\n0\r\n\r\n",
            )
            .await
            .unwrap();
        let mut reply = Vec::new();
        stream.read_to_end(&mut reply).await.unwrap();

        assert!(reply.starts_with(b"HTTP/1.1 200"));
        let reqs = server.requests();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].body, r#"{"a":1}"#);
    }

    #[tokio::test]
    async fn test_unrouted_is_not_found() {
        let server = MockServer::start(Vec::<(&str, &str, MockResponse)>::new()).await;
        let resp = reqwest::get(format!("{}/accounts/GX", server.url()))
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 404);
        assert_eq!(server.requests()[0].method, "GET");
    }
}
