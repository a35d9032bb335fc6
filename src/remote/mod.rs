//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! Clients for the web services the review workflow talks to

use std::time::Duration;

use anyhow::Context;
use anyhow::Result;

mod codereview;
pub use codereview::*;

mod github;
pub use github::*;

mod readthedocs;
pub use readthedocs::*;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .timeout(Duration::from_secs(60))
        .build()
        .context("Building HTTP client failed")
}

/// Join `segments` onto `base`, keeping a path prefix `base` may have
pub(crate) fn endpoint(base: &url::Url, segments: &[&str]) -> Result<url::Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("Cannot use {} as base URL", base))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
pub mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::sync::Mutex;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::net::TcpStream;

    use super::*;

    /// A request as received by the stub server
    #[derive(Clone, Debug)]
    pub struct StubRequest {
        pub method: String,
        pub path: String,
        /// Header names are lower case
        pub headers: BTreeMap<String, String>,
        pub body: String,
    }

    impl StubRequest {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers.get(name).map(String::as_str)
        }

        /// The body decoded as `application/x-www-form-urlencoded`
        pub fn form(&self) -> BTreeMap<String, String> {
            url::form_urlencoded::parse(self.body.as_bytes())
                .into_owned()
                .collect()
        }
    }

    /// HTTP server on localhost answering with canned responses
    ///
    /// Responses are keyed by "METHOD /path". Requests to other routes get a 404. Every request is
    /// recorded before it is answered.
    pub struct StubServer {
        url: url::Url,
        requests: Arc<Mutex<Vec<StubRequest>>>,
    }

    impl StubServer {
        pub async fn start(routes: &[(&str, u16, &str)]) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let port = listener.local_addr().unwrap().port();
            let url = url::Url::parse(&format!("http://127.0.0.1:{}/", port)).unwrap();

            let routes = routes
                .iter()
                .map(|(route, status, body)| (route.to_string(), (*status, body.to_string())))
                .collect::<BTreeMap<_, _>>();
            let routes = Arc::new(routes);
            let requests = Arc::new(Mutex::new(Vec::new()));

            let recorded = requests.clone();
            tokio::spawn(async move {
                loop {
                    let (stream, _) = match listener.accept().await {
                        Ok(conn) => conn,
                        Err(_) => break,
                    };
                    tokio::spawn(answer(stream, routes.clone(), recorded.clone()));
                }
            });

            StubServer { url, requests }
        }

        pub fn url(&self) -> &url::Url {
            &self.url
        }

        pub fn requests(&self) -> Vec<StubRequest> {
            self.requests.lock().unwrap().clone()
        }

        /// The first request to `route` ("METHOD /path")
        pub fn request(&self, route: &str) -> Option<StubRequest> {
            self.requests()
                .into_iter()
                .find(|r| format!("{} {}", r.method, r.path) == route)
        }
    }

    async fn answer(
        mut stream: TcpStream,
        routes: Arc<BTreeMap<String, (u16, String)>>,
        requests: Arc<Mutex<Vec<StubRequest>>>,
    ) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let header_end = loop {
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let mut lines = head.split("\r\n");
        let mut request_line = lines.next().unwrap().split(' ');
        let method = request_line.next().unwrap().to_string();
        let path = request_line.next().unwrap().to_string();
        let headers = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
            .collect::<BTreeMap<_, _>>();

        let length = headers
            .get("content-length")
            .and_then(|l| l.parse::<usize>().ok())
            .unwrap_or(0);
        while buf.len() < header_end + length {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

        let route = format!("{} {}", method, path);
        let (status, response_body) = routes
            .get(&route)
            .cloned()
            .unwrap_or((404, String::new()));
        requests.lock().unwrap().push(StubRequest {
            method,
            path,
            headers,
            body,
        });

        let response = format!(
            "HTTP/1.1 {} Stub\r\n\
             Content-Type: application/json\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\r\n\
             {}",
            status,
            response_body.len(),
            response_body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        let _ = stream.shutdown().await;
    }

    #[test]
    fn test_endpoint() {
        let base = url::Url::parse("https://codereview.appspot.com").unwrap();
        assert_eq!(
            endpoint(&base, &["123", "close"]).unwrap().as_str(),
            "https://codereview.appspot.com/123/close"
        );

        let base = url::Url::parse("http://localhost:8080/prefix/").unwrap();
        assert_eq!(
            endpoint(&base, &["api", "7"]).unwrap().as_str(),
            "http://localhost:8080/prefix/api/7"
        );
    }
}
