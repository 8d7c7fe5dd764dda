//! HTTP transport for action requests.
//!
//! Each action becomes one `GET http://{server}{path_prefix}{action}`
//! request.  The action is split on `/` and every segment is
//! percent-encoded, so an action like `lights toggle` is requested as
//! `/remote/lights%20toggle`.  Only the status matters: a non-2xx answer
//! counts as a failed request.  Nothing is retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::info;

use crate::application::dispatch_keys::{ActionSender, SendError};
use crate::infrastructure::storage::config::ServerConfig;

/// [`ActionSender`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpActionSender {
    client: Client,
    server: String,
    path_prefix: String,
    timeout: Duration,
}

impl HttpActionSender {
    /// `server` is a `host:port` string; `path_prefix` is the path every
    /// action is appended to.
    ///
    /// Idle connections are not kept: every request opens its own
    /// connection, as the action server expects.
    ///
    /// # Errors
    ///
    /// Returns the `reqwest` error if the client cannot be built.
    pub fn new(
        server: impl Into<String>,
        path_prefix: impl Into<String>,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .user_agent(concat!("keypad-bridge/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            server: server.into(),
            path_prefix: path_prefix.into(),
            timeout,
        })
    }

    /// # Errors
    ///
    /// See [`HttpActionSender::new`].
    pub fn from_config(config: &ServerConfig) -> reqwest::Result<Self> {
        Self::new(
            config.address.clone(),
            config.path_prefix.clone(),
            config.request_timeout(),
        )
    }

    /// Full request URL for `action`, with each path segment percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::Protocol`] if the server address does not form a
    /// valid `http://` URL.
    pub fn request_url(&self, action: &str) -> Result<Url, SendError> {
        let mut url = Url::parse(&format!("http://{}{}", self.server, self.path_prefix))
            .map_err(|e| SendError::Protocol(format!("invalid server address '{}': {e}", self.server)))?;
        url.path_segments_mut()
            .map_err(|_| SendError::Protocol(format!("'{}' cannot carry a path", self.server)))?
            .pop_if_empty()
            .extend(action.split('/'));
        Ok(url)
    }

    fn classify(&self, e: reqwest::Error) -> SendError {
        if e.is_timeout() {
            SendError::Timeout(self.timeout)
        } else if let Some(status) = e.status() {
            SendError::Rejected {
                status: status.as_u16(),
            }
        } else if e.is_connect() {
            SendError::Unreachable(format!("{}: {e}", self.server))
        } else {
            SendError::Protocol(e.to_string())
        }
    }
}

#[async_trait]
impl ActionSender for HttpActionSender {
    async fn send_action(&self, action_path: &str) -> Result<(), SendError> {
        let url = self.request_url(action_path)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        info!("GET {url} -> {}", response.status());
        response.error_for_status().map_err(|e| self.classify(e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Accepts one connection, reports its request line and answers with
    /// `response`.
    async fn one_shot_server(response: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut stream = BufReader::new(stream);
            let mut request_line = String::new();
            stream.read_line(&mut request_line).await.unwrap();
            loop {
                let mut header = String::new();
                let n = stream.read_line(&mut header).await.unwrap();
                if n == 0 || header == "\r\n" {
                    break;
                }
            }
            stream.get_mut().write_all(response.as_bytes()).await.unwrap();
            let _ = tx.send(request_line.trim_end().to_string());
        });

        (addr, rx)
    }

    fn sender(addr: String, timeout: Duration) -> HttpActionSender {
        HttpActionSender::new(addr, "/remote/", timeout).expect("client builds")
    }

    #[test]
    fn test_request_url_joins_prefix_and_action() {
        let sender = sender("10.0.0.7:8080".to_string(), Duration::from_secs(1));
        assert_eq!(
            sender.request_url("enter").unwrap().as_str(),
            "http://10.0.0.7:8080/remote/enter"
        );
        assert_eq!(sender.request_url("0").unwrap().path(), "/remote/0");
        assert_eq!(
            sender.request_url("lights/toggle").unwrap().path(),
            "/remote/lights/toggle"
        );
    }

    #[test]
    fn test_request_url_escapes_reserved_characters() {
        let sender = sender("127.0.0.1:80".to_string(), Duration::from_secs(1));
        assert_eq!(
            sender.request_url("lights toggle").unwrap().path(),
            "/remote/lights%20toggle"
        );
        assert_eq!(sender.request_url("a?b#c").unwrap().path(), "/remote/a%3Fb%23c");
    }

    #[test]
    fn test_request_url_rejects_bad_server_address() {
        let sender = sender("not a host".to_string(), Duration::from_secs(1));
        assert!(matches!(
            sender.request_url("enter"),
            Err(SendError::Protocol(_))
        ));
    }

    #[test]
    fn test_from_config_uses_server_section() {
        let sender = HttpActionSender::from_config(&ServerConfig::default()).unwrap();
        assert_eq!(sender.timeout, Duration::from_secs(5));
        assert_eq!(
            sender.request_url("dot").unwrap().as_str(),
            "http://127.0.0.1/remote/dot"
        );
    }

    #[tokio::test]
    async fn test_send_action_issues_get_for_action_path() {
        // Arrange
        let (addr, request_line) = one_shot_server(
            "HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;
        let sender = sender(addr, Duration::from_secs(5));

        // Act
        let result = sender.send_action("plus").await;

        // Assert
        assert!(result.is_ok(), "unexpected error: {result:?}");
        assert_eq!(request_line.await.unwrap(), "GET /remote/plus HTTP/1.1");
    }

    #[tokio::test]
    async fn test_send_action_with_space_sends_well_formed_request_line() {
        // Arrange – an action as it could come from a [keys] table
        let (addr, request_line) = one_shot_server(
            "HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;
        let sender = sender(addr, Duration::from_secs(5));

        // Act
        let result = sender.send_action("lights toggle").await;

        // Assert
        assert!(result.is_ok(), "unexpected error: {result:?}");
        let line = request_line.await.unwrap();
        assert_eq!(line.split_whitespace().count(), 3, "malformed: {line:?}");
        assert_eq!(line, "GET /remote/lights%20toggle HTTP/1.1");
    }

    #[tokio::test]
    async fn test_send_action_non_2xx_is_rejected() {
        let (addr, _request_line) = one_shot_server(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;
        let sender = sender(addr, Duration::from_secs(5));

        let result = sender.send_action("esc").await;

        assert!(matches!(result, Err(SendError::Rejected { status: 404 })));
    }

    #[tokio::test]
    async fn test_send_action_to_closed_port_is_unreachable() {
        // Arrange – grab a free port, then release it
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);
        let sender = sender(addr, Duration::from_secs(5));

        // Act
        let result = sender.send_action("tab").await;

        // Assert
        assert!(matches!(result, Err(SendError::Unreachable(_))));
    }

    #[tokio::test]
    async fn test_send_action_times_out_on_silent_server() {
        // Arrange – accept but never answer
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(stream);
        });
        let sender = sender(addr, Duration::from_millis(100));

        // Act
        let result = sender.send_action("1").await;

        // Assert
        assert!(matches!(result, Err(SendError::Timeout(_))));
        server.abort();
    }
}
