// Node-list client.
//
// Both the local manager and the discovery service expose the same endpoint:
//
//   GET http://<host:port>/conn/getAll
//     Response: [{ key, type, send_bytes, recv_bytes, last_ack_time, start_time }, ...]
//
// No authentication and no pagination. An empty array is a valid answer
// ("zero nodes"), distinct from a failed request.

use crate::config::constants::{DEFAULT_FETCH_TIMEOUT, NODE_LIST_PATH, USER_AGENT};
use crate::errors::FetchError;
use crate::node::NodeRecord;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Anything that can produce a node list for an address.
///
/// `Ok(None)` means the service answered with a body that decodes to no
/// list at all (JSON `null`); `Ok(Some(vec![]))` means zero nodes.
#[async_trait]
pub trait NodeSource: Send + Sync {
    async fn fetch(&self, address: &str) -> std::result::Result<Option<Vec<NodeRecord>>, FetchError>;
}

/// HTTP implementation of [`NodeSource`].
#[derive(Clone)]
pub struct NodeListClient {
    http: Client,
}

impl NodeListClient {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_FETCH_TIMEOUT)
    }

    /// Build a client whose requests give up after `timeout`, independent of
    /// how often the monitor polls.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http })
    }

    /// Full URL of the node-list endpoint for a `host:port` address.
    pub fn node_list_url(address: &str) -> String {
        format!("http://{}/{}", address.trim_end_matches('/'), NODE_LIST_PATH)
    }
}

#[async_trait]
impl NodeSource for NodeListClient {
    async fn fetch(&self, address: &str) -> std::result::Result<Option<Vec<NodeRecord>>, FetchError> {
        let url = Self::node_list_url(address);
        debug!(url = %url, "Fetching node list");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        if !resp.status().is_success() {
            return Err(FetchError::Status {
                url,
                status: resp.status(),
            });
        }

        let body = resp.bytes().await.map_err(|source| FetchError::Transport {
            url: url.clone(),
            source,
        })?;

        let nodes: Option<Vec<NodeRecord>> =
            serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
                url: url.clone(),
                source,
            })?;

        debug!(
            url = %url,
            count = nodes.as_ref().map(Vec::len).unwrap_or(0),
            "Node list received"
        );
        Ok(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host_of(server: &mockito::ServerGuard) -> String {
        server.host_with_port()
    }

    #[test]
    fn test_client_builds() {
        assert!(NodeListClient::new().is_ok());
    }

    #[test]
    fn test_node_list_url() {
        assert_eq!(
            NodeListClient::node_list_url("127.0.0.1:8000"),
            "http://127.0.0.1:8000/conn/getAll"
        );
        assert_eq!(
            NodeListClient::node_list_url("127.0.0.1:8000/"),
            "http://127.0.0.1:8000/conn/getAll"
        );
    }

    #[tokio::test]
    async fn test_fetch_decodes_nodes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/conn/getAll")
            .match_header("user-agent", USER_AGENT)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"key":"K1","type":"TCP","send_bytes":10,"recv_bytes":20,"last_ack_time":3,"start_time":400}]"#,
            )
            .create_async()
            .await;

        let client = NodeListClient::new().unwrap();
        let nodes = client.fetch(&host_of(&server)).await.unwrap().unwrap();

        mock.assert_async().await;
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].key, "K1");
        assert_eq!(nodes[0].bytes_received, 20);
        assert_eq!(nodes[0].start_time_secs, 400);
    }

    #[tokio::test]
    async fn test_fetch_empty_array_is_not_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/conn/getAll")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = NodeListClient::new().unwrap();
        let nodes = client.fetch(&host_of(&server)).await.unwrap();
        assert_eq!(nodes, Some(vec![]));
    }

    #[tokio::test]
    async fn test_fetch_null_body_yields_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/conn/getAll")
            .with_status(200)
            .with_body("null")
            .create_async()
            .await;

        let client = NodeListClient::new().unwrap();
        assert_eq!(client.fetch(&host_of(&server)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_fetch_garbage_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/conn/getAll")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let client = NodeListClient::new().unwrap();
        let err = client.fetch(&host_of(&server)).await.unwrap_err();
        assert!(err.is_decode());
        assert!(!err.is_timeout());
        assert!(err.url().ends_with("/conn/getAll"));
    }

    #[tokio::test]
    async fn test_fetch_server_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/conn/getAll")
            .with_status(500)
            .create_async()
            .await;

        let client = NodeListClient::new().unwrap();
        let err = client.fetch(&host_of(&server)).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status, .. } if status.as_u16() == 500));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_transport_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = NodeListClient::new().unwrap();
        let err = client.fetch(&addr.to_string()).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_fetch_times_out_on_silent_server() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold the connection without ever answering.
        let _hold = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let client = NodeListClient::with_timeout(Duration::from_millis(200)).unwrap();
        let start = std::time::Instant::now();
        let err = client.fetch(&addr.to_string()).await.unwrap_err();

        assert!(err.is_timeout());
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
