//! Internet reachability check.
//!
//! A raw TCP connect to a public resolver is tried first; if it fails, an HTTP
//! GET against a well-known site is attempted with the same timeout.

use std::future::Future;

use reqwest::Client;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use super::{ClientError, ClientResult};
use crate::monitoring::metrics::METRICS;
use crate::types::ProbeSettings;

/// Something that can tell whether the internet is reachable right now.
pub trait ConnectivityProbe {
    fn check(&self) -> impl Future<Output = bool> + Send;
}

/// Probe backed by real TCP/HTTP traffic.
pub struct NetworkProbe {
    settings: ProbeSettings,
    http: Client,
}

impl NetworkProbe {
    pub fn new(settings: ProbeSettings) -> ClientResult<Self> {
        let http = Client::builder()
            .user_agent("omegabot/0.1")
            .timeout(settings.timeout())
            .build()
            .map_err(ClientError::Http)?;
        Ok(Self { settings, http })
    }

    pub fn settings(&self) -> &ProbeSettings {
        &self.settings
    }

    async fn tcp_connect(&self) -> ClientResult<()> {
        let addr = format!("{}:{}", self.settings.host, self.settings.port);
        match timeout(self.settings.timeout(), TcpStream::connect(&addr)).await {
            Ok(Ok(_stream)) => Ok(()),
            Ok(Err(source)) => Err(ClientError::Connect { addr, source }),
            Err(_) => Err(ClientError::Timeout {
                what: format!("TCP connect to {addr}"),
                millis: self.settings.timeout().as_millis(),
            }),
        }
    }

    async fn http_get(&self) -> ClientResult<()> {
        self.http
            .get(&self.settings.fallback_url)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

impl ConnectivityProbe for NetworkProbe {
    async fn check(&self) -> bool {
        let online = match self.tcp_connect().await {
            Ok(()) => true,
            Err(tcp_err) => {
                debug!(target: "probe", error = %tcp_err, "TCP probe failed; trying HTTP");
                match self.http_get().await {
                    Ok(()) => true,
                    Err(http_err) => {
                        debug!(target: "probe", error = %http_err, "HTTP probe failed");
                        false
                    }
                }
            }
        };
        METRICS.record_probe(online);
        online
    }
}

/// Connectivity plus the label shown in the status bar.
pub async fn connection_status<P: ConnectivityProbe>(probe: &P) -> (bool, &'static str) {
    if probe.check().await {
        (true, "Conectado")
    } else {
        (false, "Sin conexión")
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    struct Fixed(bool);

    impl ConnectivityProbe for Fixed {
        async fn check(&self) -> bool {
            self.0
        }
    }

    #[tokio::test]
    async fn status_labels() {
        assert_eq!(connection_status(&Fixed(true)).await, (true, "Conectado"));
        assert_eq!(connection_status(&Fixed(false)).await, (false, "Sin conexión"));
    }

    #[tokio::test]
    async fn local_listener_counts_as_online() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let probe = NetworkProbe::new(ProbeSettings {
            host: "127.0.0.1".to_string(),
            port,
            fallback_url: "http://127.0.0.1:9/".to_string(),
            timeout_ms: 500,
        })
        .unwrap();
        assert!(probe.check().await);
    }

    #[tokio::test]
    async fn closed_port_and_dead_fallback_is_offline() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let probe = NetworkProbe::new(ProbeSettings {
            host: "127.0.0.1".to_string(),
            port,
            fallback_url: format!("http://127.0.0.1:{port}/"),
            timeout_ms: 300,
        })
        .unwrap();
        let started = std::time::Instant::now();
        assert!(!probe.check().await);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    fn closed_port() -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    /// Serve one HTTP request with `status_line` and return the server's url.
    async fn serve_once(status_line: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!("{status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        url
    }

    fn fallback_only(fallback_url: String) -> NetworkProbe {
        NetworkProbe::new(ProbeSettings {
            host: "127.0.0.1".to_string(),
            port: closed_port(),
            fallback_url,
            timeout_ms: 1_000,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn http_fallback_success_counts_as_online() {
        let probe = fallback_only(serve_once("HTTP/1.1 200 OK").await);
        assert!(probe.check().await);
    }

    #[tokio::test]
    async fn http_fallback_server_error_counts_as_offline() {
        let probe = fallback_only(serve_once("HTTP/1.1 500 Internal Server Error").await);
        assert!(!probe.check().await);
    }
}
