use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::error::BootError;
use crate::util::{http_url, tcp_address};

pub mod http;
pub mod tcp_connect;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionMode {
    TcpConnect,
    #[default]
    HttpGet,
}

impl ConnectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionMode::TcpConnect => "tcp-connect",
            ConnectionMode::HttpGet => "http-get",
        }
    }
}

impl FromStr for ConnectionMode {
    type Err = BootError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tcp-connect" => Ok(ConnectionMode::TcpConnect),
            "http-get" => Ok(ConnectionMode::HttpGet),
            other => Err(BootError::config(format!(
                "unknown mode: {other} (expected tcp-connect or http-get)"
            ))),
        }
    }
}

impl fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resources held by a successful probe. Call [`Connection::release`] once the
/// clock has been stopped.
#[derive(Debug)]
pub enum Connection {
    Tcp(TcpStream),
    /// A 200 response whose body has already been read to the end.
    Http(reqwest::Response),
}

impl Connection {
    pub async fn release(self) -> Result<()> {
        match self {
            Connection::Tcp(mut stream) => {
                stream.shutdown().await?;
            }
            Connection::Http(response) => drop(response),
        }
        Ok(())
    }
}

/// A readiness check bound to one target.
pub enum Prober {
    Tcp { addr: String },
    Http { client: Client, url: Url },
}

impl Prober {
    pub fn new(mode: ConnectionMode, target: &str) -> crate::error::Result<Self> {
        match mode {
            ConnectionMode::TcpConnect => Ok(Prober::Tcp {
                addr: tcp_address(target)?,
            }),
            ConnectionMode::HttpGet => {
                // No idle pooling: a kept-alive socket to a killed server must not
                // leak into the next run.
                let client = Client::builder()
                    .pool_max_idle_per_host(0)
                    .build()
                    .map_err(|e| BootError::config(format!("http client: {e}")))?;
                Ok(Prober::Http {
                    client,
                    url: http_url(target)?,
                })
            }
        }
    }

    pub fn mode(&self) -> ConnectionMode {
        match self {
            Prober::Tcp { .. } => ConnectionMode::TcpConnect,
            Prober::Http { .. } => ConnectionMode::HttpGet,
        }
    }

    /// One attempt. `Err` only means "not ready yet".
    pub async fn probe(&self) -> Result<Connection> {
        match self {
            Prober::Tcp { addr } => tcp_connect::probe_tcp(addr).await,
            Prober::Http { client, url } => http::probe_http(client, url.clone()).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_from_str() {
        assert_eq!("tcp-connect".parse::<ConnectionMode>().unwrap(), ConnectionMode::TcpConnect);
        assert_eq!("http-get".parse::<ConnectionMode>().unwrap(), ConnectionMode::HttpGet);
        assert!(matches!("udp".parse::<ConnectionMode>(), Err(BootError::Config(_))));
        assert_eq!(ConnectionMode::default(), ConnectionMode::HttpGet);
    }

    #[test]
    fn mode_serde_names() {
        let mode: ConnectionMode = serde_json::from_str("\"tcp-connect\"").unwrap();
        assert_eq!(mode, ConnectionMode::TcpConnect);
        assert_eq!(serde_json::to_string(&ConnectionMode::HttpGet).unwrap(), "\"http-get\"");
    }

    #[test]
    fn prober_resolves_target_per_mode() {
        match Prober::new(ConnectionMode::TcpConnect, "http://localhost:8080/").unwrap() {
            Prober::Tcp { addr } => assert_eq!(addr, "localhost:8080"),
            Prober::Http { .. } => panic!("expected tcp prober"),
        }
        let prober = Prober::new(ConnectionMode::HttpGet, "localhost:8080").unwrap();
        assert_eq!(prober.mode(), ConnectionMode::HttpGet);
    }
}
