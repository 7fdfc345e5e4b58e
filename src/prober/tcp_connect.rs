use anyhow::Result;
use tokio::net::TcpStream;

use super::Connection;

/// Opens a connection to `addr` without sending anything. Uses the platform
/// connect timeout.
pub async fn probe_tcp(addr: &str) -> Result<Connection> {
    let conn = TcpStream::connect(addr).await?;
    Ok(Connection::Tcp(conn))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn listening_port_connects_and_releases() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let conn = probe_tcp(&addr).await.unwrap();
        assert!(matches!(conn, Connection::Tcp(_)));
        let (_accepted, _) = listener.accept().await.unwrap();
        conn.release().await.unwrap();
    }

    #[tokio::test]
    async fn unbound_port_fails() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        assert!(probe_tcp(&addr).await.is_err());
    }
}
