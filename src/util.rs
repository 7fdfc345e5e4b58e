// Target normalization for the two probe modes.

use reqwest::Url;

use crate::error::{BootError, Result};

pub fn parse_host_port(s: &str, default_port: u16) -> (String, u16) {
    if let Some(idx) = s.rfind(':') {
        if let Ok(port) = s[idx + 1..].parse::<u16>() {
            return (s[..idx].to_string(), port);
        }
    }
    (s.to_string(), default_port)
}

/// `host:port` to dial in tcp-connect mode. URL targets keep their host and
/// port, falling back to the scheme's default port.
pub fn tcp_address(target: &str) -> Result<String> {
    if target.contains("://") {
        let url = Url::parse(target)
            .map_err(|e| BootError::config(format!("invalid target {target}: {e}")))?;
        let host = url
            .host_str()
            .ok_or_else(|| BootError::config(format!("target {target} has no host")))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| BootError::config(format!("target {target} has no port")))?;
        return Ok(format!("{host}:{port}"));
    }

    let (host, port) = parse_host_port(target, 80);
    if host.is_empty() {
        return Err(BootError::config(format!("target {target} has no host")));
    }
    if host.contains(':') && !(host.starts_with('[') && host.ends_with(']')) {
        return Err(BootError::config(format!(
            "IPv6 target {target} needs brackets, as in [::1]:8080"
        )));
    }
    Ok(format!("{host}:{port}"))
}

/// URL to GET in http-get mode. Bare `host:port` targets are treated as plain http.
pub fn http_url(target: &str) -> Result<Url> {
    let candidate = if target.contains("://") {
        target.to_string()
    } else {
        format!("http://{target}")
    };
    let url = Url::parse(&candidate)
        .map_err(|e| BootError::config(format!("invalid target {target}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(BootError::config(format!(
            "unsupported scheme {other} in target {target}"
        ))),
    }
}
