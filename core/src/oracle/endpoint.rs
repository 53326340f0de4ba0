use crate::error::{CoreError, CoreResult};
use std::net::IpAddr;

pub fn is_loopback_host(host: &str) -> bool {
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    bare.parse::<IpAddr>().map(|ip| ip.is_loopback()).unwrap_or(false)
}

/// The credential travels with every call, so plain `http` is only accepted
/// for a model server on the local machine.
pub fn enforce_oracle_endpoint(base_url: &str) -> CoreResult<()> {
    let url = url::Url::parse(base_url)
        .map_err(|_| CoreError::Config(format!("invalid oracle base URL: {}", base_url)))?;
    let host = url
        .host_str()
        .ok_or_else(|| CoreError::Config("oracle base URL missing host".to_string()))?;
    match url.scheme() {
        "https" => Ok(()),
        "http" if is_loopback_host(host) => Ok(()),
        "http" => Err(CoreError::Config(format!(
            "oracle endpoint rejected: plain http to non-loopback host {}",
            host
        ))),
        other => Err(CoreError::Config(format!(
            "oracle endpoint rejected: unsupported scheme {}",
            other
        ))),
    }
}
