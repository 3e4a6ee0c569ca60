use anyhow::{Context, Result};
use std::net::SocketAddr;

/// Resolves `bind` and refuses non-loopback addresses unless `public` is set.
pub(crate) async fn resolve_guarded_bind_addr(bind: &str, public: bool) -> Result<SocketAddr> {
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host(bind)
        .await
        .with_context(|| format!("Failed to resolve bind address: {bind}"))?
        .collect();

    if addrs.iter().any(|addr| !addr.ip().is_loopback()) && !public {
        anyhow::bail!(
            "Refusing to bind to non-loopback address without --public: {bind}"
        )
    }

    addrs
        .iter()
        .copied()
        .find(SocketAddr::is_ipv4)
        .or_else(|| addrs.first().copied())
        .with_context(|| format!("Bind address resolved to zero socket addrs: {bind}"))
}
