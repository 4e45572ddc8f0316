//! Network infrastructure: implements `ListenerProbe` using `spawn_blocking`.

use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, TcpListener};

use anyhow::Result;

use crate::application::ports::ListenerProbe;

/// Probes the OS listener table by trying to bind the port on all
/// interfaces. A bind that fails with `AddrInUse` means another listener
/// holds it.
pub struct SystemListenerProbe;

impl ListenerProbe for SystemListenerProbe {
    async fn is_port_in_use(&self, port: u16) -> Result<bool> {
        let result = tokio::task::spawn_blocking(move || {
            let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
            match TcpListener::bind(addr) {
                Ok(_listener) => Ok(false),
                Err(e) if e.kind() == ErrorKind::AddrInUse => Ok(true),
                // Privileged or otherwise unbindable ports are not usable either.
                Err(e) if e.kind() == ErrorKind::PermissionDenied => Ok(true),
                Err(e) => Err(anyhow::anyhow!("probing port {port}: {e}")),
            }
        })
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking panicked: {e}"))??;
        Ok(result)
    }
}
