//! Listening socket and shutdown signals.
//!
//! A socket handed over by systemd (`LISTEN_FDS`) wins over the configured
//! address. Fresh binds set `SO_REUSEPORT` so a new process can take over the
//! port while the old one drains.

use anyhow::{Context, Result};
use listenfd::ListenFd;
use socket2::{Domain, Protocol, Socket, Type};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpListener;

use letterdesk_types::models::ServerConfig;

const BACKLOG: i32 = 1024;

/// Where the listening socket came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerSource {
    Inherited,
    Bound(SocketAddr),
}

impl fmt::Display for ListenerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inherited => f.write_str("inherited socket (fd 3)"),
            Self::Bound(addr) => write!(f, "{} (SO_REUSEPORT)", addr),
        }
    }
}

pub fn bind_address(config: &ServerConfig) -> Result<SocketAddr> {
    let ip: IpAddr = config
        .host
        .trim()
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", config.host))?;
    Ok(SocketAddr::new(ip, config.port))
}

pub fn open(config: &ServerConfig) -> Result<(TcpListener, ListenerSource)> {
    if let Some(inherited) = ListenFd::from_env().take_tcp_listener(0)? {
        inherited.set_nonblocking(true)?;
        return Ok((TcpListener::from_std(inherited)?, ListenerSource::Inherited));
    }

    let addr = bind_address(config)?;
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into()).with_context(|| format!("Cannot bind {}", addr))?;
    socket.listen(BACKLOG)?;

    let listener = TcpListener::from_std(socket.into())?;
    let local = listener.local_addr().unwrap_or(addr);
    Ok((listener, ListenerSource::Bound(local)))
}

/// Resolves on Ctrl+C or SIGTERM. A handler that cannot be installed is
/// logged and never fires.
pub async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Cannot listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            },
            Err(e) => {
                tracing::error!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        () = interrupt => "Ctrl+C",
        () = terminate => "SIGTERM",
    };
    tracing::info!("{} received, draining in-flight requests", signal);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(host: &str, port: u16) -> ServerConfig {
        ServerConfig { host: host.to_string(), port, ..ServerConfig::default() }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(bind_address(&server("0.0.0.0", 5000)).unwrap(), "0.0.0.0:5000".parse().unwrap());
        assert_eq!(bind_address(&server("::1", 8080)).unwrap(), "[::1]:8080".parse().unwrap());
        let err = bind_address(&server("localhost", 5000)).unwrap_err();
        assert!(err.to_string().contains("localhost"));
    }

    #[tokio::test]
    async fn test_open_reports_bound_port() {
        let (listener, source) = open(&server("127.0.0.1", 0)).unwrap();
        let ListenerSource::Bound(addr) = source else {
            panic!("expected a fresh bind, got {}", source);
        };
        assert_ne!(addr.port(), 0);
        assert_eq!(listener.local_addr().unwrap(), addr);
    }
}
