//! TCP socket options applied before a Lumberjack connection is opened.

use std::{io, time::Duration};

use socket2::{SockRef, TcpKeepalive};
use tokio::net::TcpSocket;

/// Socket options for the underlying TCP connection.
///
/// Unset options keep the operating system defaults.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use lumberjack::client::SocketOptions;
///
/// let options = SocketOptions::default()
///     .nodelay(true)
///     .keepalive(Some(Duration::from_secs(60)));
/// assert_eq!(options.nodelay_value(), Some(true));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SocketOptions {
    nodelay: Option<bool>,
    keepalive: Option<Keepalive>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Keepalive {
    Off,
    Idle(Duration),
}

impl SocketOptions {
    /// Configure `TCP_NODELAY`.
    #[must_use]
    pub fn nodelay(mut self, enabled: bool) -> Self {
        self.nodelay = Some(enabled);
        self
    }

    /// Configure `SO_KEEPALIVE`; `Some(idle)` enables probes after `idle`,
    /// `None` turns keepalive off.
    #[must_use]
    pub fn keepalive(mut self, idle: Option<Duration>) -> Self {
        self.keepalive = Some(idle.map_or(Keepalive::Off, Keepalive::Idle));
        self
    }

    /// Configured `TCP_NODELAY` value, if any.
    #[must_use]
    pub fn nodelay_value(&self) -> Option<bool> { self.nodelay }

    /// Configured keepalive idle time. `Some(None)` means explicitly off.
    #[must_use]
    pub fn keepalive_value(&self) -> Option<Option<Duration>> {
        self.keepalive.map(|setting| match setting {
            Keepalive::Off => None,
            Keepalive::Idle(idle) => Some(idle),
        })
    }

    pub(crate) fn apply(&self, socket: &TcpSocket) -> io::Result<()> {
        if let Some(enabled) = self.nodelay {
            socket.set_nodelay(enabled)?;
        }
        match self.keepalive {
            Some(Keepalive::Idle(idle)) => {
                socket.set_keepalive(true)?;
                SockRef::from(socket).set_tcp_keepalive(&TcpKeepalive::new().with_time(idle))?;
            }
            Some(Keepalive::Off) => socket.set_keepalive(false)?,
            None => {}
        }
        Ok(())
    }
}
