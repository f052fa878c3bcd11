//! Asynchronous UDP endpoint runtime.
//!
//! An [`Endpoint`] binds a UDPv4 socket, runs a receive loop on the
//! tokio runtime, hands every decoded [`Message`] to a user handler and
//! sends user-built messages back out. The [`Role`] only selects the
//! default port: agents listen on 161, managers (trap receivers) on 162.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use bytes::Bytes;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::message::Message;
use crate::util::bind_udp_socket;

/// Receive buffer size.
///
/// Sized to the maximum UDP payload rather than a single Ethernet MTU,
/// so no datagram is ever truncated before parsing.
const MAX_DATAGRAM: usize = 65535;

/// Which well-known port the endpoint defaults to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Listens on UDP/161; answers requests.
    Agent,
    /// Listens on UDP/162; receives traps and informs.
    Manager,
}

impl Role {
    /// The well-known UDP port for this role.
    pub const fn default_port(self) -> u16 {
        match self {
            Role::Agent => 161,
            Role::Manager => 162,
        }
    }
}

/// Handler invoked for every successfully parsed datagram.
///
/// The message is borrowed: it is dropped when the handler returns, so
/// anything kept longer must be cloned out. Handlers may call
/// [`Endpoint::send`] (the endpoint is cheap to clone into the closure).
pub type MessageHandler = Arc<dyn Fn(&Message, Ipv4Addr, u16) + Send + Sync>;

/// Handler invoked for parse and transport errors inside the receive
/// loop. Never invoked for cancellation.
pub type ErrorHandler = Arc<dyn Fn(&Error) + Send + Sync>;

struct EndpointInner {
    role: Role,
    socket: Mutex<Option<Arc<UdpSocket>>>,
    on_message: RwLock<Option<MessageHandler>>,
    on_error: RwLock<Option<ErrorHandler>>,
    cancel: Mutex<CancellationToken>,
    running: AtomicBool,
}

/// An SNMP endpoint: one UDPv4 socket plus an asynchronous receive loop.
///
/// Cloning is cheap and clones share the same socket, handlers and loop.
#[derive(Clone)]
pub struct Endpoint {
    inner: Arc<EndpointInner>,
}

impl Endpoint {
    /// Create an endpoint bound to nothing yet.
    pub fn new(role: Role) -> Self {
        Self {
            inner: Arc::new(EndpointInner {
                role,
                socket: Mutex::new(None),
                on_message: RwLock::new(None),
                on_error: RwLock::new(None),
                cancel: Mutex::new(CancellationToken::new()),
                running: AtomicBool::new(false),
            }),
        }
    }

    /// Convenience constructor for an agent endpoint.
    pub fn agent() -> Self {
        Self::new(Role::Agent)
    }

    /// Convenience constructor for a manager endpoint.
    pub fn manager() -> Self {
        Self::new(Role::Manager)
    }

    /// The endpoint's role.
    pub fn role(&self) -> Role {
        self.inner.role
    }

    /// Open and bind the UDPv4 socket.
    ///
    /// Port 0 selects the role's well-known port (161 for agents, 162
    /// for managers). Must be called within a tokio runtime. Fails with
    /// [`Error::Bind`] when the OS refuses the bind.
    pub async fn initialize(&self, bind_addr: Ipv4Addr, port: u16) -> Result<()> {
        let port = if port == 0 {
            self.inner.role.default_port()
        } else {
            port
        };
        let addr = SocketAddr::V4(SocketAddrV4::new(bind_addr, port));

        let socket = bind_udp_socket(addr).map_err(|source| Error::Bind { addr, source })?;
        tracing::debug!(target: "snmp_endpoint::endpoint", local_addr = %addr, role = ?self.inner.role, "endpoint bound");

        *self.inner.socket.lock().expect("socket lock poisoned") = Some(Arc::new(socket));
        Ok(())
    }

    /// The bound local address.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        let guard = self.inner.socket.lock().expect("socket lock poisoned");
        let socket = guard.as_ref().ok_or(Error::NotInitialized)?;
        socket.local_addr().map_err(|source| Error::Receive { source })
    }

    /// Register the message handler. Takes effect on the next datagram.
    pub fn on_message<F>(&self, handler: F)
    where
        F: Fn(&Message, Ipv4Addr, u16) + Send + Sync + 'static,
    {
        *self.inner.on_message.write().expect("handler lock poisoned") = Some(Arc::new(handler));
    }

    /// Register the error handler. Takes effect on the next event.
    pub fn on_error<F>(&self, handler: F)
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        *self.inner.on_error.write().expect("handler lock poisoned") = Some(Arc::new(handler));
    }

    /// Start the receive loop.
    ///
    /// Idempotent: returns `true` without side effects when the loop is
    /// already running. Returns `false` when the endpoint has not been
    /// initialized. A stopped endpoint can be started again; datagrams
    /// the OS buffered while the loop was stopped are discarded before
    /// the new loop posts its first receive.
    pub fn start(&self) -> bool {
        let socket = {
            let guard = self.inner.socket.lock().expect("socket lock poisoned");
            match guard.as_ref() {
                Some(socket) => Arc::clone(socket),
                None => return false,
            }
        };

        if self.inner.running.swap(true, Ordering::AcqRel) {
            return true;
        }

        let cancel = {
            let mut guard = self.inner.cancel.lock().expect("cancel lock poisoned");
            if guard.is_cancelled() {
                *guard = CancellationToken::new();
                drain_socket(&socket);
            }
            guard.clone()
        };

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            recv_loop(inner, socket, cancel).await;
        });
        true
    }

    /// Request termination of the receive loop.
    ///
    /// The pending receive is cancelled; an in-flight handler invocation
    /// runs to completion. The socket stays bound, so subsequent
    /// datagrams accumulate in the OS receive buffer; [`start`] discards
    /// them before resuming.
    ///
    /// [`start`]: Self::start
    pub fn stop(&self) {
        self.inner
            .cancel
            .lock()
            .expect("cancel lock poisoned")
            .cancel();
    }

    /// Whether the receive loop is currently running.
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    /// Serialize a message and hand it to the OS.
    ///
    /// Synchronous: the datagram has been accepted by (or rejected by)
    /// the OS when this returns, so it is safe to call from inside a
    /// message handler. Fails with [`Error::Send`] on an OS error or a
    /// short write, [`Error::NotInitialized`] before `initialize`.
    pub fn send(&self, message: &Message, ip: Ipv4Addr, port: u16) -> Result<()> {
        let socket = {
            let guard = self.inner.socket.lock().expect("socket lock poisoned");
            guard.as_ref().map(Arc::clone).ok_or(Error::NotInitialized)?
        };

        let target = SocketAddr::V4(SocketAddrV4::new(ip, port));
        let bytes = message.encode()?;

        let written = socket
            .try_send_to(&bytes, target)
            .map_err(|source| Error::Send { target, source })?;
        if written != bytes.len() {
            return Err(Error::Send {
                target,
                source: std::io::Error::new(
                    std::io::ErrorKind::WriteZero,
                    format!("short write: {written} of {} bytes", bytes.len()),
                ),
            });
        }

        tracing::trace!(target: "snmp_endpoint::endpoint", %target, bytes = bytes.len(), "datagram sent");
        Ok(())
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("role", &self.inner.role)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

/// The receive loop: one pending `recv_from` at a time, every datagram
/// parsed and dispatched before the next receive is posted.
///
/// Parse and I/O errors go to the error handler and the loop continues;
/// only cancellation (or the socket being closed under us while
/// cancelled) ends it.
async fn recv_loop(inner: Arc<EndpointInner>, socket: Arc<UdpSocket>, cancel: CancellationToken) {
    let mut buf = vec![0u8; MAX_DATAGRAM];

    loop {
        let received = tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                tracing::debug!(target: "snmp_endpoint::endpoint", "receive loop stopped");
                break;
            }

            result = socket.recv_from(&mut buf) => result,
        };

        match received {
            Ok((len, SocketAddr::V4(source))) => {
                let data = Bytes::copy_from_slice(&buf[..len]);
                dispatch_datagram(&inner, data, source);
            }
            // A v4-mapped source cannot appear on an AF_INET socket.
            Ok((_, SocketAddr::V6(source))) => {
                tracing::warn!(target: "snmp_endpoint::endpoint", %source, "ignoring non-IPv4 datagram");
            }
            Err(source) => {
                if cancel.is_cancelled() {
                    break;
                }
                tracing::warn!(target: "snmp_endpoint::endpoint", error = %source, "receive error");
                invoke_error_handler(&inner, &Error::Receive { source });
            }
        }
    }

    inner.running.store(false, Ordering::Release);
}

fn dispatch_datagram(inner: &Arc<EndpointInner>, data: Bytes, source: SocketAddrV4) {
    match Message::decode(data) {
        Ok(message) => {
            let handler = inner
                .on_message
                .read()
                .expect("handler lock poisoned")
                .clone();
            if let Some(handler) = handler {
                handler(&message, *source.ip(), source.port());
            }
            // The message tree is dropped here; handlers must not
            // retain references past their invocation.
        }
        Err(error) => {
            tracing::warn!(target: "snmp_endpoint::endpoint", source = %source, error = %error, "dropping undecodable datagram");
            invoke_error_handler(inner, &error);
        }
    }
}

/// Discard whatever the kernel buffered while no receive was posted.
fn drain_socket(socket: &UdpSocket) {
    let mut buf = [0u8; MAX_DATAGRAM];
    let mut discarded = 0usize;
    while socket.try_recv_from(&mut buf).is_ok() {
        discarded += 1;
    }
    if discarded > 0 {
        tracing::debug!(target: "snmp_endpoint::endpoint", discarded, "discarded datagrams buffered while stopped");
    }
}

fn invoke_error_handler(inner: &Arc<EndpointInner>, error: &Error) {
    let handler = inner
        .on_error
        .read()
        .expect("handler lock poisoned")
        .clone();
    if let Some(handler) = handler {
        handler(error);
    }
}
