//! Sessions are client connections to the rendezvous endpoints with
//! the per-connection state needed to authenticate, register and
//! route method calls.

use crate::database::entities::SessionRecord;
use crate::services::App;
use crate::session::models::errors::{RendezvousError, ServerResult};
use crate::session::models::matchmaking::NotificationEvent;
use crate::session::packet::{Packet, PacketCodec, PacketDebug, PacketKind};
use crate::session::router::{HandleError, Router};
use crate::utils::components::notifications;
use crate::utils::types::{PlayerID, SessionID};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, log_enabled, warn};
use parking_lot::RwLock;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Weak};
use tokio::net::{TcpListener, TcpStream};
use tokio::select;
use tokio::sync::{mpsc, Notify};
use tokio_util::codec::Framed;

pub mod models;
pub mod packet;
pub mod router;
pub mod routes;

pub type SessionLink = Arc<Session>;
pub type WeakSessionLink = Weak<Session>;

/// A client connection to one of the rendezvous endpoints
pub struct Session {
    /// Unique identifier for this session
    id: SessionID,
    /// Remote address of the connection
    addr: SocketAddr,
    /// Queue of outbound packets drained by the connection task
    writer: mpsc::UnboundedSender<Packet>,
    /// Signal used to tear the connection down
    shutdown: Notify,
    /// Authenticated principal, set by registration
    auth: RwLock<Option<PlayerID>>,
    /// Call id source for server initiated notifications
    notify_id: AtomicU32,
    /// Shared application handles
    pub app: Arc<App>,
}

/// Source for unique session ids
static SESSION_IDS: AtomicU32 = AtomicU32::new(1);

impl Session {
    fn new(addr: SocketAddr, writer: mpsc::UnboundedSender<Packet>, app: Arc<App>) -> SessionLink {
        Arc::new(Self {
            id: SESSION_IDS.fetch_add(1, Ordering::AcqRel),
            addr,
            writer,
            shutdown: Notify::new(),
            auth: RwLock::new(None),
            notify_id: AtomicU32::new(1),
            app,
        })
    }

    pub fn id(&self) -> SessionID {
        self.id
    }

    /// Session without a live transport, for exercising handlers in
    /// tests. Written packets are dropped.
    #[cfg(test)]
    pub fn test(app: Arc<App>) -> SessionLink {
        let (writer, _rx) = mpsc::unbounded_channel();
        Self::new(
            SocketAddr::from(([127, 0, 0, 1], 0)),
            writer,
            app,
        )
    }

    /// The authenticated principal, if registration completed
    pub fn pid(&self) -> Option<PlayerID> {
        *self.auth.read()
    }

    /// The authenticated principal or an access-denied error for
    /// handlers that require registration
    pub fn require_pid(&self) -> ServerResult<PlayerID> {
        self.pid().ok_or(RendezvousError::AccessDenied)
    }

    pub fn set_auth(&self, pid: PlayerID) {
        *self.auth.write() = Some(pid);
    }

    /// Queues a packet for writing to the client
    pub fn push(&self, packet: Packet) {
        self.debug_log_packet("Queued Write", &packet);
        if self.writer.send(packet).is_err() {
            // Connection task has already stopped; the packet is dropped
        }
    }

    /// Sends a notification event to this client
    pub fn notify_event(&self, event: &NotificationEvent) {
        let call_id = self.notify_id.fetch_add(1, Ordering::AcqRel);
        self.push(Packet::notify(
            notifications::PROTOCOL,
            call_id,
            notifications::PROCESS_NOTIFICATION_EVENT,
            NotificationEvent {
                source_pid: event.source_pid,
                event_type: event.event_type,
                param1: event.param1,
                param2: event.param2,
                message: event.message.clone(),
            },
        ));
    }

    /// Requests that the connection task tears this session down.
    /// Best-effort: the transport may already be gone.
    pub fn disconnect(&self) {
        self.shutdown.notify_one();
    }

    /// Accept loop for one rendezvous endpoint. Every accepted
    /// connection becomes a session processed on its own task.
    pub async fn serve(listener: TcpListener, app: Arc<App>, router: Arc<Router>) {
        loop {
            let (stream, addr) = match listener.accept().await {
                Ok(value) => value,
                Err(err) => {
                    error!("Failed to accept connection: {err:?}");
                    continue;
                }
            };

            tokio::spawn(Session::start(stream, addr, app.clone(), router.clone()));
        }
    }

    /// Runs a single connection to completion
    pub async fn start(stream: TcpStream, addr: SocketAddr, app: Arc<App>, router: Arc<Router>) {
        let framed = Framed::new(stream, PacketCodec);
        let (writer, rx) = mpsc::unbounded_channel();
        let session = Session::new(addr, writer, app);
        debug!("Session started (SID: {}, ADDR: {})", session.id, addr);

        Self::process(&session, framed, rx, router).await;

        Self::stopped(&session).await;
    }

    /// Connection loop: drains queued writes and handles incoming
    /// requests in arrival order until the transport closes or a
    /// disconnect is requested
    async fn process(
        session: &SessionLink,
        mut framed: Framed<TcpStream, PacketCodec>,
        mut rx: mpsc::UnboundedReceiver<Packet>,
        router: Arc<Router>,
    ) {
        loop {
            select! {
                _ = session.shutdown.notified() => break,

                queued = rx.recv() => match queued {
                    Some(packet) => {
                        if framed.send(packet).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                },

                read = framed.next() => match read {
                    Some(Ok(packet)) => {
                        if let Some(response) = Self::handle_packet(session, &router, packet).await {
                            if framed.send(response).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Err(err)) => {
                        warn!("Failed to read packet (SID: {}): {err:?}", session.id);
                        break;
                    }
                    None => break,
                },
            }
        }
    }

    /// Routes one request packet, producing the response to write
    async fn handle_packet(
        session: &SessionLink,
        router: &Router,
        packet: Packet,
    ) -> Option<Packet> {
        if packet.header.kind != PacketKind::Request {
            return None;
        }

        session.debug_log_packet("Read", &packet);

        let response = match router.handle(session.clone(), packet) {
            // Await the handler response future
            Ok(fut) => fut.await,

            // No handler set-up, respond with a default empty response
            Err(HandleError::MissingHandler(packet)) => {
                debug!(
                    "Missing handler for packet (protocol: {}, method: {})",
                    packet.header.protocol, packet.header.method
                );
                Packet::response_empty(&packet)
            }

            // Malformed request payload
            Err(HandleError::Decoding(err, packet)) => {
                error!("Error while decoding packet: {err:?}");
                Packet::error(&packet, RendezvousError::InvalidArgument.code())
            }
        };

        session.debug_log_packet("Write", &response);
        Some(response)
    }

    /// Cleanup once the connection has ended: the registry mapping
    /// and the session record are removed for the authenticated pid
    async fn stopped(session: &SessionLink) {
        let pid = session.auth.write().take();
        if let Some(pid) = pid {
            session.app.sessions.detach(pid, &Arc::downgrade(session));
            if let Err(err) = SessionRecord::delete_by_pid(&session.app.db, pid).await {
                error!("Failed to remove session record (PID: {pid}): {err:?}");
            }
        }
        debug!("Session stopped (SID: {})", session.id);
    }

    /// Logs the contents of the provided packet to the debug output
    /// along with basic session information
    fn debug_log_packet(&self, action: &'static str, packet: &Packet) {
        // Skip if debug logging is disabled
        if !log_enabled!(log::Level::Debug) {
            return;
        }

        debug!(
            "Session {} Packet (SID: {}, ADDR: {})\n{:?}",
            action,
            self.id,
            self.addr,
            PacketDebug { packet }
        );
    }
}
