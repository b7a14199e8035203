//! Lifecycle controller
//!
//! Per connection: `Connected --join--> Active --disconnect--> Closed`, with
//! messages and typing accepted only while `Active`. Store writes happen under
//! a write lock that is released before the resulting broadcasts, and the next
//! command is not looked at until every broadcast of the current one is queued.

use std::sync::Arc;

use chat_core::{BroadcastEvent, ConnectionId, DomainError, Identity, Message, TypingSignal};
use chat_state::SharedRoomState;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{Command, EngineHandle};
use crate::broadcast::{BroadcastRouter, RouteReport};
use crate::connection::{Connection, ConnectionManager, ConnectionState};
use crate::protocol::GatewayMessage;

/// Owner of every room state transition
pub struct LifecycleController {
    room: SharedRoomState,
    connections: Arc<ConnectionManager>,
    router: BroadcastRouter,
    /// Connections whose queue overflowed during the current command
    lagging: Vec<ConnectionId>,
}

impl LifecycleController {
    /// Create a controller over the given room and connection set
    pub fn new(room: SharedRoomState, connections: Arc<ConnectionManager>) -> Self {
        let router = BroadcastRouter::new(connections.clone());
        Self {
            room,
            connections,
            router,
            lagging: Vec::new(),
        }
    }

    /// Spawn the controller task and return its handle
    ///
    /// The task ends once every handle is dropped.
    pub fn spawn(self, command_buffer: usize) -> (EngineHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(command_buffer.max(1));
        let task = tokio::spawn(self.run(rx));
        (EngineHandle::new(tx), task)
    }

    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        info!("Lifecycle controller started");

        while let Some(command) = commands.recv().await {
            self.apply(command);
        }

        self.connections.clear();
        info!("Lifecycle controller stopped");
    }

    /// Apply one command, reply, then drop any connection that fell behind
    pub fn apply(&mut self, command: Command) {
        tracing::trace!(
            command = command.kind(),
            connection_id = %command.connection_id(),
            "Applying command"
        );

        match command {
            Command::Connect { connection, reply } => {
                let _ = reply.send(self.connect(connection));
            }
            Command::Join {
                connection_id,
                identity,
                reply,
            } => {
                let _ = reply.send(self.join(&connection_id, identity));
            }
            Command::SendMessage {
                connection_id,
                content,
                claimed,
                reply,
            } => {
                let _ = reply.send(self.send_message(&connection_id, content, claimed.as_ref()));
            }
            Command::Typing {
                connection_id,
                claimed,
                reply,
            } => {
                let _ = reply.send(self.typing(&connection_id, claimed.as_ref()));
            }
            Command::StopTyping {
                connection_id,
                claimed,
                reply,
            } => {
                let _ = reply.send(self.stop_typing(&connection_id, claimed.as_ref()));
            }
            Command::Disconnect { connection_id, reply } => {
                let _ = reply.send(self.disconnect(&connection_id));
            }
        }

        self.drop_lagging();
    }

    /// Register a new connection in the `Connected` state
    pub fn connect(&mut self, connection: Arc<Connection>) -> bool {
        let id = connection.id().clone();
        let added = self.connections.add_connection(connection);
        if added {
            info!(connection_id = %id, "Connection opened");
        } else {
            warn!(connection_id = %id, "Duplicate connection id, ignoring");
        }
        added
    }

    /// `Connected|Active --join--> Active`
    ///
    /// A second join replaces the identity in place and announces it again.
    pub fn join(&mut self, id: &ConnectionId, identity: Identity) -> Result<(), DomainError> {
        let connection = self.live(id)?;

        let replaced = self.room.presence().write().join(id.clone(), identity.clone());
        connection.set_state(ConnectionState::Active);

        match &replaced {
            Some(previous) => info!(
                connection_id = %id,
                user_id = %identity.user_id,
                previous_user_id = %previous.user_id,
                "Connection re-joined"
            ),
            None => info!(
                connection_id = %id,
                user_id = %identity.user_id,
                username = %identity.username,
                "Connection joined"
            ),
        }

        if let Some(previous) = replaced {
            if previous.user_id != identity.user_id {
                self.release_typing(id, &previous);
            }
        }

        let report = self.router.broadcast_others(id, &BroadcastEvent::UserJoined(identity));
        self.track(report);
        self.broadcast_snapshot();
        Ok(())
    }

    /// `Active --sendMessage--> Active`
    ///
    /// Rejections go back to the sender only, ahead of anything queued later.
    pub fn send_message(
        &mut self,
        id: &ConnectionId,
        content: String,
        claimed: Option<&Identity>,
    ) -> Result<Message, DomainError> {
        let identity = self.registered_identity(id, claimed)?;

        let appended = self.room.messages().write().append(&identity, content);
        let message = match appended {
            Ok(message) => message,
            Err(e) => return Err(self.reject(id, e)),
        };

        debug!(
            connection_id = %id,
            message_id = %message.id,
            "Message accepted"
        );

        let report = self
            .router
            .broadcast_all(&BroadcastEvent::MessageCreated(message.clone()));
        self.track(report);
        Ok(message)
    }

    /// `Active --typing--> Active`
    pub fn typing(&mut self, id: &ConnectionId, claimed: Option<&Identity>) -> Result<(), DomainError> {
        let identity = self.registered_identity(id, claimed)?;
        let signal = TypingSignal::from(&identity);

        self.room.typing().write().start(signal.clone());

        let report = self
            .router
            .broadcast_others(id, &BroadcastEvent::TypingStarted(signal));
        self.track(report);
        Ok(())
    }

    /// `Active --stopTyping--> Active`
    pub fn stop_typing(&mut self, id: &ConnectionId, claimed: Option<&Identity>) -> Result<(), DomainError> {
        let identity = self.registered_identity(id, claimed)?;

        self.room.typing().write().stop(&identity.user_id);

        let report = self
            .router
            .broadcast_others(id, &BroadcastEvent::TypingStopped(TypingSignal::from(&identity)));
        self.track(report);
        Ok(())
    }

    /// `Connected|Active --disconnect--> Closed`
    ///
    /// Only the first disconnect does anything; later ones, and disconnects of
    /// unknown connections, yield `UnknownConnection`.
    pub fn disconnect(&mut self, id: &ConnectionId) -> Result<Option<Identity>, DomainError> {
        let Some(connection) = self.connections.remove_connection(id) else {
            debug!(connection_id = %id, "Disconnect for unknown connection");
            return Err(DomainError::UnknownConnection(id.clone()));
        };

        let left = self.room.presence().write().leave(id);
        let Some(identity) = left else {
            info!(
                connection_id = %id,
                age_ms = connection.age().as_millis(),
                "Connection closed before joining"
            );
            return Ok(None);
        };

        info!(
            connection_id = %id,
            user_id = %identity.user_id,
            username = %identity.username,
            "Connection left"
        );

        self.release_typing(id, &identity);

        let report = self
            .router
            .broadcast_others(id, &BroadcastEvent::UserLeft(identity.clone()));
        self.track(report);
        self.broadcast_snapshot();
        Ok(Some(identity))
    }

    /// Disconnect every connection flagged as lagging
    ///
    /// Their own departure broadcasts may flag more; loop until none are left.
    pub fn drop_lagging(&mut self) {
        loop {
            let pending = std::mem::take(&mut self.lagging);
            if pending.is_empty() {
                break;
            }

            for id in pending {
                if self.disconnect(&id).is_ok() {
                    warn!(connection_id = %id, "Disconnected lagging connection");
                }
            }
        }
    }

    fn live(&self, id: &ConnectionId) -> Result<Arc<Connection>, DomainError> {
        self.connections.get_connection(id).ok_or_else(|| {
            debug!(connection_id = %id, "Command for unknown connection");
            DomainError::UnknownConnection(id.clone())
        })
    }

    /// Identity registered for `id`, or a `NotJoined` rejection
    fn registered_identity(
        &mut self,
        id: &ConnectionId,
        claimed: Option<&Identity>,
    ) -> Result<Identity, DomainError> {
        self.live(id)?;

        let registered = self.room.presence().read().identity_of(id).cloned();
        let Some(identity) = registered else {
            return Err(self.reject(id, DomainError::NotJoined));
        };

        if let Some(claimed) = claimed {
            if claimed != &identity {
                debug!(
                    connection_id = %id,
                    registered = %identity,
                    claimed = %claimed,
                    "Payload identity differs from registered identity, using registered"
                );
            }
        }

        Ok(identity)
    }

    /// Report a rejection to the offending connection only
    fn reject(&mut self, id: &ConnectionId, err: DomainError) -> DomainError {
        debug!(connection_id = %id, code = err.code(), "Request rejected");
        let report = self.router.send_to(id, GatewayMessage::error(&err));
        self.track(report);
        err
    }

    /// Clear a departing identity's typing flag unless another connection still holds it
    fn release_typing(&mut self, origin: &ConnectionId, identity: &Identity) {
        let still_present = self.room.presence().read().has_user(&identity.user_id);
        if still_present {
            return;
        }

        let cleared = self.room.typing().write().stop(&identity.user_id);
        if let Some(signal) = cleared {
            let report = self
                .router
                .broadcast_others(origin, &BroadcastEvent::TypingStopped(signal));
            self.track(report);
        }
    }

    fn broadcast_snapshot(&mut self) {
        let snapshot = self.room.snapshot();
        let report = self
            .router
            .broadcast_all(&BroadcastEvent::PresenceSnapshot(snapshot));
        self.track(report);
    }

    fn track(&mut self, report: RouteReport) {
        self.lagging.extend(report.lagging);
    }
}

impl std::fmt::Debug for LifecycleController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleController")
            .field("connections", &self.connections.connection_count())
            .field("lagging", &self.lagging.len())
            .finish_non_exhaustive()
    }
}
