//! Connection management for WebSocket clients.
//!
//! Tracks connected drawing surfaces and editor UIs. Implements
//! [`SurfaceSink`] by fanning messages out to every client of the right kind.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use questforge_shared::HostMessage;

use crate::infrastructure::ports::{EditorEvent, SurfaceSink};

/// What is on the other end of a socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKind {
    /// An embedded drawing surface speaking the `c2v:`/`v2c:` vocabulary
    Surface,
    /// A host UI listening for editor events
    Editor,
}

/// A frame queued for one client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outbound {
    Host(HostMessage),
    Event(EditorEvent),
}

/// Information about a connected client.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub connection_id: Uuid,
    pub kind: ClientKind,
}

/// Manages all active WebSocket connections.
#[derive(Default)]
pub struct ConnectionManager {
    /// Map of connection_id -> (ConnectionInfo, sender channel)
    connections: RwLock<HashMap<Uuid, (ConnectionInfo, mpsc::Sender<Outbound>)>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(
        &self,
        connection_id: Uuid,
        kind: ClientKind,
        sender: mpsc::Sender<Outbound>,
    ) {
        let info = ConnectionInfo {
            connection_id,
            kind,
        };
        self.connections
            .write()
            .await
            .insert(connection_id, (info, sender));
        tracing::debug!(connection_id = %connection_id, kind = ?kind, "Connection registered");
    }

    pub async fn unregister(&self, connection_id: Uuid) {
        if self.connections.write().await.remove(&connection_id).is_some() {
            tracing::debug!(connection_id = %connection_id, "Connection unregistered");
        }
    }

    pub async fn count(&self, kind: ClientKind) -> usize {
        self.connections
            .read()
            .await
            .values()
            .filter(|(info, _)| info.kind == kind)
            .count()
    }

    /// Queue a frame for every client of `kind`. A full or closed channel
    /// drops the frame for that client only.
    pub async fn broadcast(&self, kind: ClientKind, frame: Outbound) {
        let connections = self.connections.read().await;
        for (info, sender) in connections.values() {
            if info.kind != kind {
                continue;
            }
            if let Err(e) = sender.try_send(frame.clone()) {
                tracing::warn!(
                    connection_id = %info.connection_id,
                    error = %e,
                    "Failed to broadcast message"
                );
            }
        }
    }
}

#[async_trait]
impl SurfaceSink for ConnectionManager {
    async fn publish(&self, message: HostMessage) {
        self.broadcast(ClientKind::Surface, Outbound::Host(message))
            .await;
    }

    async fn notify(&self, event: EditorEvent) {
        self.broadcast(ClientKind::Editor, Outbound::Event(event))
            .await;
    }
}
