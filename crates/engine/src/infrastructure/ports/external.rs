//! Outbound port towards connected drawing surfaces and editor UIs.

use async_trait::async_trait;

use questforge_shared::HostMessage;

use super::types::EditorEvent;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SurfaceSink: Send + Sync {
    /// Deliver a host message to every connected surface.
    async fn publish(&self, message: HostMessage);
    /// Deliver an editor event to every connected editor UI.
    async fn notify(&self, event: EditorEvent);
}
