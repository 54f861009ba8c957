//! Surface/host message vocabulary
//!
//! Messages exchanged with the embedded drawing surface. Both directions are
//! closed enums tagged by `type`; a frame that matches no variant is a
//! [`ProtocolError`], never silently dropped.
//!
//! - `c2v:*` values travel surface → host
//! - `v2c:*` values travel host → surface

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use questforge_domain::Attributes;

use crate::diagram::{FlatDiagram, ShapeKind};

/// Provenance of a document or patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Origin {
    /// The user edited the drawing surface directly
    #[default]
    Surface,
    /// The host changed an entity outside the surface (property editor)
    LocalEdit,
    /// The surface reflecting back a host patch it just applied
    RemoteEcho,
}

// =============================================================================
// Surface → Host
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SurfaceMessage {
    /// The surface has loaded and can receive a document
    #[serde(rename = "c2v:canvasReady")]
    CanvasReady,
    /// The full diagram after an edit on the surface
    #[serde(rename = "c2v:documentUpdated")]
    DocumentUpdated {
        data: FlatDiagram,
        #[serde(default)]
        origin: Origin,
    },
    #[serde(rename = "c2v:select")]
    Select {
        #[serde(rename = "shapeType")]
        shape_type: ShapeKind,
        #[serde(default)]
        data: Value,
    },
    #[serde(rename = "c2v:unselect")]
    Unselect,
    /// Ask the host to offer states that can be imported into the current view
    #[serde(rename = "c2v:openImportDialog")]
    OpenImportDialog,
    /// Ask the host to start a test chat from the named state
    #[serde(rename = "c2v:chatFromHere")]
    ChatFromHere {
        #[serde(rename = "stateName")]
        state_name: String,
    },
}

impl SurfaceMessage {
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }
}

// =============================================================================
// Host → Surface
// =============================================================================

/// A targeted update of one figure: its id plus the fields to overwrite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapePatch {
    pub id: String,
    #[serde(flatten)]
    pub fields: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HostMessage {
    /// Replace everything the surface shows
    #[serde(rename = "v2c:setDocument")]
    SetDocument { data: FlatDiagram },
    /// Update one figure in place
    #[serde(rename = "v2c:setShapeData")]
    SetShapeData {
        data: ShapePatch,
        #[serde(default)]
        origin: Origin,
    },
}

impl HostMessage {
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed surface message: {0}")]
    Malformed(String),
    #[error("Failed to encode host message: {0}")]
    Encode(String),
}
