//! Positional value objects owned by views.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A point on the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Routing geometry for one connection in one view.
///
/// An absent route and an empty route render the same way: the surface
/// falls back to its default router.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Route {
    #[serde(rename = "vertex", default)]
    pub vertices: Vec<Position>,
    /// Router bookkeeping written by the surface; kept verbatim.
    #[serde(
        rename = "routingMetaData",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub routing_meta_data: Option<Value>,
}

impl Route {
    pub fn new(vertices: Vec<Position>) -> Self {
        Self {
            vertices,
            routing_meta_data: None,
        }
    }

    /// True for a route that carries nothing beyond default routing.
    pub fn is_default(&self) -> bool {
        self.vertices.is_empty() && self.routing_meta_data.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_uses_surface_field_names() {
        let route = Route::new(vec![Position::new(1.0, 2.5)]);
        let json = serde_json::to_value(&route).unwrap();
        assert_eq!(json, serde_json::json!({"vertex": [{"x": 1.0, "y": 2.5}]}));
    }

    #[test]
    fn missing_vertex_list_reads_as_empty() {
        let route: Route = serde_json::from_str("{}").unwrap();
        assert!(route.vertices.is_empty());
        assert!(route.routing_meta_data.is_none());
    }
}
