//! Scene graph for the mirror scene.
//!
//! Nodes live in an arena owned by [`Scene`] and are addressed by [`NodeId`].
//! Renderers never walk the graph themselves; they consume the flattened
//! [`DrawItem`], [`LineItem`] and [`Lighting`] views.
//!
//! # Invariants
//! - A node's world transform is its parent chain composed root-first.
//! - An invisible node hides its whole subtree.
//! - Traversal order is depth-first, pre-order, children in insertion order.

mod geometry;
mod graph;
mod node;

pub use geometry::Geometry;
pub use graph::{DrawItem, LineItem, Lighting, Scene};
pub use mirrorscene_common::{Color, EnvMapId, GeometryId, NodeId, Transform};
pub use node::{DirectionalLight, HemisphereLight, Material, MeshData, Node, NodeKind};
