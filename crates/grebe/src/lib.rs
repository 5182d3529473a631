#![forbid(unsafe_code)]

//! Headless graph layout engines.
//!
//! Two independent engines over the same graph container:
//!
//! - [`rank`] assigns integer layers to the nodes of a DAG by network simplex,
//!   minimizing total weighted edge length subject to per-edge minimum-length
//!   constraints.
//! - [`force`] places nodes in continuous 2D space by a cooled
//!   spring-electrical simulation, optionally pinned to a boundary ellipse
//!   through ports and accelerated with a sparse spatial grid.
//!
//! The engines do not call each other; higher-level drivers compose them.
//! Every call owns its scratch state, so independent invocations are safe to
//! run concurrently.

pub use grebe_graph as graph;

pub mod force;
pub mod model;
pub mod rank;
pub mod util;

pub use model::{EdgeLabel, GraphLabel, NodeLabel, Pinned, Point};

/// A graph shaped the way both engines consume it.
pub type LayoutGraph = graph::Digraph<NodeLabel, EdgeLabel, GraphLabel>;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
