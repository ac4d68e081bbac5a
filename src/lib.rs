//! Interactive lineage graph viewer.
//!
//! Nodes are placed by a force simulation that keeps every dependency one
//! column to the left of its dependents, edges are routed as cubic curves,
//! and a [`view::GraphView`] ties layout, interaction and the shared
//! [`selection::SelectionStore`] together for one mounted diagram.

pub mod app;
pub mod config;
pub mod interaction;
pub mod lineage;
pub mod physics;
pub mod routing;
pub mod selection;
pub mod view;

mod util;
