// Network module: talking to the manager and discovery services
//
// Both services answer the same node-list request, so one client serves both;
// the `NodeSource` trait is the seam the monitor and cross-checker depend on.

pub mod client;

pub use client::{NodeListClient, NodeSource};
