//! # Workflows Module
//!
//! Top-level entry points that run a complete build from a validated
//! configuration to a finished [`Assembly`](crate::core::models::assembly::Assembly).
//!
//! - **Droplet Workflow** ([`droplet`]) - Substrate generation, sphere filling,
//!   cap carving and placement, with progress reporting.

pub mod droplet;
