//! # Engine Module
//!
//! The droplet carving engine: it turns a populated substrate and a bulk-filled
//! fluid sphere into a spherical-cap droplet resting on the surface.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Builder with fail-fast validation of every input
//! - **Cap Geometry** ([`cap`]) - Cap height from radius and contact angle, and the cap-boundary filter
//! - **Placement** ([`placement`]) - Seating the droplet above the surface and sizing the periodic box
//! - **Surface** ([`surface`]) - Dispatch between the graphene and custom cubic substrates
//! - **Progress Monitoring** ([`progress`]) - Phase events for front ends
//! - **Error Handling** ([`error`]) - Failures that only appear once geometry is built
//!
//! Every step is a pure function of its inputs; nothing is mutated in place.

pub mod cap;
pub mod config;
pub mod error;
pub mod placement;
pub mod progress;
pub mod surface;
