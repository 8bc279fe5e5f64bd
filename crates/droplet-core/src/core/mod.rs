//! # Core Module
//!
//! The fundamental building blocks used by the droplet carving engine.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, molecules, components and assemblies
//! - **Substrate Generation** ([`lattice`]) - Unit-cell tiling and periodic wrap correction
//! - **Fluid Packing** ([`fill`]) - Density-driven filling of a sphere with molecule templates
//! - **Fluid Templates** ([`templates`]) - Built-in water and alkane molecules, file-backed templates
//! - **Element Data** ([`elements`]) - Atomic masses and element inference from atom names
//! - **File I/O** ([`io`]) - GRO, TOP and BGF writers, BGF and GRO template readers
//! - **Geometry** ([`utils`]) - Rotations and hydrogen placement helpers

pub mod elements;
pub mod fill;
pub mod io;
pub mod lattice;
pub mod models;
pub mod templates;
pub mod utils;
