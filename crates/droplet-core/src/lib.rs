//! # DropletBuilder Core Library
//!
//! A library for building molecular-dynamics initial configurations of a liquid droplet
//! (water, ionic liquid, alkane) resting on a crystalline substrate such as graphene or gold.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Immutable molecular value types (`Molecule`, `Component`,
//!   `Assembly`), the lattice generator, the sphere filler, built-in fluid templates and file I/O.
//!
//! - **[`engine`]: The Carving Logic.** Validated configuration, the spherical-cap height
//!   function, the cap-boundary filter, vertical placement and assembly of the periodic box.
//!
//! - **[`workflows`]: The Public API.** Ties `core` and `engine` together into a single
//!   end-to-end droplet build with progress reporting.
//!
//! All lengths are in nanometres, angles in degrees and densities in kg/m³.

pub mod core;
pub mod engine;
pub mod workflows;
