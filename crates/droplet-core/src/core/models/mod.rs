//! # Core Models Module
//!
//! Immutable value types describing every molecular object handled by the library.
//!
//! ## Key Components
//!
//! - [`atom`] - A named point with an element symbol
//! - [`topology`] - Bond orders and intra-molecular bonds
//! - [`molecule`] - A rigid group of atoms that moves and is removed as a unit
//! - [`component`] - A named, ordered collection of molecules (substrate or fluid)
//! - [`assembly`] - The final two-component system with its periodic box
//!
//! Every transformation returns a new value; nothing is mutated in place.
//!
//! ```ignore
//! use dropletbuilder::core::models::{atom::Atom, molecule::Molecule};
//! use nalgebra::{Point3, Vector3};
//!
//! let carbon = Molecule::single_atom("C", "C");
//! let shifted = carbon.translated(&Vector3::new(0.0, 0.0, 0.335));
//! ```

pub mod assembly;
pub mod atom;
pub mod component;
pub mod molecule;
pub mod topology;
