//! Reading templates and writing finished assemblies.
//!
//! Writers implement [`traits::AssemblyWriter`] and share [`traits::WriteOptions`];
//! template readers implement [`traits::TemplateReader`]. Coordinates are kept in
//! nanometres everywhere except the BGF format, which stores ångströms.

pub mod bgf;
pub mod gro;
pub mod top;
pub mod traits;

use crate::core::models::assembly::Assembly;
use crate::core::models::molecule::Molecule;
use traits::CombineMode;

/// Chain identifier of the substrate in chain-aware formats.
pub const SUBSTRATE_CHAIN: char = 'A';
/// Chain identifier of the fluid in chain-aware formats.
pub const FLUID_CHAIN: char = 'B';

/// One residue entry of an output file: a run of molecules written under a
/// single residue name and number.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResidueEntry<'a> {
    pub name: &'a str,
    pub chain: char,
    pub molecules: &'a [Molecule],
}

/// Splits an assembly into residue entries, substrate first.
///
/// In [`CombineMode::All`] each non-empty component is one entry named after
/// the component; in [`CombineMode::Residues`] every molecule is its own entry.
pub(crate) fn residue_entries(assembly: &Assembly, combine: CombineMode) -> Vec<ResidueEntry<'_>> {
    let chains = [SUBSTRATE_CHAIN, FLUID_CHAIN];
    let mut entries = Vec::new();
    for (component, chain) in assembly.components().into_iter().zip(chains) {
        if component.is_empty() {
            continue;
        }
        match combine {
            CombineMode::All => entries.push(ResidueEntry {
                name: component.name(),
                chain,
                molecules: component.molecules(),
            }),
            CombineMode::Residues => {
                entries.extend(component.molecules().iter().map(|m| ResidueEntry {
                    name: m.name(),
                    chain,
                    molecules: std::slice::from_ref(m),
                }))
            }
        }
    }
    entries
}
