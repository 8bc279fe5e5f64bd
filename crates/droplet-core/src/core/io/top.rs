use super::traits::{AssemblyWriter, CombineMode, FileExistsError, WriteOptions};
use super::residue_entries;
use crate::core::models::assembly::Assembly;
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TopError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    FileExists(#[from] FileExistsError),
}

/// GROMACS `.top` topology skeleton.
///
/// Only the molecule inventory is written: `#include` lines for the force
/// field files, the `[ system ]` name and the `[ molecules ]` table. Molecule
/// type definitions are expected to come from the included files.
pub struct TopFile;

/// Counts consecutive entries that share a residue name.
fn molecule_table(assembly: &Assembly, combine: CombineMode) -> Vec<(&str, usize)> {
    let mut table: Vec<(&str, usize)> = Vec::new();
    for entry in residue_entries(assembly, combine) {
        if combine == CombineMode::Residues {
            if let Some((name, count)) = table.last_mut() {
                if *name == entry.name {
                    *count += 1;
                    continue;
                }
            }
        }
        table.push((entry.name, 1));
    }
    table
}

impl AssemblyWriter for TopFile {
    type Error = TopError;

    fn write_to(
        assembly: &Assembly,
        options: &WriteOptions,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        writeln!(writer, "; {}", options.title())?;
        if !options.includes.is_empty() {
            writeln!(writer)?;
            for include in &options.includes {
                writeln!(writer, "#include \"{}\"", include)?;
            }
        }

        writeln!(writer)?;
        writeln!(writer, "[ system ]")?;
        writeln!(writer, "{}", options.title())?;

        writeln!(writer)?;
        writeln!(writer, "[ molecules ]")?;
        writeln!(writer, "; {:<10}{:>10}", "name", "count")?;
        for (name, count) in molecule_table(assembly, options.combine) {
            writeln!(writer, "{:<12}{:>10}", name, count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::test_support::{small_assembly, water_at};
    use crate::core::models::assembly::{FLUID_NAME, SUBSTRATE_NAME};
    use crate::core::models::component::Component;
    use crate::core::models::molecule::Molecule;
    use nalgebra::Vector3;
    use tempfile::tempdir;

    fn render(assembly: &Assembly, options: &WriteOptions) -> String {
        let mut buf = Vec::new();
        TopFile::write_to(assembly, options, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn molecules_section(text: &str) -> Vec<String> {
        text.lines()
            .skip_while(|l| *l != "[ molecules ]")
            .skip(2)
            .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
            .collect()
    }

    #[test]
    fn combine_all_lists_each_component_once() {
        let text = render(&small_assembly(), &WriteOptions::default());
        assert_eq!(molecules_section(&text), vec!["LAT 1", "FLD 1"]);
        assert!(text.contains("[ system ]\nDroplet on substrate\n"));
        assert!(!text.contains("#include"));
    }

    #[test]
    fn residue_mode_counts_runs_of_same_residue() {
        let substrate = Component::new(
            SUBSTRATE_NAME,
            vec![Molecule::single_atom("C", "C"), Molecule::single_atom("C", "C")],
        );
        let argon = Molecule::single_atom("AR", "Ar");
        let fluid = Component::new(
            FLUID_NAME,
            vec![
                water_at(0.0, 0.0, 1.0),
                water_at(0.3, 0.0, 1.0),
                argon,
                water_at(0.6, 0.0, 1.0),
            ],
        );
        let assembly = Assembly::new(substrate, fluid, Vector3::new(1.0, 1.0, 1.0), 0.0);
        let options = WriteOptions {
            combine: CombineMode::Residues,
            ..Default::default()
        };
        let text = render(&assembly, &options);
        assert_eq!(
            molecules_section(&text),
            vec!["C 2", "H2O 2", "AR 1", "H2O 1"]
        );
    }

    #[test]
    fn includes_are_written_before_system() {
        let options = WriteOptions {
            includes: vec!["oplsaa.ff/forcefield.itp".into(), "spce.itp".into()],
            title: Some("water on graphene".into()),
            ..Default::default()
        };
        let text = render(&small_assembly(), &options);
        let include = text.find("#include \"oplsaa.ff/forcefield.itp\"").unwrap();
        let system = text.find("[ system ]").unwrap();
        assert!(include < system);
        assert!(text.contains("#include \"spce.itp\""));
        assert!(text.contains("[ system ]\nwater on graphene\n"));
    }

    #[test]
    fn empty_fluid_is_omitted() {
        let substrate = Component::new(SUBSTRATE_NAME, vec![Molecule::single_atom("C", "C")]);
        let assembly = Assembly::new(
            substrate,
            Component::new(FLUID_NAME, Vec::new()),
            Vector3::new(1.0, 1.0, 1.0),
            0.0,
        );
        let text = render(&assembly, &WriteOptions::default());
        assert_eq!(molecules_section(&text), vec!["LAT 1"]);
    }

    #[test]
    fn write_to_path_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("system.top");
        TopFile::write_to_path(&small_assembly(), &WriteOptions::default(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("; Droplet on substrate"));
    }
}
