use super::traits::{AssemblyWriter, FileExistsError, TemplateReader, WriteOptions};
use super::residue_entries;
use crate::core::models::assembly::Assembly;
use crate::core::models::atom::Atom;
use crate::core::models::molecule::Molecule;
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Residue and atom numbers wrap around at this value, as GROMACS expects.
const NUMBER_WRAP: usize = 100_000;
const NAME_WIDTH: usize = 5;

#[derive(Debug, Error)]
pub enum GroError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    FileExists(#[from] FileExistsError),
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("File ended after {found} of {expected} atom records")]
    Truncated { expected: usize, found: usize },
}

/// GROMACS `.gro` coordinate file.
pub struct GroFile;

fn truncated(name: &str) -> &str {
    match name.char_indices().nth(NAME_WIDTH) {
        Some((end, _)) => &name[..end],
        None => name,
    }
}

impl AssemblyWriter for GroFile {
    type Error = GroError;

    fn write_to(
        assembly: &Assembly,
        options: &WriteOptions,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        writeln!(writer, "{}", options.title())?;
        writeln!(writer, "{:>5}", assembly.atom_count())?;

        let mut atom_number = 0usize;
        for (index, entry) in residue_entries(assembly, options.combine).iter().enumerate() {
            let residue_number = (index + 1) % NUMBER_WRAP;
            for atom in entry.molecules.iter().flat_map(|m| m.atoms()) {
                atom_number = (atom_number + 1) % NUMBER_WRAP;
                writeln!(
                    writer,
                    "{:>5}{:<5}{:>5}{:>5}{:>8.3}{:>8.3}{:>8.3}",
                    residue_number,
                    truncated(entry.name),
                    truncated(&atom.name),
                    atom_number,
                    atom.position.x,
                    atom.position.y,
                    atom.position.z,
                )?;
            }
        }

        let p = assembly.periodicity();
        writeln!(writer, "{:>10.5}{:>10.5}{:>10.5}", p.x, p.y, p.z)?;
        Ok(())
    }
}

fn field<'a>(line: &'a str, start: usize, end: usize) -> &'a str {
    line.get(start..end.min(line.len())).unwrap_or("").trim()
}

fn parse_coordinate(line: &str, line_num: usize, start: usize) -> Result<f64, GroError> {
    let raw = field(line, start, start + 8);
    raw.parse().map_err(|_| GroError::Parse {
        line: line_num,
        message: format!(
            "invalid coordinate '{}' in columns {}-{}",
            raw,
            start + 1,
            start + 8
        ),
    })
}

impl TemplateReader for GroFile {
    type Error = GroError;

    /// Groups atoms into molecules by residue number. Element symbols are
    /// inferred from atom names; bonds are not stored in this format.
    fn read_from(reader: &mut impl BufRead) -> Result<Vec<Molecule>, Self::Error> {
        let mut lines = reader.lines();
        // Title line.
        lines.next().transpose()?;
        let count_line = lines.next().transpose()?.unwrap_or_default();
        let expected: usize = count_line.trim().parse().map_err(|_| GroError::Parse {
            line: 2,
            message: format!("invalid atom count '{}'", count_line.trim()),
        })?;

        let mut molecules = Vec::new();
        let mut current: Option<(String, String, Vec<Atom>)> = None;
        for found in 0..expected {
            let line_num = found + 3;
            let Some(line) = lines.next().transpose()? else {
                return Err(GroError::Truncated { expected, found });
            };
            let residue_number = field(&line, 0, 5).to_string();
            let residue_name = field(&line, 5, 10).to_string();
            let atom_name = field(&line, 10, 15);
            if atom_name.is_empty() {
                return Err(GroError::Parse {
                    line: line_num,
                    message: "missing atom name in columns 11-15".to_string(),
                });
            }
            let position = Point3::new(
                parse_coordinate(&line, line_num, 20)?,
                parse_coordinate(&line, line_num, 28)?,
                parse_coordinate(&line, line_num, 36)?,
            );
            let atom = Atom::from_name(atom_name, position);

            if let Some((number, name, atoms)) = current.as_mut() {
                if *number == residue_number && *name == residue_name {
                    atoms.push(atom);
                    continue;
                }
            }
            if let Some((_, name, atoms)) = current.take() {
                molecules.push(Molecule::from_atoms(&name, atoms));
            }
            current = Some((residue_number, residue_name, vec![atom]));
        }
        if let Some((_, name, atoms)) = current {
            molecules.push(Molecule::from_atoms(&name, atoms));
        }
        Ok(molecules)
    }
}
