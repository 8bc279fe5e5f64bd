use super::traits::{AssemblyWriter, FileExistsError, TemplateReader, WriteOptions};
use super::residue_entries;
use crate::core::elements::infer_element;
use crate::core::models::assembly::Assembly;
use crate::core::models::atom::Atom;
use crate::core::models::molecule::{Molecule, MoleculeError};
use crate::core::models::topology::{Bond, BondOrder};
use nalgebra::Point3;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::debug;

/// BGF coordinates are in ångströms; models use nanometres.
const ANGSTROM_PER_NM: f64 = 10.0;
const MAX_SERIAL: usize = 99_999;

#[derive(Debug, Error)]
pub enum BgfError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    FileExists(#[from] FileExistsError),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: BgfParseErrorKind,
    },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
    #[error("Invalid molecule: {0}")]
    Molecule(#[from] MoleculeError),
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum BgfParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Line is too short for ATOM/HETATM record (must be at least 80 chars)")]
    LineTooShort,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn parse_float(line: &str, line_num: usize, start: usize, end: usize) -> Result<f64, BgfError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| BgfError::Parse {
        line: line_num,
        kind: BgfParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: value.into(),
        },
    })
}

fn parse_int<T: std::str::FromStr>(
    line: &str,
    line_num: usize,
    start: usize,
    end: usize,
) -> Result<T, BgfError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| BgfError::Parse {
        line: line_num,
        kind: BgfParseErrorKind::InvalidInt {
            columns: format!("{}-{}", start + 1, end),
            value: value.into(),
        },
    })
}

fn truncated(name: &str, width: usize) -> &str {
    match name.char_indices().nth(width) {
        Some((end, _)) => &name[..end],
        None => name,
    }
}

/// BIOGRF structure file.
pub struct BgfFile;

/// A residue being collected while reading.
struct PendingResidue {
    chain: char,
    id: isize,
    name: String,
    atoms: Vec<Atom>,
    serials: Vec<usize>,
}

impl TemplateReader for BgfFile {
    type Error = BgfError;

    fn read_from(reader: &mut impl BufRead) -> Result<Vec<Molecule>, Self::Error> {
        let mut residues: Vec<PendingResidue> = Vec::new();
        let mut conect: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        let mut orders: HashMap<usize, Vec<BondOrder>> = HashMap::new();
        let mut seen_serials = HashSet::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            match slice_and_trim(&line, 0, 6) {
                "ATOM" | "HETATM" => {
                    if line.len() < 80 {
                        return Err(BgfError::Parse {
                            line: line_num,
                            kind: BgfParseErrorKind::LineTooShort,
                        });
                    }
                    let serial: usize = parse_int(&line, line_num, 7, 12)?;
                    let name = slice_and_trim(&line, 13, 18);
                    if name.is_empty() {
                        return Err(BgfError::Parse {
                            line: line_num,
                            kind: BgfParseErrorKind::MissingRequiredField {
                                columns: "14-18".into(),
                            },
                        });
                    }
                    let res_name = slice_and_trim(&line, 19, 22);
                    let chain = slice_and_trim(&line, 23, 24).chars().next().unwrap_or('A');
                    let res_id: isize = parse_int(&line, line_num, 25, 30)?;
                    let position = Point3::new(
                        parse_float(&line, line_num, 30, 40)?,
                        parse_float(&line, line_num, 40, 50)?,
                        parse_float(&line, line_num, 50, 60)?,
                    ) / ANGSTROM_PER_NM;
                    let ff_type = slice_and_trim(&line, 61, 66);
                    let element = if ff_type.is_empty() {
                        infer_element(name)
                    } else {
                        infer_element(ff_type)
                    };

                    if !seen_serials.insert(serial) {
                        return Err(BgfError::Inconsistency(format!(
                            "Duplicate atom serial: {}",
                            serial
                        )));
                    }
                    let starts_new = residues
                        .last()
                        .is_none_or(|r| r.chain != chain || r.id != res_id);
                    if starts_new {
                        residues.push(PendingResidue {
                            chain,
                            id: res_id,
                            name: res_name.to_string(),
                            atoms: Vec::new(),
                            serials: Vec::new(),
                        });
                    }
                    if let Some(residue) = residues.last_mut() {
                        residue.atoms.push(Atom::new(name, &element, position));
                        residue.serials.push(serial);
                    }
                }
                "CONECT" | "ORDER" => {
                    let mut parts = line.split_whitespace().skip(1);
                    let Some(Ok(origin)) = parts.next().map(str::parse::<usize>) else {
                        continue;
                    };
                    if line.starts_with("CONECT") {
                        conect
                            .entry(origin)
                            .or_default()
                            .extend(parts.filter_map(|p| p.parse::<usize>().ok()));
                    } else {
                        orders
                            .entry(origin)
                            .or_default()
                            .extend(parts.map(|p| p.parse::<BondOrder>().unwrap_or_default()));
                    }
                }
                "END" => break,
                _ => {}
            }
        }

        if residues.is_empty() {
            return Err(BgfError::MissingRecord("ATOM/HETATM records".into()));
        }

        let mut location: HashMap<usize, (usize, usize)> = HashMap::new();
        for (r, residue) in residues.iter().enumerate() {
            for (a, serial) in residue.serials.iter().enumerate() {
                location.insert(*serial, (r, a));
            }
        }

        let mut bonds: Vec<Vec<Bond>> = vec![Vec::new(); residues.len()];
        let mut skipped = 0usize;
        for (origin, partners) in &conect {
            let Some(&(r1, a1)) = location.get(origin) else {
                return Err(BgfError::Inconsistency(format!(
                    "CONECT references unknown atom {}",
                    origin
                )));
            };
            for (i, partner) in partners.iter().enumerate() {
                if partner <= origin && conect.get(partner).is_some_and(|p| p.contains(origin)) {
                    continue;
                }
                let Some(&(r2, a2)) = location.get(partner) else {
                    return Err(BgfError::Inconsistency(format!(
                        "CONECT references unknown atom {}",
                        partner
                    )));
                };
                if r1 != r2 {
                    skipped += 1;
                    continue;
                }
                let order = orders
                    .get(origin)
                    .and_then(|o| o.get(i))
                    .copied()
                    .unwrap_or_default();
                if !bonds[r1].iter().any(|b| b.contains(a1) && b.contains(a2)) {
                    bonds[r1].push(Bond::new(a1, a2, order));
                }
            }
        }
        if skipped > 0 {
            debug!(skipped, "Ignored bonds between different residues.");
        }

        residues
            .into_iter()
            .zip(bonds)
            .map(|(residue, bonds)| {
                Molecule::new(&residue.name, residue.atoms, bonds).map_err(BgfError::from)
            })
            .collect()
    }
}

impl AssemblyWriter for BgfFile {
    type Error = BgfError;

    /// Writes chain A for the substrate and chain B for the fluid. Bonds are
    /// emitted as CONECT records, with ORDER records for non-single bonds.
    fn write_to(
        assembly: &Assembly,
        options: &WriteOptions,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        if assembly.atom_count() > MAX_SERIAL {
            return Err(BgfError::Inconsistency(format!(
                "{} atoms exceed the {} serial numbers available in BGF",
                assembly.atom_count(),
                MAX_SERIAL
            )));
        }

        let p = assembly.periodicity() * ANGSTROM_PER_NM;
        writeln!(writer, "BIOGRF  200")?;
        writeln!(writer, "DESCRP {}", options.title())?;
        writeln!(writer, "REMARK Generated by dropletbuilder")?;
        writeln!(
            writer,
            "CRYSTX {:>11.5}{:>11.5}{:>11.5}{:>11.5}{:>11.5}{:>11.5}",
            p.x, p.y, p.z, 90.0, 90.0, 90.0
        )?;
        writeln!(
            writer,
            "FORMAT ATOM   (a6,1x,i5,1x,a5,1x,a3,1x,a1,1x,a5,3f10.5,1x,a5,i3,i2,1x,f8.5)"
        )?;

        let mut bond_map: BTreeMap<usize, Vec<(usize, BondOrder)>> = BTreeMap::new();
        let mut serial = 0usize;
        for (index, entry) in residue_entries(assembly, options.combine).iter().enumerate() {
            for molecule in entry.molecules {
                let first = serial + 1;
                for bond in molecule.bonds() {
                    let (s1, s2) = (first + bond.atom1, first + bond.atom2);
                    bond_map.entry(s1).or_default().push((s2, bond.order));
                    bond_map.entry(s2).or_default().push((s1, bond.order));
                }
                for atom in molecule.atoms() {
                    serial += 1;
                    let bond_count = bond_map.get(&serial).map_or(0, Vec::len);
                    writeln!(
                        writer,
                        "{:<6} {:>5} {:<5} {:>3} {:1} {:>5}{:>10.5}{:>10.5}{:>10.5} {:<5}{:>3}{:>2} {:>8.5}",
                        "HETATM",
                        serial,
                        truncated(&atom.name, 5),
                        truncated(entry.name, 3),
                        entry.chain,
                        index + 1,
                        atom.position.x * ANGSTROM_PER_NM,
                        atom.position.y * ANGSTROM_PER_NM,
                        atom.position.z * ANGSTROM_PER_NM,
                        truncated(&atom.element, 5),
                        bond_count,
                        0,
                        0.0,
                    )?;
                }
            }
        }

        writeln!(writer, "FORMAT CONECT (a6,12i6)")?;
        for (origin, partners) in &bond_map {
            write!(writer, "CONECT {:>5}", origin)?;
            for (partner, _) in partners {
                write!(writer, " {:>5}", partner)?;
            }
            writeln!(writer)?;
            if partners.iter().any(|(_, o)| *o != BondOrder::Single) {
                write!(writer, "ORDER  {:>5}", origin)?;
                for (_, order) in partners {
                    write!(writer, " {:>5}", order.code())?;
                }
                writeln!(writer)?;
            }
        }
        writeln!(writer, "END")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::test_support::small_assembly;
    use crate::core::io::traits::CombineMode;
    use std::io::Cursor;

    fn render(options: &WriteOptions) -> String {
        let mut buf = Vec::new();
        BgfFile::write_to(&small_assembly(), options, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    const ETHENE_LIKE: &str = "\
BIOGRF  200
DESCRP test
HETATM     1 C1    ETH A     1   0.00000   0.00000   0.00000 C_2    3 0  0.00000
HETATM     2 C2    ETH A     1   1.33000   0.00000   0.00000 C_2    3 0  0.00000
HETATM     3 O1    WAT B     2   5.00000   5.00000   5.00000 O_3    0 0  0.00000
CONECT     1     2
ORDER      1     2
CONECT     2     1
ORDER      2     2
END
";

    #[test]
    fn atom_records_are_eighty_columns_with_angstrom_coordinates() {
        let text = render(&WriteOptions::default());
        let atoms: Vec<&str> = text.lines().filter(|l| l.starts_with("HETATM")).collect();
        assert_eq!(atoms.len(), 8);
        for line in &atoms {
            assert_eq!(line.len(), 80);
        }
        assert_eq!(slice_and_trim(atoms[1], 30, 40), "5.00000");
        assert_eq!(slice_and_trim(atoms[2], 19, 22), "FLD");
        assert_eq!(slice_and_trim(atoms[2], 23, 24), "B");
        assert_eq!(slice_and_trim(atoms[2], 66, 69), "2");
        assert!(text.contains("CRYSTX    10.00000   10.00000   20.00000"));
        assert!(text.trim_end().ends_with("END"));
    }

    #[test]
    fn conect_records_cover_both_directions() {
        let text = render(&WriteOptions::default());
        assert!(text.contains("CONECT     3     4     5"));
        assert!(text.contains("CONECT     4     3"));
        assert!(!text.contains("ORDER"));
    }

    #[test]
    fn written_residues_read_back_as_molecules_in_nanometres() {
        let options = WriteOptions {
            combine: CombineMode::Residues,
            ..Default::default()
        };
        let molecules = BgfFile::read_from(&mut Cursor::new(render(&options))).unwrap();
        assert_eq!(molecules.len(), 4);
        let water = &molecules[3];
        assert_eq!(water.name(), "H2O");
        assert_eq!(water.len(), 3);
        assert_eq!(water.bonds().len(), 2);
        assert!((water.atoms()[0].position.z - 0.9).abs() < 1e-9);
        assert_eq!(water.atoms()[0].element, "O");
    }

    #[test]
    fn reader_applies_bond_orders_and_splits_residues() {
        let molecules = BgfFile::read_from(&mut Cursor::new(ETHENE_LIKE)).unwrap();
        assert_eq!(molecules.len(), 2);
        assert_eq!(molecules[0].name(), "ETH");
        assert_eq!(molecules[0].bonds().len(), 1);
        assert_eq!(molecules[0].bond_between(0, 1), Some(BondOrder::Double));
        assert!((molecules[0].atoms()[1].position.x - 0.133).abs() < 1e-9);
        assert_eq!(molecules[1].name(), "WAT");
        assert!(molecules[1].bonds().is_empty());
    }

    #[test]
    fn reader_rejects_short_atom_line() {
        let text = "HETATM     1 C1    ETH A     1   0.00000\n";
        let result = BgfFile::read_from(&mut Cursor::new(text));
        assert!(matches!(
            result,
            Err(BgfError::Parse {
                line: 1,
                kind: BgfParseErrorKind::LineTooShort
            })
        ));
    }

    #[test]
    fn reader_requires_atom_records() {
        let result = BgfFile::read_from(&mut Cursor::new("BIOGRF  200\nEND\n"));
        assert!(matches!(result, Err(BgfError::MissingRecord(_))));
    }

    #[test]
    fn reader_rejects_duplicate_serials() {
        let text = ETHENE_LIKE.replace("HETATM     2", "HETATM     1");
        let result = BgfFile::read_from(&mut Cursor::new(text));
        assert!(matches!(result, Err(BgfError::Inconsistency(_))));
    }

    #[test]
    fn long_residue_names_keep_column_layout() {
        assert_eq!(truncated("HEXANE", 3), "HEX");
        assert_eq!(truncated("Au", 5), "Au");
    }
}
