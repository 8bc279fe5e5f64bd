use crate::core::models::assembly::Assembly;
use crate::core::models::molecule::Molecule;
use std::error::Error;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// How molecules are grouped into entries of the output files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CombineMode {
    /// Each component (substrate, fluid) is a single molecule entry.
    #[default]
    All,
    /// Every molecule keeps its own residue.
    Residues,
}

/// Options shared by every assembly writer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WriteOptions {
    /// Replace the target file if it already exists.
    pub overwrite: bool,
    pub combine: CombineMode,
    /// Title or system name; writers fall back to [`DEFAULT_TITLE`].
    pub title: Option<String>,
    /// Force-field files referenced from the topology.
    pub includes: Vec<String>,
}

pub const DEFAULT_TITLE: &str = "Droplet on substrate";

impl WriteOptions {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }
}

#[derive(Debug, Error)]
#[error("Output file '{}' already exists (enable overwrite to replace it)", .0.display())]
pub struct FileExistsError(pub PathBuf);

/// Serializes an [`Assembly`] into a structure or topology format.
pub trait AssemblyWriter {
    /// The error type for write operations.
    type Error: Error + From<io::Error> + From<FileExistsError>;

    /// Writes the assembly to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if the assembly cannot be represented in the format or
    /// if writing fails.
    fn write_to(
        assembly: &Assembly,
        options: &WriteOptions,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error>;

    /// Writes the assembly to a file, refusing to replace an existing file
    /// unless `options.overwrite` is set.
    ///
    /// # Errors
    ///
    /// Returns [`FileExistsError`] (converted into `Self::Error`) when the file
    /// exists and overwriting is off, or any error from [`AssemblyWriter::write_to`].
    fn write_to_path<P: AsRef<Path>>(
        assembly: &Assembly,
        options: &WriteOptions,
        path: P,
    ) -> Result<(), Self::Error> {
        let path = path.as_ref();
        let file = if options.overwrite {
            File::create(path)?
        } else {
            match OpenOptions::new().write(true).create_new(true).open(path) {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    return Err(FileExistsError(path.to_path_buf()).into());
                }
                Err(e) => return Err(e.into()),
            }
        };
        let mut writer = BufWriter::new(file);
        Self::write_to(assembly, options, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Reads molecule templates from a structure file, one molecule per residue.
pub trait TemplateReader {
    /// The error type for read operations.
    type Error: Error + From<io::Error>;

    /// Reads every residue of the input as a molecule, in file order.
    fn read_from(reader: &mut impl BufRead) -> Result<Vec<Molecule>, Self::Error>;

    /// Reads every residue of the file at `path` as a molecule.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Molecule>, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}
