use crate::cli::{BuildArgs, CombineArg, LatticePreset};
use crate::error::{CliError, Result};
use crate::utils::parser;
use clap::ValueEnum;
use dropletbuilder::core::fill::FillAmount;
use dropletbuilder::core::io::traits::WriteOptions;
use dropletbuilder::core::lattice::Lattice;
use dropletbuilder::core::models::molecule::Molecule;
use dropletbuilder::core::templates::TemplateSource;
use dropletbuilder::engine::config::{DropletConfig, DropletConfigBuilder};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// The structure and topology formats the CLI can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Gro,
    Top,
    Bgf,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("gro") => Ok(Self::Gro),
            Some("top") => Ok(Self::Top),
            Some("bgf") => Ok(Self::Bgf),
            _ => Err(CliError::Argument(format!(
                "Cannot infer output format from '{}'. Supported extensions: .gro, .top, .bgf",
                path.display()
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputTarget {
    pub path: PathBuf,
    pub format: OutputFormat,
}

/// Everything the `build` command needs after merging file and CLI settings.
#[derive(Debug)]
pub struct BuildPlan {
    pub droplet: DropletConfig,
    pub outputs: Vec<OutputTarget>,
    pub write_options: WriteOptions,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialFluid {
    template: String,
    name: Option<String>,
    density: Option<f64>,
    count: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialCompound {
    name: String,
    element: Option<String>,
}

impl PartialCompound {
    fn to_molecule(&self) -> Molecule {
        Molecule::single_atom(&self.name, self.element.as_deref().unwrap_or(&self.name))
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialLattice {
    preset: Option<LatticePreset>,
    file: Option<PathBuf>,
    spacing: Option<[f64; 3]>,
    angles: Option<[f64; 3]>,
    basis: Option<BTreeMap<String, Vec<[f64; 3]>>>,
    compound: Option<PartialCompound>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialOutput {
    #[serde(default)]
    files: Vec<PathBuf>,
    overwrite: Option<bool>,
    combine: Option<CombineArg>,
    #[serde(default)]
    includes: Vec<String>,
    system_name: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialDropletConfig {
    radius: Option<f64>,
    angle: Option<f64>,
    x: Option<f64>,
    y: Option<f64>,
    seed: Option<u64>,
    #[serde(default, rename = "fluid")]
    fluids: Vec<PartialFluid>,
    lattice: Option<PartialLattice>,
    output: Option<PartialOutput>,
    /// Directory of the source file; relative input paths resolve against it.
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl PartialDropletConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    pub fn merge_with_cli(mut self, args: &BuildArgs) -> Result<BuildPlan> {
        self.apply_set_values(&args.set_values)?;

        let (templates, amounts) = self.merge_fluids(args)?;
        let (lattice, compound) = self.merge_lattice(args)?;

        let mut builder = DropletConfigBuilder::new();
        if let Some(radius) = args.radius.or(self.radius) {
            builder = builder.radius(radius);
        }
        if let Some(angle) = args.angle.or(self.angle) {
            builder = builder.angle(angle);
        }
        if let Some(x) = args.x.or(self.x) {
            builder = builder.x(x);
        }
        if let Some(y) = args.y.or(self.y) {
            builder = builder.y(y);
        }
        if let Some(seed) = args.seed.or(self.seed) {
            builder = builder.seed(seed);
        }
        for template in templates {
            builder = builder.fluid(template);
        }
        for amount in amounts {
            builder = match amount {
                FillAmount::Density(d) => builder.density(d),
                FillAmount::Count(n) => builder.count(n),
            };
        }
        if let Some(lattice) = lattice {
            builder = builder.lattice(lattice);
        }
        if let Some(compound) = compound {
            builder = builder.lattice_compound(compound);
        }
        let droplet = builder.build()?;

        let (outputs, write_options) = self.merge_output(args)?;
        Ok(BuildPlan {
            droplet,
            outputs,
            write_options,
        })
    }

    fn resolve_input(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn load_template(&self, spec: &str) -> Result<Molecule> {
        let source = match TemplateSource::from_str(spec)? {
            TemplateSource::File(path) => TemplateSource::File(self.resolve_input(&path)),
            other => other,
        };
        debug!("Loading fluid template '{}'", source);
        Ok(source.load()?)
    }

    /// Fluids from `--fluid` replace those of the file, and then their amounts
    /// must come from `--density` or `--count` too.
    fn merge_fluids(&self, args: &BuildArgs) -> Result<(Vec<Molecule>, Vec<FillAmount>)> {
        if !args.fluids.is_empty() {
            let templates = args
                .fluids
                .iter()
                .map(|spec| TemplateSource::from_str(spec)?.load().map_err(CliError::from))
                .collect::<Result<Vec<_>>>()?;
            let amounts = args
                .densities
                .iter()
                .map(|&d| FillAmount::Density(d))
                .chain(args.counts.iter().map(|&n| FillAmount::Count(n)))
                .collect();
            return Ok((templates, amounts));
        }
        if !args.densities.is_empty() || !args.counts.is_empty() {
            return Err(CliError::Argument(
                "--density and --count need matching --fluid arguments".to_string(),
            ));
        }

        let mut templates = Vec::with_capacity(self.fluids.len());
        let mut amounts = Vec::with_capacity(self.fluids.len());
        for fluid in &self.fluids {
            let template = self.load_template(&fluid.template)?;
            let template = match &fluid.name {
                Some(name) => template.renamed(name),
                None => template,
            };
            let amount = match (fluid.density, fluid.count) {
                (Some(d), None) => FillAmount::Density(d),
                (None, Some(n)) => FillAmount::Count(n),
                (Some(_), Some(_)) => {
                    return Err(CliError::Config(format!(
                        "Fluid '{}' sets both `density` and `count`; choose one",
                        fluid.template
                    )));
                }
                (None, None) => {
                    return Err(CliError::Config(format!(
                        "Fluid '{}' needs a `density` or a `count`",
                        fluid.template
                    )));
                }
            };
            templates.push(template);
            amounts.push(amount);
        }
        Ok((templates, amounts))
    }

    fn merge_lattice(&self, args: &BuildArgs) -> Result<(Option<Lattice>, Option<Molecule>)> {
        let section = self.lattice.clone().unwrap_or_default();

        let cli_compound = args
            .lattice_compound
            .as_deref()
            .map(parser::parse_compound)
            .transpose()?
            .map(|(name, element)| Molecule::single_atom(&name, &element));
        let compound = cli_compound.or_else(|| section.compound.as_ref().map(PartialCompound::to_molecule));

        if let Some(preset) = args.lattice {
            return Ok(with_preset(preset, compound));
        }
        if let Some(path) = &args.lattice_file {
            return Ok((Some(Lattice::load(path)?), compound));
        }

        let explicit = section.spacing.is_some() || section.basis.is_some();
        match (section.preset, &section.file, explicit) {
            (None, None, false) => Ok((None, compound)),
            (Some(preset), None, false) => Ok(with_preset(preset, compound)),
            (None, Some(path), false) => {
                Ok((Some(Lattice::load(&self.resolve_input(path))?), compound))
            }
            (None, None, true) => {
                let (Some(spacing), Some(basis)) = (section.spacing, section.basis) else {
                    return Err(CliError::Config(
                        "`lattice` needs both `spacing` and `basis`".to_string(),
                    ));
                };
                let angles = section.angles.unwrap_or([90.0; 3]);
                Ok((Some(Lattice::new(spacing, angles, basis)), compound))
            }
            _ => Err(CliError::Config(
                "`lattice` accepts only one of `preset`, `file`, or `spacing` with `basis`"
                    .to_string(),
            )),
        }
    }

    fn merge_output(&mut self, args: &BuildArgs) -> Result<(Vec<OutputTarget>, WriteOptions)> {
        let section = self.output.take().unwrap_or_default();

        let files = if args.outputs.is_empty() {
            section.files
        } else {
            args.outputs.clone()
        };
        if files.is_empty() {
            return Err(CliError::Config(
                "No output files given; pass -o PATH or set `output.files`".to_string(),
            ));
        }
        let outputs = files
            .into_iter()
            .map(|path| {
                let format = OutputFormat::from_path(&path)?;
                Ok(OutputTarget { path, format })
            })
            .collect::<Result<Vec<_>>>()?;

        let options = WriteOptions {
            overwrite: args.overwrite || section.overwrite.unwrap_or(false),
            combine: args.combine.or(section.combine).map(Into::into).unwrap_or_default(),
            title: args.system_name.clone().or(section.system_name),
            includes: if args.includes.is_empty() {
                section.includes
            } else {
                args.includes.clone()
            },
        };
        Ok((outputs, options))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value_str) = parser::parse_key_value(kv_pair)?;
            let float = || {
                value_str.parse::<f64>().map_err(|_| {
                    CliError::Config(format!("Invalid float value for {}: {}", key, value_str))
                })
            };

            match key {
                "radius" => self.radius = Some(float()?),
                "angle" => self.angle = Some(float()?),
                "x" => self.x = Some(float()?),
                "y" => self.y = Some(float()?),
                "seed" => {
                    self.seed = Some(value_str.parse().map_err(|_| {
                        CliError::Config(format!(
                            "Invalid integer value for {}: {}",
                            key, value_str
                        ))
                    })?);
                }
                "lattice.preset" => {
                    let preset = <LatticePreset as ValueEnum>::from_str(value_str, true).map_err(|_| {
                        CliError::Config(format!("Unknown lattice preset: {}", value_str))
                    })?;
                    self.lattice.get_or_insert_with(Default::default).preset = Some(preset);
                }
                "output.overwrite" => {
                    self.output.get_or_insert_with(Default::default).overwrite =
                        Some(value_str.parse().map_err(|_| {
                            CliError::Config(format!(
                                "Invalid boolean value for {}: {}",
                                key, value_str
                            ))
                        })?);
                }
                "output.combine" => {
                    let combine = <CombineArg as ValueEnum>::from_str(value_str, true).map_err(|_| {
                        CliError::Config(format!("Unknown combine mode: {}", value_str))
                    })?;
                    self.output.get_or_insert_with(Default::default).combine = Some(combine);
                }
                "output.system-name" => {
                    self.output.get_or_insert_with(Default::default).system_name =
                        Some(value_str.to_string());
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn with_preset(
    preset: LatticePreset,
    compound: Option<Molecule>,
) -> (Option<Lattice>, Option<Molecule>) {
    match preset {
        LatticePreset::Graphene => (None, compound),
        LatticePreset::Gold => (
            Some(Lattice::gold()),
            Some(compound.unwrap_or_else(|| Molecule::single_atom("Au", "Au"))),
        ),
    }
}
