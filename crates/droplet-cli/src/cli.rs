use clap::{Args, Parser, Subcommand, ValueEnum};
use dropletbuilder::core::io::traits::CombineMode;
use serde::Deserialize;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu, William A. Goddard III, Victor Wai Tak Kam",
    version,
    about = "DropletBuilder CLI - Build molecular-dynamics starting configurations of a liquid droplet resting on a crystalline substrate.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a droplet on a substrate and write it to one or more output files.
    Build(BuildArgs),
    /// Print the spherical-cap height for a radius and contact angle.
    Height(HeightArgs),
}

/// Substrates that can be selected by name.
#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LatticePreset {
    /// Three stacked graphene sheets.
    Graphene,
    /// An FCC gold slab.
    Gold,
}

#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CombineArg {
    /// One entry per component (substrate, fluid).
    All,
    /// One entry per molecule.
    Residues,
}

impl From<CombineArg> for CombineMode {
    fn from(arg: CombineArg) -> Self {
        match arg {
            CombineArg::All => CombineMode::All,
            CombineArg::Residues => CombineMode::Residues,
        }
    }
}

/// Arguments for the `build` subcommand.
#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    // --- Inputs ---
    /// Path to a droplet configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output file; the format follows the extension (.gro, .top, .bgf).
    /// Can be used multiple times.
    #[arg(short, long = "output", value_name = "PATH")]
    pub outputs: Vec<PathBuf>,

    // --- Droplet geometry ---
    /// Droplet radius in nm.
    #[arg(short, long, value_name = "NM")]
    pub radius: Option<f64>,

    /// Contact angle in degrees, in (0, 180].
    #[arg(short, long, value_name = "DEGREES")]
    pub angle: Option<f64>,

    /// Lateral box length along x in nm (defaults to 4 x radius).
    #[arg(short = 'x', value_name = "NM")]
    pub x: Option<f64>,

    /// Lateral box length along y in nm (defaults to 4 x radius).
    #[arg(short = 'y', value_name = "NM")]
    pub y: Option<f64>,

    // --- Fluid ---
    /// Fluid template: 'water', 'hexane', 'alkane:N' or a .bgf/.gro file.
    /// Can be used multiple times; replaces the fluids of the config file.
    #[arg(short, long = "fluid", value_name = "TEMPLATE")]
    pub fluids: Vec<String>,

    /// Density in kg/m^3, paired with the --fluid at the same position.
    #[arg(short, long = "density", value_name = "KG_M3", conflicts_with = "counts")]
    pub densities: Vec<f64>,

    /// Molecule count, paired with the --fluid at the same position.
    #[arg(short = 'n', long = "count", value_name = "INT")]
    pub counts: Vec<usize>,

    // --- Substrate ---
    /// Use a built-in substrate.
    #[arg(short, long, value_enum, conflicts_with = "lattice_file")]
    pub lattice: Option<LatticePreset>,

    /// Read a custom cubic lattice from a TOML file.
    #[arg(long, value_name = "PATH")]
    pub lattice_file: Option<PathBuf>,

    /// Compound placed on the lattice sites, as NAME or NAME:ELEMENT.
    #[arg(long, value_name = "NAME[:ELEMENT]")]
    pub lattice_compound: Option<String>,

    /// Seed for the random sphere filler.
    #[arg(short, long, value_name = "INT")]
    pub seed: Option<u64>,

    // --- Output options ---
    /// Replace output files that already exist.
    #[arg(long)]
    pub overwrite: bool,

    /// How molecules are grouped into output entries.
    #[arg(long, value_enum)]
    pub combine: Option<CombineArg>,

    /// Title written to the output files.
    #[arg(long, value_name = "NAME")]
    pub system_name: Option<String>,

    /// Force-field file to #include from the topology. Can be used multiple times.
    #[arg(long = "include", value_name = "FILE")]
    pub includes: Vec<String>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S output.combine=residues
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `height` subcommand.
#[derive(Args, Debug)]
pub struct HeightArgs {
    /// Droplet radius in nm.
    #[arg(short, long, value_name = "NM")]
    pub radius: Option<f64>,

    /// Contact angle in degrees, in (0, 180].
    #[arg(short, long, value_name = "DEGREES")]
    pub angle: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn repeated_fluid_flags_keep_their_order() {
        let cli = Cli::parse_from([
            "droplet", "build", "-f", "water", "-d", "997", "-f", "hexane", "-d", "655", "-o",
            "a.gro", "-o", "a.top",
        ]);
        let Commands::Build(args) = cli.command else {
            panic!("expected the build subcommand");
        };
        assert_eq!(args.fluids, vec!["water", "hexane"]);
        assert_eq!(args.densities, vec![997.0, 655.0]);
        assert_eq!(
            args.outputs,
            vec![PathBuf::from("a.gro"), PathBuf::from("a.top")]
        );
    }

    #[test]
    fn density_and_count_flags_conflict() {
        let result = Cli::try_parse_from([
            "droplet", "build", "-f", "water", "-d", "997", "-n", "100",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn lattice_preset_parses_by_name() {
        let cli = Cli::parse_from(["droplet", "build", "--lattice", "gold", "--combine", "residues"]);
        let Commands::Build(args) = cli.command else {
            panic!("expected the build subcommand");
        };
        assert_eq!(args.lattice, Some(LatticePreset::Gold));
        assert_eq!(args.combine, Some(CombineArg::Residues));
    }

    #[test]
    fn global_flags_apply_after_the_subcommand() {
        let cli = Cli::parse_from(["droplet", "height", "-r", "2", "-a", "60", "-vv"]);
        assert_eq!(cli.verbose, 2);
        let Commands::Height(args) = cli.command else {
            panic!("expected the height subcommand");
        };
        assert_eq!((args.radius, args.angle), (Some(2.0), Some(60.0)));
    }
}
