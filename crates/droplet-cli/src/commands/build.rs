use crate::cli::BuildArgs;
use crate::config::{BuildPlan, OutputFormat, OutputTarget, PartialDropletConfig};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use dropletbuilder::core::io::{
    bgf::BgfFile,
    gro::GroFile,
    top::TopFile,
    traits::{AssemblyWriter, WriteOptions},
};
use dropletbuilder::core::models::assembly::Assembly;
use dropletbuilder::engine::progress::ProgressReporter;
use dropletbuilder::workflows::droplet::{self, DropletResult};
use tracing::{debug, info, warn};

pub fn run(args: BuildArgs) -> Result<()> {
    let partial_config = match &args.config {
        Some(path) => PartialDropletConfig::from_file(path)?,
        None => PartialDropletConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let plan = partial_config.merge_with_cli(&args)?;
    debug!("Final droplet configuration: {:?}", plan.droplet);

    check_outputs(&plan)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Building droplet...");
    let result = droplet::run(&plan.droplet, &reporter)?;
    print_summary(&result);

    for target in &plan.outputs {
        info!("Writing {:?} output to {:?}", target.format, &target.path);
        write_output(&result.assembly, &plan.write_options, target)?;
        println!("✓ Wrote {}", target.path.display());
    }

    Ok(())
}

/// Fails before any work is done if an output would be clobbered.
fn check_outputs(plan: &BuildPlan) -> Result<()> {
    if plan.write_options.overwrite {
        return Ok(());
    }
    match plan.outputs.iter().find(|t| t.path.exists()) {
        Some(existing) => Err(CliError::Argument(format!(
            "Output file '{}' already exists (use --overwrite to replace it)",
            existing.path.display()
        ))),
        None => Ok(()),
    }
}

fn write_output(assembly: &Assembly, options: &WriteOptions, target: &OutputTarget) -> Result<()> {
    let path = &target.path;
    let written: std::result::Result<(), anyhow::Error> = match target.format {
        OutputFormat::Gro => GroFile::write_to_path(assembly, options, path).map_err(Into::into),
        OutputFormat::Top => TopFile::write_to_path(assembly, options, path).map_err(Into::into),
        OutputFormat::Bgf => BgfFile::write_to_path(assembly, options, path).map_err(Into::into),
    };
    written.map_err(|source| CliError::Write {
        path: path.clone(),
        source,
    })
}

fn print_summary(result: &DropletResult) {
    let carve = &result.carve;
    let box_size = result.assembly.periodicity();
    if carve.retained == 0 {
        warn!("The carved droplet is empty.");
    }
    println!(
        "Droplet: kept {} of {} fluid molecules ({} removed below z = {:.3} nm)",
        carve.retained, carve.initial, carve.removed, carve.cutoff_z
    );
    println!("Cap height: {:.3} nm", result.cap_height);
    println!(
        "Box: {:.4} x {:.4} x {:.4} nm, {} atoms",
        box_size.x,
        box_size.y,
        box_size.z,
        result.assembly.atom_count()
    );
}
