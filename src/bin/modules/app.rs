use super::cli::Cli;
use super::error::CliError;
use super::io;
use espfit::{FitConfig, fit_charges, normalize_lattice, validate};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub fn run(args: Cli) -> Result<(), CliError> {
    setup_logging(args.verbose);

    let mut config = if let Some(config_path) = &args.calculation.config {
        FitConfig::load_from_file(config_path).map_err(CliError::from)?
    } else {
        FitConfig::default()
    };
    if let Some(tolerance) = args.solver.tolerance {
        config.solver.tolerance = tolerance;
    }
    if let Some(regularization) = args.solver.regularization {
        config.solver.regularization = regularization;
    }
    if let Some(enabled) = args.solver.symmetry {
        config.symmetry.enabled = enabled;
    }
    if let Some(tolerance) = args.solver.symmetry_tolerance {
        config.symmetry.tolerance = tolerance;
    }

    let (mut molecule, comment) = io::read_xyz(&args.geometry)?;
    molecule.set_total_charge(args.calculation.total_charge);
    info!(
        atoms = molecule.num_atoms(),
        total_charge = args.calculation.total_charge,
        path = %args.geometry.display(),
        "geometry loaded"
    );

    let (lattice, cube_atom_records) = io::read_cube(&args.potential)?;
    if cube_atom_records != molecule.num_atoms() {
        warn!(
            cube_atoms = cube_atom_records,
            geometry_atoms = molecule.num_atoms(),
            "cube file and geometry disagree on atom count; filtering uses the geometry"
        );
    }

    let (grid, stats) = normalize_lattice(&lattice, &molecule)?;
    info!(
        accepted = stats.accepted,
        near_nucleus = stats.near_nucleus,
        extreme_value = stats.extreme_value,
        sign_flipped = stats.sign_flipped,
        "potential grid ingested"
    );

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message("Fitting partial charges...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let solution = fit_charges(&mut molecule, &grid, &config)?;

    pb.finish_and_clear();

    if !solution.converged {
        eprintln!("Warning: constraint residual exceeded tolerance; charges are best-effort");
    }

    let report = validate(&molecule, &grid);

    let writer = io::get_writer(&args.output.output)?;
    io::write_results(
        writer,
        &molecule,
        &solution,
        &report,
        &stats,
        &comment,
        &args.output.format,
        args.output.precision,
    )?;

    Ok(())
}

fn setup_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
