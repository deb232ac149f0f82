use clap::{Args, Parser, ValueEnum};
use std::path::PathBuf;

const ABOUT: &str =
    "A command-line tool for fitting atomic partial charges to an electrostatic potential grid.";
const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser)]
#[command(version, about = ABOUT, help_template = HELP_TEMPLATE)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Molecular geometry in XYZ format (coordinates in angstroms).
    ///
    /// The first line holds the atom count, the second a free-form comment,
    /// followed by one `element x y z` record per atom. Coordinates are
    /// converted to Bohr on read.
    #[arg(value_name = "GEOMETRY")]
    pub geometry: PathBuf,

    /// Electrostatic potential in Gaussian cube format (atomic units).
    ///
    /// The lattice origin, axes, and values are consumed as-is; the file is
    /// expected to be in Bohr and Hartree/e already.
    #[arg(value_name = "POTENTIAL")]
    pub potential: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub output: OutputOptions,

    #[command(flatten)]
    pub calculation: CalculationOptions,

    #[command(flatten)]
    pub solver: SolverArgs,
}

/// Options for controlling the output format and destination.
#[derive(Args)]
#[command(next_help_heading = "Output Options")]
pub struct OutputOptions {
    /// Output file path.
    ///
    /// If not specified, results are written to standard output.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format for the results.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    /// Number of decimal places to display for floating-point values.
    #[arg(short, long, default_value_t = 6)]
    pub precision: usize,
}

/// Options for controlling the calculation itself.
#[derive(Args)]
#[command(next_help_heading = "Calculation Options")]
pub struct CalculationOptions {
    /// Fit configuration file in TOML format.
    ///
    /// Explicit solver/symmetry flags take precedence over file values.
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Total charge of the molecular system.
    #[arg(short = 'q', long, default_value_t = 0.0)]
    pub total_charge: f64,
}

/// Options for controlling the solver and symmetry detection.
#[derive(Args)]
#[command(next_help_heading = "Solver Options")]
pub struct SolverArgs {
    /// Convergence tolerance on the constraint residual norm.
    #[arg(long, value_name = "TOL")]
    pub tolerance: Option<f64>,

    /// Tikhonov regularization strength lambda.
    #[arg(short = 'l', long = "lambda", value_name = "LAMBDA")]
    pub regularization: Option<f64>,

    /// Enable or disable symmetry-equivalence constraints.
    #[arg(short = 's', long, value_name = "BOOL")]
    pub symmetry: Option<bool>,

    /// Distance tolerance for symmetry detection, in Bohr.
    #[arg(long, value_name = "TOL")]
    pub symmetry_tolerance: Option<f64>,
}

/// Output format for the calculation results.
#[derive(Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed tables with a run summary and per-atom charges.
    Pretty,
    /// XYZ format with charges appended to each atom line.
    Xyz,
    /// Comma-separated values with columns: index, element, x, y, z, charge.
    Csv,
    /// JSON object containing the atoms array and fit metadata.
    Json,
}
