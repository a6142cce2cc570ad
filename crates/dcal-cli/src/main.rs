//! dcal - Argyll calibration and measurement file tool
//!
//! Converts between `.cal` files and profile `vcgt` tags, recovers the
//! calibration embedded in display profiles and prepares `.ti3` subsets.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "dcal")]
#[command(author, version, about = "Argyll calibration and measurement file tool")]
#[command(long_about = "
Works with ArgyllCMS CGATS files (.cal, .ti1, .ti3) and display ICC profiles.

Examples:
  dcal extract-cal display.icc -o display.cal   # Recover calibration
  dcal extract-cal display.icc --prefer-cal     # Embedded CAL over vcgt
  dcal cal-to-vcgt display.cal -o display.icc   # Calibration-only profile
  dcal ti3-to-ti1 measured.ti3 -o target.ti1
  dcal subset measured.ti3 -o gray.ti3 --neutrals 0.5
  dcal verify measured.ti3 --fields RGB_R RGB_G RGB_B
  dcal can-update display.cal
  dcal fix-cal display.icc -o display.cal
  dcal add-options measured.ti3 --dispcal \"-qh -g2.2\"
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Recover the calibration a display profile was made with
    #[command(name = "extract-cal", visible_alias = "x")]
    ExtractCal(ExtractCalArgs),

    /// Wrap a .cal file in a profile holding only its vcgt
    #[command(name = "cal-to-vcgt")]
    CalToVcgt(CalToVcgtArgs),

    /// Turn measurements (.ti3) into a target (.ti1)
    #[command(name = "ti3-to-ti1")]
    Ti3ToTi1(Ti3ToTi1Args),

    /// Extract gray axis or primaries from measurements
    Subset(SubsetArgs),

    /// Check that a file has the required data fields
    Verify(VerifyArgs),

    /// Check whether dispcal can update a .cal file
    #[command(name = "can-update")]
    CanUpdate(CanUpdateArgs),

    /// Copy a profile's embedded CAL, adding the keywords needed to update it
    #[command(name = "fix-cal")]
    FixCal(FixCalArgs),

    /// Record dispcal/colprof arguments in a .cal or .ti3 file
    #[command(name = "add-options")]
    AddOptions(AddOptionsArgs),
}

/// Arguments for the `extract-cal` command.
#[derive(Args)]
struct ExtractCalArgs {
    /// Input profile
    input: PathBuf,

    /// Output .cal file (default: print to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Prefer the embedded CAL over the vcgt
    #[arg(long)]
    prefer_cal: bool,
}

/// Arguments for the `cal-to-vcgt` command.
#[derive(Args)]
struct CalToVcgtArgs {
    /// Input .cal file
    input: PathBuf,

    /// Output profile
    #[arg(short, long)]
    output: PathBuf,
}

/// Arguments for the `ti3-to-ti1` command.
#[derive(Args)]
struct Ti3ToTi1Args {
    /// Input .ti3 file
    input: PathBuf,

    /// Output .ti1 file
    #[arg(short, long)]
    output: PathBuf,
}

/// Arguments for the `subset` command.
#[derive(Args)]
struct SubsetArgs {
    /// Input .ti3 file
    input: PathBuf,

    /// Output .ti3 file holding the extracted rows
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Extract white, black, primaries and 50% gray instead of the gray axis
    #[arg(long)]
    primaries: bool,

    /// Also treat readings within this |a*|, |b*| of neutral as gray
    #[arg(long, value_name = "THRESHOLD")]
    neutrals: Option<f64>,
}

/// Arguments for the `verify` command.
#[derive(Args)]
struct VerifyArgs {
    /// Input CGATS file
    input: PathBuf,

    /// Required fields (default: RGB and XYZ)
    #[arg(short, long, num_args = 1..)]
    fields: Vec<String>,

    /// Fail on fields that are not in the required set
    #[arg(long)]
    strict: bool,
}

/// Arguments for the `can-update` command.
#[derive(Args)]
struct CanUpdateArgs {
    /// .cal file(s) to check
    #[arg(required = true)]
    input: Vec<PathBuf>,
}

/// Arguments for the `fix-cal` command.
#[derive(Args)]
struct FixCalArgs {
    /// Input profile
    input: PathBuf,

    /// Output .cal file (default: print to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Arguments for the `add-options` command.
#[derive(Args)]
struct AddOptionsArgs {
    /// .cal or .ti3 file, updated in place
    input: PathBuf,

    /// dispcal arguments, e.g. "-qh -g2.2"
    #[arg(long, allow_hyphen_values = true)]
    dispcal: Option<String>,

    /// colprof arguments (.ti3 only)
    #[arg(long, allow_hyphen_values = true)]
    colprof: Option<String>,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let stderr_log = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(stderr_log.with_filter(env_filter))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::ExtractCal(args) => commands::extract_cal::run(args, cli.verbose),
        Commands::CalToVcgt(args) => commands::cal_to_vcgt::run(args, cli.verbose),
        Commands::Ti3ToTi1(args) => commands::ti3_to_ti1::run(args, cli.verbose),
        Commands::Subset(args) => commands::subset::run(args, cli.verbose),
        Commands::Verify(args) => commands::verify::run(args, cli.verbose),
        Commands::CanUpdate(args) => commands::can_update::run(args, cli.verbose),
        Commands::FixCal(args) => commands::fix_cal::run(args, cli.verbose),
        Commands::AddOptions(args) => commands::add_options::run(args, cli.verbose),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::try_parse_from(["dcal", "-vv", "can-update", "a.cal"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::CanUpdate(_)));
    }

    #[test]
    fn hyphenated_option_values() {
        let cli = Cli::try_parse_from([
            "dcal",
            "add-options",
            "m.ti3",
            "--dispcal",
            "-qh -g2.2",
        ])
        .unwrap();
        let Commands::AddOptions(args) = cli.command else {
            panic!("wrong subcommand");
        };
        assert_eq!(args.dispcal.as_deref(), Some("-qh -g2.2"));
        assert!(args.colprof.is_none());
    }

    #[test]
    fn subset_flags() {
        let cli = Cli::try_parse_from(["dcal", "subset", "m.ti3", "--neutrals", "0.5"]).unwrap();
        let Commands::Subset(args) = cli.command else {
            panic!("wrong subcommand");
        };
        assert_eq!(args.neutrals, Some(0.5));
        assert!(!args.primaries);
        assert!(args.output.is_none());
    }
}
