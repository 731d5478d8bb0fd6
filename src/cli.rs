//! The command line interface for the appraisal tool.
use crate::id::IDCollection;
use crate::input::load_model;
use crate::log;
use crate::lp::{LpBuilder, OpeningStock};
use crate::output::{create_output_directory, get_output_dir};
use crate::settings::Settings;
use crate::solver::HighsSolver;
use ::log::{info, warn};
use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// The command line interface for the appraisal tool.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Options for the run command
#[derive(Args, Default)]
pub struct RunOpts {
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
    /// Whether to keep the LP file for each (investment, scenario) pair
    #[arg(long)]
    pub debug_model: bool,
    /// Treat opening stock as supplied externally, overriding the model file
    #[arg(long)]
    pub initial_stock: bool,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Appraise the investments of a model.
    Run {
        /// Path to the model directory.
        model_dir: PathBuf,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Validate a model.
    Validate {
        /// The path to the model directory.
        model_dir: PathBuf,
    },
    /// Print the linear program for one investment under one scenario.
    Lp {
        /// The path to the model directory.
        model_dir: PathBuf,
        /// The ID of the investment.
        investment_id: String,
        /// The ID of the demand scenario.
        scenario_id: String,
        /// Treat opening stock as supplied externally, overriding the model file
        #[arg(long)]
        initial_stock: bool,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run { model_dir, opts } => handle_run_command(&model_dir, &opts, None),
            Self::Validate { model_dir } => handle_validate_command(&model_dir, None),
            Self::Lp {
                model_dir,
                investment_id,
                scenario_id,
                initial_stock,
            } => {
                let lp =
                    handle_lp_command(&model_dir, &investment_id, &scenario_id, initial_stock)?;
                print!("{lp}");
                Ok(())
            }
        }
    }
}

/// Parse CLI arguments and start the program
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ invest-appraisal --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        // Output program help
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Get the treatment of opening stock, allowing the model's setting to be overridden
fn get_opening_stock(model_setting: OpeningStock, initial_stock: bool) -> OpeningStock {
    if initial_stock {
        OpeningStock::Fixed
    } else {
        model_setting
    }
}

/// Handle the `run` command.
pub fn handle_run_command(
    model_path: &Path,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    // Load program settings, if not provided
    let mut settings = if let Some(settings) = settings {
        settings
    } else {
        Settings::load().context("Failed to load settings.")?
    };

    // These settings can be overridden by command-line arguments
    if opts.debug_model {
        settings.debug_model = true;
    }
    if opts.overwrite {
        settings.overwrite = true;
    }

    // Get path to output folder
    let pathbuf: PathBuf;
    let output_path = if let Some(p) = opts.output_dir.as_deref() {
        p
    } else {
        pathbuf = get_output_dir(model_path)?;
        &pathbuf
    };

    let overwrite =
        create_output_directory(output_path, settings.overwrite).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                output_path.display()
            )
        })?;

    // Initialise program logger
    log::init(settings.log_level.as_deref(), Some(output_path))
        .context("Failed to initialise logging.")?;

    // Load the model to appraise
    let model = load_model(model_path).context("Failed to load model.")?;
    info!("Loaded model from {}", model_path.display());
    info!("Output folder: {}", output_path.display());

    // NB: We have to wait until the logger is initialised to display this warning
    if overwrite {
        warn!("Output folder will be overwritten");
    }

    let opening_stock = get_opening_stock(model.parameters.opening_stock(), opts.initial_stock);
    // Only show the solver's own output when debugging
    let mut solver = HighsSolver::new(::log::log_enabled!(::log::Level::Debug));
    crate::appraisal::run(
        &model,
        &mut solver,
        opening_stock,
        output_path,
        settings.debug_model,
    )?;
    info!("Appraisal complete!");

    Ok(())
}

/// Handle the `validate` command.
pub fn handle_validate_command(model_path: &Path, settings: Option<Settings>) -> Result<()> {
    // Load program settings, if not provided
    let settings = if let Some(settings) = settings {
        settings
    } else {
        Settings::load().context("Failed to load settings.")?
    };

    // Initialise program logger (we won't save log files when running the validate command)
    log::init(settings.log_level.as_deref(), None).context("Failed to initialise logging.")?;

    // Load/validate the model
    load_model(model_path).context("Failed to validate model.")?;
    info!("Model validation successful!");

    Ok(())
}

/// Handle the `lp` command.
///
/// # Returns
///
/// The text of the linear program for the given investment and scenario.
pub fn handle_lp_command(
    model_path: &Path,
    investment_id: &str,
    scenario_id: &str,
    initial_stock: bool,
) -> Result<String> {
    let model = load_model(model_path).context("Failed to load model.")?;
    let investment = model
        .investments
        .get_index_by_str(investment_id)
        .context("Invalid investment")?;
    let scenario = model
        .scenarios
        .get_index_by_str(scenario_id)
        .context("Invalid scenario")?;

    let opening_stock = get_opening_stock(model.parameters.opening_stock(), initial_stock);
    Ok(LpBuilder::new(&model, opening_stock).build(investment, scenario))
}
