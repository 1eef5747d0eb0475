use crate::demo::{run_demo, DemoArgs};
use crate::evaluate::{run_evaluate, run_hours, EvaluateArgs, HoursArgs};
use clap::{Parser, Subcommand};
use shift_planner::config::AppConfig;
use shift_planner::error::AppError;
use shift_planner::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "Shift Planner",
    about = "Check shift plans for labor compliance and account for worked time",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Worked hours and night classification for a single shift
    Hours(HoursArgs),
    /// Evaluate a plan snapshot file against its rules
    Evaluate(EvaluateArgs),
    /// Walk a plan from draft through a blocked and a successful approval (default command)
    Demo(DemoArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let command = cli
        .command
        .unwrap_or_else(|| Command::Demo(DemoArgs::default()));

    match command {
        Command::Hours(args) => run_hours(args, &config.engine),
        Command::Evaluate(args) => run_evaluate(args, &config.engine),
        Command::Demo(args) => run_demo(args, &config.engine),
    }
}
