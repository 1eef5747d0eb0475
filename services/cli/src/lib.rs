mod cli;
mod demo;
mod evaluate;
mod infra;

use shift_planner::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
