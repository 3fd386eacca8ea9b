mod cli;
mod infra;
mod offline;
mod routes;
mod server;

use fleet_induction::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
