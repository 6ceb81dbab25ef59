mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use wdc_labs::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
