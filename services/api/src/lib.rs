mod cli;
mod infra;
mod routes;
mod server;

use crop_advisor::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
