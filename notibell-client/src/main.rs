use clap::Parser;
use notibell_client::{Cli, run};

#[tokio::main]
async fn main() -> Result<(), notibell_client::AppError> {
    run(Cli::parse()).await
}
