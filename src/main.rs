use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    chait::cli::main().await
}
