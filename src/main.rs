use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    slidegen_cli::run_cli().await
}
