use anyhow::Result;
use etesti_client::utils::logging::{init_logging, log_startup};
use etesti_client::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_logging(&config);
    log_startup(&config);

    App::initialize(config).await?.run().await
}
