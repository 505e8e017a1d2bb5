//! commsim TX - encode and modulate a message

use anyhow::Result;
use clap::Parser;
use commsim_tools::TxConfig;

#[tokio::main]
async fn main() -> Result<()> {
    commsim_tools::common::init_logging(false, false);

    let config = TxConfig::parse();
    commsim_tools::tx::run(config).await
}
