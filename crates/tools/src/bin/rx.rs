//! commsim RX - demodulate and decode a transmission

use anyhow::Result;
use clap::Parser;
use commsim_tools::RxConfig;

fn main() -> Result<()> {
    commsim_tools::common::init_logging(false, false);

    let config = RxConfig::parse();
    commsim_tools::rx::run(config)
}
