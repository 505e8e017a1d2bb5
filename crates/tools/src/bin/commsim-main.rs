//! commsim - two-layer communication stack simulator
//!
//! Entry point for transmitting, receiving and serving the receiver

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use commsim_core::schemes::{
    CarrierScheme, CorrectionScheme, DetectionScheme, FramingScheme, LineCode,
};
use commsim_tools::transport::{Server, DEFAULT_ADDR};
use commsim_tools::{RxConfig, TxConfig};

/// commsim communication stack tool
#[derive(Parser)]
#[command(name = "commsim")]
#[command(about = "Link and physical layer simulator")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode and modulate a message
    Tx(TxConfig),
    /// Demodulate and decode a saved transmission
    Rx(RxConfig),
    /// Run the receiver over TCP
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = DEFAULT_ADDR)]
        listen: String,
    },
    /// Show supported schemes
    Info,
}

fn print_schemes(title: &str, names: impl Iterator<Item = (&'static str, &'static str)>) {
    println!("\n=== {} ===", title);
    for (display, short) in names {
        println!("  • {:<14} ({})", display, short);
    }
}

/// Show supported schemes
fn show_info() {
    println!("\n=== commsim ===");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));

    print_schemes("Framing", FramingScheme::ALL.iter().map(|s| (s.display_name(), s.name())));
    print_schemes("Error detection", DetectionScheme::ALL.iter().map(|s| (s.display_name(), s.name())));
    print_schemes("Error correction", CorrectionScheme::ALL.iter().map(|s| (s.display_name(), s.name())));
    print_schemes("Line codes", LineCode::ALL.iter().map(|s| (s.display_name(), s.name())));
    print_schemes("Carriers", CarrierScheme::ALL.iter().map(|s| (s.display_name(), s.name())));

    println!("\n=== Example Usage ===");
    println!("  Transmit: commsim tx -t \"Hi\" --detection crc --carrier 8-qam -o hi.json");
    println!("  Receive:  commsim rx -i hi.json");
    println!("  Serve:    commsim serve --listen {}", DEFAULT_ADDR);
    println!("  Send:     commsim tx -t \"Hi\" --send {}", DEFAULT_ADDR);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    commsim_tools::common::init_logging(cli.verbose, cli.debug);

    info!("commsim starting");

    match cli.command {
        Commands::Tx(config) => commsim_tools::tx::run(config).await?,
        Commands::Rx(config) => commsim_tools::rx::run(config)?,
        Commands::Serve { listen } => {
            let server = Server::bind(&listen)
                .await
                .with_context(|| format!("Failed to bind {}", listen))?;
            println!("Receiver listening on {}", server.local_addr()?);
            server.run().await?;
        }
        Commands::Info => show_info(),
    }

    Ok(())
}
