use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "gas_tracker",
    version,
    about = "Total gas spent by an address, in native units and fiat"
)]
pub struct Cli {
    /// Address to analyse (0x + 40 hex digits)
    pub address: String,

    /// Configuration file (defaults to gas_tracker.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Also write per-transaction costs to this CSV file
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Print the result as single-line JSON
    #[arg(long, default_value_t = false)]
    pub compact: bool,
}
