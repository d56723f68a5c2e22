use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "termin-bot",
    about = "Scheduling-poll bot with a local console gateway"
)]
pub struct Args {
    /// Path to the TOML config file.
    #[arg(short, long, default_value = "termin.toml")]
    pub config: PathBuf,

    /// Override the data directory from the config file.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}
