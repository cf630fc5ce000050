use std::path::PathBuf;

use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Config file (default: ~/.config/thinkchat/config.toml)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
    /// Listen address, overriding the config file
    #[arg(long, short = 'b')]
    pub bind: Option<String>,
    /// Log level or filter spec, overriding the config file
    #[arg(long)]
    pub log_level: Option<String>,
    /// Write a default config file if none exists, then exit
    #[arg(long)]
    pub init_config: bool,
}
