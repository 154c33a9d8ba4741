use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "device-vigil", version, about = "Device access decisions from a rules file")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "device-vigil.yaml")]
    pub config: PathBuf,

    /// Path to the rules file, relative to the current directory
    /// (overrides config file setting)
    #[arg(short, long)]
    pub rules: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate a single access request and print the decision as JSON
    Check {
        hardware_id: String,
        device_id: String,
        instance_id: String,
        process_id: u32,
    },
    /// Load the rules file and report how many rules it declares
    Validate,
    /// Answer JSON-lines access requests from stdin until EOF
    Serve,
}
