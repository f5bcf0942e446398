mod cmd;
mod config;
mod error;

use clap::Parser;
use config::{Cli, Config, Effective};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cfg = match Config::resolve(&cli.global.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let eff = Effective::new(&cli.global, &cli.command, cfg);

    if let Err(e) = cmd::shape::run(&eff, &cli.command) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
