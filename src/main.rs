use bfc::cli::{normalize_args, run_cli, Cli};
use clap::Parser;
use std::process::exit;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse_from(normalize_args(std::env::args()));
    exit(run_cli(cli));
}
