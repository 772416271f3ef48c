use clap::Parser;
use colored::Colorize;

mod catalog;
mod cli;
mod commands;
mod config;
mod engine;
mod sync;

fn main() {
    let cli = cli::Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = cli.run() {
        eprintln!("{} {e:#}", "error:".red().bold());
        std::process::exit(1);
    }
}
