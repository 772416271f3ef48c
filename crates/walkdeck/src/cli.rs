use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "walkdeck")]
#[command(author, version, about)]
#[command(long_about = "A timed presentation walkthrough engine.\n\n\
    Describe your deck's slides and per-slide time targets in YAML, then\n\
    drive the walkthrough from the terminal while a mirror window follows.\n\n\
    Examples:\n  \
    walkdeck demo.yaml             Present a deck (timer starts immediately)\n  \
    walkdeck watch                 Mirror a running walkthrough read-only\n  \
    walkdeck pace demo.yaml        Print the deck's expected-time schedule\n  \
    walkdeck config show           Display resolved configuration")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Deck file to present
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Session name shared between presenter and mirrors
    #[arg(long, default_value = "default")]
    pub session: String,

    /// Run standalone, without publishing state for mirrors
    #[arg(long)]
    pub no_sync: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Follow a running walkthrough read-only
    Watch {
        /// Deck file, for pacing verdicts alongside the mirrored state
        file: Option<PathBuf>,

        /// Session name to follow
        #[arg(long, default_value = "default")]
        session: String,
    },

    /// Print a deck's expected-time schedule
    Pace {
        /// Deck file to analyze
        file: PathBuf,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. pacing.behind_secs, walkthrough.tick_interval_ms)
        key: String,

        /// Value to set
        value: String,
    },

    /// Print the configuration file path
    Path,
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Commands::Watch { file, session }) => {
                crate::commands::watch::run(file, &session, self.quiet)
            }
            Some(Commands::Pace { file }) => crate::commands::pace::run(&file),
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                println!("walkdeck {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
            None => {
                if let Some(file) = self.file {
                    if !file.exists() {
                        anyhow::bail!("File not found: {}", file.display());
                    }
                    crate::commands::present::run(&file, &self.session, self.no_sync, self.quiet)
                } else {
                    use clap::CommandFactory;
                    let mut cmd = Self::command();
                    cmd.print_help()?;
                    println!();
                    Ok(())
                }
            }
        }
    }
}
