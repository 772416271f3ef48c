use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::Config;

pub fn run(command: ConfigCommands) -> anyhow::Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
        ConfigCommands::Path => {
            println!("{}", Config::path()?.display());
            Ok(())
        }
    }
}

fn show() -> anyhow::Result<()> {
    let config = Config::load_or_default();

    println!("{}", "Configuration".bold());
    let thresholds = config.pace_thresholds();
    println!(
        "  pacing.ahead_secs            {}",
        thresholds.ahead.as_secs()
    );
    println!(
        "  pacing.behind_secs           {}",
        thresholds.behind.as_secs()
    );
    println!(
        "  walkthrough.tick_interval_ms {}",
        config.tick_interval().as_millis()
    );
    println!(
        "  sync.session_dir             {}",
        config.session_dir()?.display()
    );
    println!();
    match Config::path() {
        Ok(path) if path.exists() => println!("From {}", path.display().to_string().dimmed()),
        Ok(path) => println!(
            "{}",
            format!("Defaults shown; no file at {}", path.display()).dimmed()
        ),
        Err(_) => {}
    }
    Ok(())
}

fn set(key: &str, value: &str) -> anyhow::Result<()> {
    let mut config = Config::load_or_default();
    config.set(key, value)?;
    let path = config.save()?;
    println!("{} {key} = {value}", "Saved".green());
    println!("{}", path.display().to_string().dimmed());
    Ok(())
}
