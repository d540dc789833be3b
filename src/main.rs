// src/main.rs

mod config;
mod history;
mod notify;
mod session;
mod sound;
mod timer;
mod ui;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use config::Settings;
use history::SessionLog;
use notify::DialogPrompt;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;
use ui::App;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long = "config", value_name = "PATH", global = true)]
    settings_file: Option<PathBuf>,

    /// Directory for the session log
    #[arg(long, value_name = "DIR", global = true)]
    log_dir: Option<PathBuf>,

    /// Length of one countdown step in milliseconds
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    tick_millis: u64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show or edit the settings
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
    /// Print the session log for a day
    History {
        /// Day to show, as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the current settings
    Show,
    /// Set the work duration in minutes
    SetWork { minutes: u64 },
    /// Set the rest duration in minutes
    SetRest { minutes: u64 },
    /// Set the alert sound file (mp3 or wav)
    SetSound { path: PathBuf },
}

fn init_logging(dir: &Path) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    // The terminal window owns stdout and stderr while it is open.
    let file = fs::create_dir_all(dir).and_then(|_| {
        OpenOptions::new()
            .append(true)
            .create(true)
            .open(dir.join("rest-reminder.log"))
    });
    if let Ok(file) = file {
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
}

fn handle_config(action: ConfigAction, settings: &mut Settings, path: &Path) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("Settings file: {}", path.display());
            println!("Work duration: {} min", settings.timer.work_duration);
            println!("Rest duration: {} min", settings.timer.rest_duration);
            match settings.sound_file() {
                Some(sound) => println!("Sound file:    {}", sound.display()),
                None => println!("Sound file:    (none)"),
            }
            return Ok(());
        }
        ConfigAction::SetWork { minutes } => settings.set_work_minutes(minutes)?,
        ConfigAction::SetRest { minutes } => settings.set_rest_minutes(minutes)?,
        ConfigAction::SetSound { path: sound } => {
            if !sound.is_file() {
                eprintln!("Warning: {} does not exist yet", sound.display());
            }
            settings.set_sound_file(&sound);
        }
    }
    settings.save(path)?;
    println!("Settings saved to {}", path.display());
    Ok(())
}

fn print_history(log: &SessionLog, date: NaiveDate) -> Result<()> {
    let lines: Vec<String> = log
        .read(date)
        .with_context(|| format!("failed to read session log in {}", log.dir().display()))?;
    if lines.is_empty() {
        println!("No sessions finished on {}.", date);
    }
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli: Cli = Cli::parse();
    let log_dir: PathBuf = cli.log_dir.unwrap_or_else(SessionLog::default_dir);
    init_logging(&log_dir);

    let settings_path: PathBuf = cli.settings_file.unwrap_or_else(Settings::default_path);
    let mut settings: Settings = Settings::load(&settings_path);
    let log: SessionLog = SessionLog::new(log_dir);

    match cli.command {
        Some(Commands::Config { action }) => {
            handle_config(action.unwrap_or(ConfigAction::Show), &mut settings, &settings_path)
        }
        Some(Commands::History { date }) => {
            print_history(&log, date.unwrap_or_else(|| Local::now().date_naive()))
        }
        None => {
            let unit: Duration = Duration::from_millis(cli.tick_millis);
            let mut app = App::new(settings, settings_path, log, DialogPrompt, unit);
            ui::run_tui(&mut app)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_defaults() {
        let cli: Cli = Cli::try_parse_from(["rest-reminder"]).unwrap();
        assert_eq!(cli.tick_millis, 1000);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_config_set_work() {
        let cli: Cli =
            Cli::try_parse_from(["rest-reminder", "config", "set-work", "45", "--config", "x.toml"])
                .unwrap();
        assert_eq!(cli.settings_file, Some(PathBuf::from("x.toml")));
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: Some(ConfigAction::SetWork { minutes: 45 })
            })
        ));
    }

    #[test]
    fn test_parse_history_date() {
        let cli: Cli = Cli::try_parse_from(["rest-reminder", "history", "--date", "2025-03-04"]).unwrap();
        let expected: NaiveDate = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        assert!(matches!(cli.command, Some(Commands::History { date: Some(d) }) if d == expected));
        assert!(Cli::try_parse_from(["rest-reminder", "--tick-millis", "0"]).is_err());
    }

    #[test]
    fn test_handle_config_saves_edits() {
        let dir: TempDir = TempDir::new().unwrap();
        let path: PathBuf = dir.path().join("config.toml");
        let mut settings: Settings = Settings::load(&path);

        handle_config(ConfigAction::SetRest { minutes: 12 }, &mut settings, &path).unwrap();
        assert!(handle_config(ConfigAction::SetWork { minutes: 0 }, &mut settings, &path).is_err());

        let saved: Settings = Settings::load(&path);
        assert_eq!(saved.timer.rest_duration, 12);
        assert_eq!(saved.timer.work_duration, config::DEFAULT_WORK_MINUTES);
    }
}
