//! Heartbreak meter command-line front-end

use clap::{Parser, Subcommand};
use meter_core::{Config, Error, EventDraft, EventId, HeartbreakEvent, Meter, CEILING, SUPPORTIVE_MESSAGE};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "heartbreak-meter")]
#[command(about = "A melancholic tracker of the soul's silent aches")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON file holding the entries (overrides config and environment)
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record a heartbreak
    Add {
        /// Who broke your heart?
        person: String,
        /// How painful was it? (0-100)
        #[arg(value_parser = clap::value_parser!(i64).range(0..=100))]
        severity: i64,
        /// But why? (required unless `require_reason = false`)
        reason: Option<String>,
    },
    /// Show every entry with its id
    List,
    /// Change an entry; omitted fields keep their value
    Edit {
        id: EventId,
        #[arg(long)]
        person: Option<String>,
        #[arg(long)]
        reason: Option<String>,
        #[arg(long, value_parser = clap::value_parser!(i64).range(0..=100))]
        severity: Option<i64>,
    },
    /// Remove an entry
    Delete { id: EventId },
    /// Most intense heartbreaks
    Leaderboard {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Heartbreak summed per person
    Standings,
    /// Current heartbreak level
    Total,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    }
    .with_env_overrides()?;
    if let Some(path) = cli.data_file {
        config.data_file = path;
    }

    let mut meter = Meter::open(&config)?;
    let comforted = run(&mut meter, &config, cli.command)?;

    if !comforted && meter.ledger().is_maxed_out() {
        println!("\n💔 {}", SUPPORTIVE_MESSAGE);
    }

    Ok(())
}

/// Returns true when the supportive message has already been shown.
fn run(meter: &mut Meter, config: &Config, command: Command) -> anyhow::Result<bool> {
    match command {
        Command::Add {
            person,
            severity,
            reason,
        } => match meter.add(add_draft(person, severity, reason, config)?) {
            Ok(recorded) => {
                println!(
                    "Heartbreak recorded. Current heartbreak level: {}/{}",
                    recorded.total, CEILING
                );
                println!("id: {}", recorded.id);
            }
            Err(e) if e.is_capacity_exceeded() => {
                println!("💔 {}", SUPPORTIVE_MESSAGE);
                return Ok(true);
            }
            Err(e) => return Err(e.into()),
        },

        Command::List => {
            if meter.ledger().is_empty() {
                println!("No heartbreaks yet.");
            }
            for event in meter.ledger().iter() {
                println!("{}  {}", event.id, describe(event));
            }
        }

        Command::Edit {
            id,
            person,
            reason,
            severity,
        } => {
            let current = meter.ledger().get(id).ok_or(Error::NotFound(id))?;
            let draft = EventDraft::new(
                person.unwrap_or_else(|| current.person.clone()),
                reason.unwrap_or_else(|| current.reason.clone()),
                severity.unwrap_or_else(|| current.severity.value() as i64),
            );
            let updated = meter.update(id, draft)?;
            println!("Updated. {}", describe(&updated));
        }

        Command::Delete { id } => {
            let removed = meter.delete(id)?;
            println!("Deleted. {}", describe(&removed));
        }

        Command::Leaderboard { limit } => {
            let limit = limit.unwrap_or(config.leaderboard_limit);
            let board = meter.ledger().leaderboard(limit);
            if board.is_empty() {
                println!("No heartbreaks yet.");
            }
            for (rank, event) in board.into_iter().enumerate() {
                println!("{}. {}", rank + 1, describe(event));
            }
        }

        Command::Standings => {
            let standings = meter.ledger().standings();
            if standings.is_empty() {
                println!("No heartbreaks yet.");
            }
            for standing in standings {
                println!(
                    "{}: {} ({} {})",
                    standing.person,
                    standing.total,
                    standing.events,
                    if standing.events == 1 { "entry" } else { "entries" }
                );
            }
        }

        Command::Total => {
            println!("Total Heartbreak: {}/{}", meter.ledger().total(), CEILING);
        }
    }

    Ok(false)
}

fn add_draft(
    person: String,
    severity: i64,
    reason: Option<String>,
    config: &Config,
) -> anyhow::Result<EventDraft> {
    let reason = match reason {
        Some(reason) => reason,
        None if config.require_reason => anyhow::bail!(
            "a reason is required: heartbreak-meter add <PERSON> <SEVERITY> <REASON> \
             (or set require_reason = false)"
        ),
        None => String::new(),
    };
    Ok(EventDraft::new(person, reason, severity))
}

fn describe(event: &HeartbreakEvent) -> String {
    if event.reason.is_empty() {
        format!("{} - {}/{}", event.person, event.severity, CEILING)
    } else {
        format!(
            "{} - {}/{} ({})",
            event.person, event.severity, CEILING, event.reason
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_add(args: &[&str]) -> (String, i64, Option<String>) {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Add {
                person,
                severity,
                reason,
            } => (person, severity, reason),
            _ => panic!("expected add"),
        }
    }

    fn test_config(dir: &tempfile::TempDir) -> Config {
        Config {
            data_file: dir.path().join("heartbreak_data.json"),
            ..Config::default()
        }
    }

    #[test]
    fn test_add_with_reason_is_accepted_by_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let (person, severity, reason) =
            parse_add(&["heartbreak-meter", "add", "Alex", "40", "ghosted"]);

        let draft = add_draft(person, severity, reason, &config).unwrap();
        let mut meter = Meter::open(&config).unwrap();
        assert_eq!(meter.add(draft).unwrap().total, 40);
    }

    #[test]
    fn test_add_without_reason_follows_config() {
        let dir = tempfile::tempdir().unwrap();
        let (person, severity, reason) = parse_add(&["heartbreak-meter", "add", "Alex", "40"]);
        assert_eq!(reason, None);

        let strict = test_config(&dir);
        let err = add_draft(person.clone(), severity, reason.clone(), &strict).unwrap_err();
        assert!(err.to_string().contains("reason is required"));
        assert!(!strict.data_file.exists());

        let relaxed = Config {
            require_reason: false,
            ..test_config(&dir)
        };
        let draft = add_draft(person, severity, reason, &relaxed).unwrap();
        let mut meter = Meter::open(&relaxed).unwrap();
        assert_eq!(meter.add(draft).unwrap().total, 40);
    }

    #[test]
    fn test_severity_range_is_checked_by_parser() {
        assert!(Cli::try_parse_from(["heartbreak-meter", "add", "Alex", "101", "why"]).is_err());
        assert!(Cli::try_parse_from(["heartbreak-meter", "add", "Alex", "lots", "why"]).is_err());
    }
}
