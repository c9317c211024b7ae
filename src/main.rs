//! IP Tracker - IP address metadata lookup
//!
//! Looks up location, ISP, organization and timezone details for an IP address
//! or hostname, keeps a history of lookups, and can save the last result.
//!
//! Run without a subcommand for an interactive session; every subcommand is a
//! one-command session. Session history is flushed to the history file on exit.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use iptracker::models::HistoryRecord;
use iptracker::session::USAGE_TEXT;
use iptracker::{
    Command, Config, HistoryScope, HistoryStore, LookupClient, LookupResult, Outcome,
    SavedResultStore, Session, Theme, ThemeName, TrackerError,
};
use prettytable::{row, Cell, Row, Table};
use std::io::{self, BufRead, Write};
use std::str::FromStr;

/// CLI arguments for IP Tracker.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Look up public metadata for an IP address",
    long_about = "IP Tracker queries ipinfo.io for the location, ISP, organization and \
                  timezone of an IP address or hostname. Lookups are kept in a history \
                  file (data.json) and a result can be saved to fetched_data.json.\n\n\
                  Environment: IPTRACKER_SERVICE_URL, IPTRACKER_HISTORY_FILE, \
                  IPTRACKER_RESULT_FILE, IPTRACKER_THEME"
)]
struct Cli {
    #[command(subcommand)]
    action: Option<Action>,

    /// Color theme: classic, light, matrix, ocean
    #[arg(short, long, global = true)]
    theme: Option<ThemeName>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Look up an IP address or hostname
    Lookup {
        query: String,
        /// Also save the result to the result file
        #[arg(short, long)]
        save: bool,
        /// Output format: text, table, csv, json
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,
    },
    /// Show the history file
    History {
        /// Output format: text, table, csv, json
        #[arg(short, long, default_value = "table")]
        output: OutputFormat,
    },
    /// Empty the history file
    Clear,
    /// Show the last saved result
    Saved {
        /// Output format: text, table, csv, json
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,
    },
    /// Describe this tool
    About,
    /// Start an interactive session (the default)
    Shell,
}

impl Action {
    /// The command a one-shot subcommand runs, or `None` for the interactive session.
    ///
    /// A one-shot process has no session history of its own, so `history` and
    /// `clear` work on the history file.
    fn one_shot(self) -> Option<(Command, OutputFormat)> {
        match self {
            Action::Shell => None,
            Action::Lookup { query, save, output } => Some((Command::Lookup { query, save }, output)),
            Action::History { output } => Some((Command::ShowHistory(HistoryScope::Persisted), output)),
            Action::Clear => Some((Command::ClearHistory(HistoryScope::Persisted), OutputFormat::Text)),
            Action::Saved { output } => Some((Command::ShowSaved, output)),
            Action::About => Some((Command::About, OutputFormat::Text)),
        }
    }
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq)]
enum OutputFormat {
    Text,
    Table,
    Csv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "table" => Ok(OutputFormat::Table),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {}", s)),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity.
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(if cli.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info })
        .init();

    let mut config = Config::new().context("Failed to load configuration")?;
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    log::debug!("Configuration: {:?}", config);

    let client = LookupClient::new(&config.service_url).context("Failed to create lookup client")?;
    let mut session = Session::new(
        client,
        HistoryStore::new(&config.history_file),
        SavedResultStore::new(&config.result_file),
        config.theme,
    );

    let Some((command, format)) = cli.action.and_then(Action::one_shot) else {
        let stdin = io::stdin();
        return run_interactive(&mut session, stdin.lock(), &mut io::stdout(), &mut io::stderr());
    };

    // Flush even when the command failed; a failed command records nothing.
    let outcome = session.execute(command);
    session.finish().context("Failed to write history")?;
    let outcome = outcome?;
    render(&mut io::stdout(), &outcome, format, session.theme())
}

/// Reads commands from `input` until `exit` or end of input. Errors are
/// reported on `err` and the prompt continues; the session history is
/// flushed on every way out of the loop.
fn run_interactive<R, W, E>(session: &mut Session, mut input: R, out: &mut W, err: &mut E) -> Result<()>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    // Terminal output is best effort: a closed stdout must not cost the history.
    let _ = writeln!(
        out,
        "{}\n{}\n",
        "IP Tracker".bold().green(),
        "Type 'help' for commands, 'exit' to quit".dimmed()
    );
    let mut buf = Vec::new();
    loop {
        let _ = write!(out, "{} ", "iptracker>".bold()).and_then(|_| out.flush());
        buf.clear();
        match input.read_until(b'\n', &mut buf) {
            Ok(0) => {
                let _ = writeln!(out);
                break;
            }
            Ok(_) => {}
            Err(e) => {
                notify_error(err, &format!("Failed to read input: {}", e));
                break;
            }
        }
        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(_) => {
                notify_error(err, "Input is not valid UTF-8, line ignored");
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }
        match line.parse::<Command>().and_then(|command| session.execute(command)) {
            Ok(Outcome::Exit) => break,
            Ok(outcome) => {
                let format = match outcome {
                    Outcome::History { .. } => OutputFormat::Table,
                    _ => OutputFormat::Text,
                };
                if let Err(e) = render(out, &outcome, format, session.theme()) {
                    notify_error(err, &e.to_string());
                }
            }
            Err(TrackerError::InvalidCommand(text)) => {
                notify_error(err, &format!("Unknown command: {}", text));
                let _ = writeln!(err, "{}", USAGE_TEXT.dimmed());
            }
            Err(e) => notify_error(err, &e.to_string()),
        }
    }

    match session.finish() {
        Ok(Some(total)) => log::info!("History saved ({} records)", total),
        Ok(None) => {}
        Err(e) => {
            notify_error(err, &e.to_string());
            return Err(e).context("Failed to write history");
        }
    }
    Ok(())
}

fn notify_error<E: Write>(err: &mut E, message: &str) {
    let _ = writeln!(err, "{} {}", "Error!".red().bold(), message);
}

fn render<W: Write>(out: &mut W, outcome: &Outcome, format: OutputFormat, theme: Theme) -> Result<()> {
    match outcome {
        Outcome::Fetched { result, saved } => {
            render_result(out, result, format, theme, "Information fetched")?;
            if *saved {
                writeln!(out, "{}", "Result saved.".green())?;
            }
        }
        Outcome::Saved(result) => render_result(out, result, format, theme, "Saved result")?,
        Outcome::History { scope, records } => render_history(out, *scope, records, format)?,
        Outcome::Cleared(scope) => writeln!(out, "{}", format!("Cleared {} history.", scope).yellow())?,
        Outcome::ThemeChanged(name) => writeln!(out, "{}", theme.paint(&format!("Theme set to {}.", name)))?,
        Outcome::Text(text) => writeln!(out, "{}", text)?,
        Outcome::Exit => {}
    }
    Ok(())
}

fn render_result<W: Write>(
    out: &mut W,
    result: &LookupResult,
    format: OutputFormat,
    theme: Theme,
    heading: &str,
) -> Result<()> {
    match format {
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(result)?)?,
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(&mut *out);
            wtr.write_record(["field", "value"])?;
            for (key, value) in result.rows() {
                wtr.write_record([key, value])?;
            }
            wtr.flush()?;
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.add_row(row!["Field", "Value"]);
            for (key, value) in result.rows() {
                table.add_row(Row::new(vec![Cell::new(&key), Cell::new(&value)]));
            }
            table.print(out)?;
        }
        OutputFormat::Text => {
            writeln!(out, "{}", theme.paint(heading).bold().italic())?;
            for line in result.display_text().lines() {
                writeln!(out, "{}", theme.paint(line))?;
            }
        }
    }
    Ok(())
}

fn render_history<W: Write>(
    out: &mut W,
    scope: HistoryScope,
    records: &[HistoryRecord],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(records)?)?,
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(&mut *out);
            for record in records {
                wtr.serialize(record)?;
            }
            wtr.flush()?;
        }
        _ if records.is_empty() => writeln!(out, "{}", format!("No {} history.", scope).yellow())?,
        OutputFormat::Table => {
            let mut table = Table::new();
            table.add_row(row!["#", "IP", "Time"]);
            for (i, record) in records.iter().enumerate() {
                table.add_row(Row::new(vec![
                    Cell::new(&(i + 1).to_string()),
                    Cell::new(&record.query),
                    Cell::new(&record.datetime()),
                ]));
            }
            table.print(out)?;
        }
        OutputFormat::Text => {
            for record in records {
                writeln!(out, "[#] {}   {}", record.query, record.datetime())?;
            }
        }
    }
    Ok(())
}
