//! `slotplan` CLI: generate, rank, and conflict-filter meeting slots from JSON.
//!
//! ## Usage
//!
//! ```sh
//! # List a meeting's candidate slots (stdin → stdout)
//! echo '{"meeting":{"start_date":"2024-01-01","end_date":"2024-01-05",
//!   "time_range":{"start_time":"09:00","end_time":"12:00"},"duration":60,
//!   "event_days":"weekdays"}}' | slotplan slots
//!
//! # Rank slots by participant availability
//! slotplan rank -i rank.json --pretty
//!
//! # Drop slots that collide with calendar events, read in UTC+02:00
//! slotplan --utc-offset +02:00 filter -i filter.json
//!
//! # Resolve a chosen slot to the instants of a calendar event
//! slotplan schedule -i schedule.json
//! ```
//!
//! Logs go to stderr; set the level with `--log-level` (an `EnvFilter`
//! directive such as `debug` or `slotplan=info`).

mod request;

use std::collections::HashSet;
use std::io::{self, Read};

use anyhow::{bail, Context, Result};
use chrono::{FixedOffset, Offset, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use slot_engine::window::{parse_date, parse_time};
use slot_engine::{
    AvailabilityEntry, AvailabilityReport, BusyCalendar, BusyInterval, Slot, Submission,
};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use request::{
    FilterRequest, FilterResponse, RankRequest, RankResponse, ScheduleRequest, ScheduleResponse,
    SlotsRequest,
};

#[derive(Parser)]
#[command(
    name = "slotplan",
    version,
    about = "Generate, rank and conflict-filter meeting slots"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log filter directive written to stderr (e.g. "info", "debug")
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Fixed UTC offset that slot wall-clock times are read in ("+02:00", "UTC")
    #[arg(
        long,
        global = true,
        default_value = "+00:00",
        allow_hyphen_values = true,
        value_parser = parse_offset
    )]
    utc_offset: FixedOffset,
}

#[derive(Subcommand)]
enum Commands {
    /// List every candidate slot of a meeting
    Slots {
        #[command(flatten)]
        io: Io,
    },
    /// Rank a meeting's slots by participant availability
    Rank {
        #[command(flatten)]
        io: Io,
    },
    /// Split slots into free and conflicting against busy intervals
    Filter {
        #[command(flatten)]
        io: Io,
    },
    /// Resolve a chosen slot to absolute start and end instants
    Schedule {
        #[command(flatten)]
        io: Io,
    },
}

#[derive(Args)]
struct Io {
    /// Input JSON file (reads from stdin if omitted)
    #[arg(short, long)]
    input: Option<String>,
    /// Output file (writes to stdout if omitted)
    #[arg(short, long)]
    output: Option<String>,
    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn parse_offset(s: &str) -> std::result::Result<FixedOffset, String> {
    match s.trim() {
        "UTC" | "utc" | "Z" | "z" => Ok(Utc.fix()),
        other => other
            .parse::<FixedOffset>()
            .map_err(|e| format!("invalid UTC offset '{}': {}", other, e)),
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Slots { io } => run_slots(&io),
        Commands::Rank { io } => run_rank(&io),
        Commands::Filter { io } => run_filter(&io, cli.utc_offset),
        Commands::Schedule { io } => run_schedule(&io, cli.utc_offset),
    }
}

fn run_slots(io: &Io) -> Result<()> {
    let request: SlotsRequest = read_request(io)?;
    let plan = request
        .meeting
        .to_plan()
        .context("Invalid meeting parameters")?;

    let slots: Vec<Slot> = plan.slots().collect();
    info!(count = slots.len(), "generated candidate slots");
    write_json(io, &slots)
}

fn run_rank(io: &Io) -> Result<()> {
    let request: RankRequest = read_request(io)?;
    let plan = request
        .meeting
        .to_plan()
        .context("Invalid meeting parameters")?;

    let submissions = request
        .submissions
        .iter()
        .map(|s| {
            s.to_submission()
                .with_context(|| format!("Invalid submission from {}", s.participant))
        })
        .collect::<Result<Vec<Submission>>>()?;

    let universe: Vec<Slot> = plan.slots().collect();
    log_unmatched_entries(&universe, &submissions);

    let report = AvailabilityReport::build(&universe, &plan.window, &submissions);
    info!(
        slots = report.ranked.len(),
        respondents = report.respondents,
        top = report.top().len(),
        "ranked candidate slots"
    );
    write_json(io, &RankResponse::from(&report))
}

/// Entries naming slots outside the meeting are ignored by ranking; surface
/// them so a stale client is noticed.
fn log_unmatched_entries(universe: &[Slot], submissions: &[Submission]) {
    let known: HashSet<&Slot> = universe.iter().collect();
    for submission in submissions {
        let unmatched = submission
            .entries
            .iter()
            .filter(|entry| match entry {
                AvailabilityEntry::Slot(slot) => !known.contains(slot),
                AvailabilityEntry::Day(_) => false,
            })
            .count();
        if unmatched > 0 {
            debug!(
                participant = %submission.participant.id,
                unmatched,
                "entries name slots outside the meeting"
            );
        }
    }
}

fn run_filter(io: &Io, offset: FixedOffset) -> Result<()> {
    let request: FilterRequest = read_request(io)?;

    let slots: Vec<Slot> = match (&request.slots, &request.meeting) {
        (Some(keys), _) => keys
            .iter()
            .map(|key| {
                key.parse::<Slot>()
                    .with_context(|| format!("Invalid slot key: {}", key))
            })
            .collect::<Result<_>>()?,
        (None, Some(meeting)) => meeting
            .to_plan()
            .context("Invalid meeting parameters")?
            .slots()
            .collect(),
        (None, None) => bail!("Filter input needs either \"slots\" or \"meeting\""),
    };

    let busy = request
        .busy
        .iter()
        .map(|b| {
            b.to_interval(offset)
                .with_context(|| format!("Invalid busy interval: {} .. {}", b.start, b.end))
        })
        .collect::<Result<Vec<BusyInterval>>>()?;

    let calendar = BusyCalendar::with_offset(&busy, offset);
    let (free, conflicting) = calendar.partition(&slots);
    let conflicts = calendar.find_conflicts(&conflicting);
    info!(
        slots = slots.len(),
        busy = busy.len(),
        free = free.len(),
        conflicting = conflicting.len(),
        "filtered slots against busy intervals"
    );
    if free.is_empty() && !slots.is_empty() {
        warn!("every candidate slot conflicts with a busy interval");
    }

    write_json(
        io,
        &FilterResponse {
            free,
            conflicting,
            conflicts,
        },
    )
}

fn run_schedule(io: &Io, offset: FixedOffset) -> Result<()> {
    let request: ScheduleRequest = read_request(io)?;
    let plan = request
        .meeting
        .to_plan()
        .context("Invalid meeting parameters")?;

    let date = parse_date(&request.date).context("Invalid date")?;
    let start = parse_time(&request.start_time).context("Invalid start time")?;
    let slot = Slot::starting_at(date, start, plan.duration)
        .context("Meeting does not fit within the day")?;

    let response = ScheduleResponse::new(slot, &plan, offset);
    if !response.in_plan {
        warn!(slot = %slot, "scheduled slot is not one of the meeting's candidates");
    }
    write_json(io, &response)
}

fn read_request<T: serde::de::DeserializeOwned>(io: &Io) -> Result<T> {
    let raw = read_input(io.input.as_deref())?;
    serde_json::from_str(&raw).context("Failed to parse request JSON")
}

fn write_json<T: Serialize>(io: &Io, value: &T) -> Result<()> {
    let mut json = if io.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    json.push('\n');
    write_output(io.output.as_deref(), &json)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
