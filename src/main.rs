// Rust Planner
// Command line driver for the scheduling core

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Duration, Local, NaiveTime, Utc};
use clap::{Parser, Subcommand};

use rust_planner::models::settings::Settings;
use rust_planner::services::availability::{next_free_window_at, next_free_window_for};
use rust_planner::services::database::Database;
use rust_planner::services::icalendar::ICalendarService;
use rust_planner::services::quick_entry::parse_rich_entry_at;
use rust_planner::services::settings::SettingsService;
use rust_planner::services::store::Store;
use rust_planner::utils::clock::SystemClock;
use rust_planner::utils::date::at_local_time;

#[derive(Parser, Debug)]
#[command(name = "rust-planner")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Use this settings file instead of the platform default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Quick-add a task, e.g. `add "write draft tomorrow 9am for 45m #work"`
    Add {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Quick-add an event; the text must name a time
    Event {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Show the next free window in today's working hours
    Free {
        /// Only consider gaps at least this long
        #[arg(long)]
        minutes: Option<u32>,
    },
    /// List today's events
    Agenda,
    /// Start or stop the timer on a task
    Timer { task_id: String },
    /// Import events from an .ics file
    Import { file: PathBuf },
    /// Export all events to an .ics file
    Export { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let settings_service = match cli.config {
        Some(path) => SettingsService::new(path),
        None => SettingsService::from_project_dirs()?,
    };
    let settings = settings_service.load_or_default();

    let db_path = SettingsService::resolve_database_path(&settings)?;
    let db = Database::open(&db_path)?;
    db.initialize_schema()?;
    let mut store = db.load_store(SystemClock)?;

    log::info!("Running {:?} against {:?}", cli.command, db_path);
    let changed = run(cli.command, &settings, &mut store).await?;

    if changed {
        db.save_store(&store)?;
    }
    Ok(())
}

/// Run one command. Returns whether the store needs saving.
async fn run(command: Command, settings: &Settings, store: &mut Store) -> Result<bool> {
    let now = Local::now();

    match command {
        Command::Add { text } => {
            let entry = parse_rich_entry_at(&text.join(" "), settings.grid_step_minutes, &now);
            let task = store.create_task_from_entry(&entry);
            println!("Added task {} \"{}\"", task.id, task.title);
            if let Some(scheduled) = task.scheduled {
                println!("  scheduled {}", scheduled.with_timezone(&Local).format("%a %d %b %H:%M"));
            }
            Ok(true)
        }
        Command::Event { text } => {
            let entry = parse_rich_entry_at(&text.join(" "), settings.grid_step_minutes, &now);
            match store.create_event_from_entry(&entry) {
                Some(event) => {
                    println!(
                        "Added event {} \"{}\" {} - {}",
                        event.id,
                        event.title,
                        event.start.with_timezone(&Local).format("%a %d %b %H:%M"),
                        event.end.with_timezone(&Local).format("%H:%M"),
                    );
                    Ok(true)
                }
                None => {
                    println!("No time found in \"{}\"; nothing added", entry.clean_title);
                    Ok(false)
                }
            }
        }
        Command::Free { minutes } => {
            let today = now.date_naive();
            let day_start = at_local_time(&Local, today, NaiveTime::MIN).with_timezone(&Utc);
            let busy = store.busy_intervals(day_start, day_start + Duration::days(1));
            let window = match minutes {
                Some(minutes) => next_free_window_for(
                    &busy,
                    minutes,
                    settings.grid_step_minutes,
                    settings.day_start_hour,
                    settings.day_end_hour,
                    &now,
                ),
                None => next_free_window_at(
                    &busy,
                    settings.grid_step_minutes,
                    settings.day_start_hour,
                    settings.day_end_hour,
                    &now,
                ),
            };
            match window {
                Some(window) => println!(
                    "Free {} - {} ({} min)",
                    window.start.with_timezone(&Local).format("%H:%M"),
                    window.end.with_timezone(&Local).format("%H:%M"),
                    window.duration_minutes()
                ),
                None => println!("No free time left today"),
            }
            Ok(false)
        }
        Command::Agenda => {
            let events = store.events_on_day(now.date_naive(), &Local);
            if events.is_empty() {
                println!("Nothing scheduled today");
            }
            for event in events {
                if event.all_day {
                    println!("  all day      {}", event.title);
                } else {
                    println!(
                        "  {} - {}  {}",
                        event.start.with_timezone(&Local).format("%H:%M"),
                        event.end.with_timezone(&Local).format("%H:%M"),
                        event.title
                    );
                }
            }
            if let Some(task) = store.active_timer() {
                println!(
                    "Timer running on \"{}\" ({} min)",
                    task.title,
                    task.live_spent_minutes(store.now())
                );
            }
            Ok(false)
        }
        Command::Timer { task_id } => {
            let task = store
                .toggle_timer(&task_id)
                .context(format!("No task with id {}", task_id))?;
            if task.is_timer_running() {
                println!("Timer started on \"{}\"", task.title);
            } else {
                println!("Timer stopped on \"{}\" ({} min total)", task.title, task.spent_min);
            }
            Ok(true)
        }
        Command::Import { file } => {
            let service = ICalendarService::new(settings.calendar_name.clone());
            let events = service.import_from_file_async(&file).await?;
            let touched = store.import_events(events);
            println!("Imported {} event(s)", touched);
            Ok(touched > 0)
        }
        Command::Export { file } => {
            let service = ICalendarService::new(settings.calendar_name.clone());
            service.export_to_file(store.events(), &file)?;
            println!("Exported {} event(s) to {}", store.events().len(), file.display());
            Ok(false)
        }
    }
}
