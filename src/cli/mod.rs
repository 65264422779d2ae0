pub mod daemon_path;
pub mod output;
pub mod process;
pub mod session;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use output::{render_increments, render_progress, render_settings};
use process::{restart_daemon, stop_daemon};
use session::run_session;
use tracing::{info, level_filters::LevelFilter};

use crate::{
    daemon::{create_store, start_daemon},
    intake::{confirmation::TerminalConfirmation, IntakeTracker, ResetOutcome},
    reminder::{
        notifier::{CommandNotifier, ConsoleNotifier, Notifier},
        settings::{ReminderInterval, ReminderSettings},
    },
    storage::{
        records::{load_record, save_record},
        KeyValueStore,
    },
    utils::{
        clock::{Clock, DefaultClock},
        dir::resolve_application_path,
        logging::{enable_logging, CLI_PREFIX, DAEMON_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "Hydrate", version, long_about = None)]
#[command(about = "Track water intake and get reminded to drink", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReminderSwitch {
    On,
    Off,
    Toggle,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Log a 300 ml glass of water")]
    Add,
    #[command(about = "Reset today's intake back to zero")]
    Reset {
        #[arg(short, long, help = "Don't ask for confirmation")]
        yes: bool,
    },
    #[command(about = "Show today's progress and reminder settings")]
    Status,
    #[command(about = "Turn drink reminders on or off")]
    Reminders { switch: ReminderSwitch },
    #[command(about = "Set minutes between reminders (30, 60, 90 or 120)")]
    Interval { minutes: ReminderInterval },
    #[command(about = "Open an interactive session with reminders running alongside")]
    Session,
    #[command(about = "Starts a reminder daemon for the application")]
    Init {
        #[arg(long, help = "Program used to deliver reminders, e.g. notify-send")]
        notify_command: Option<String>,
        #[arg(long, help = "Also remind at the top of every hour")]
        hourly: bool,
    },
    #[command(
        about = "Run the reminder daemon directly in current console. Used for debugging"
    )]
    Serve {
        #[arg(long, help = "Program used to deliver reminders, e.g. notify-send")]
        notify_command: Option<String>,
        #[arg(long, help = "Also remind at the top of every hour")]
        hourly: bool,
    },
    #[command(about = "Stop currently running daemon.")]
    Stop,
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();
    let dir = resolve_application_path(args.dir)?;

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    let prefix = match args.commands {
        Commands::Serve { .. } => DAEMON_PREFIX,
        _ => CLI_PREFIX,
    };
    enable_logging(prefix, &dir.join("logs"), logging_level, args.log)?;

    match args.commands {
        Commands::Add => process_add(&dir).await,
        Commands::Reset { yes } => process_reset(&dir, yes).await,
        Commands::Status => process_status(&dir).await,
        Commands::Reminders { switch } => {
            let settings = update_settings(&create_store(&dir)?, |settings| match switch {
                ReminderSwitch::On => settings.with_enabled(true),
                ReminderSwitch::Off => settings.with_enabled(false),
                ReminderSwitch::Toggle => settings.toggled(),
            })
            .await?;
            println!("{}", render_settings(&settings));
            Ok(())
        }
        Commands::Interval { minutes } => {
            let settings = update_settings(&create_store(&dir)?, |settings| {
                settings.with_interval(minutes)
            })
            .await?;
            println!("{}", render_settings(&settings));
            Ok(())
        }
        Commands::Session => run_session(&dir).await,
        Commands::Init {
            notify_command,
            hourly,
        } => {
            restart_daemon(&dir, notify_command.as_deref(), hourly)?;
            println!("Reminder daemon started");
            Ok(())
        }
        Commands::Serve {
            notify_command,
            hourly,
        } => {
            let notifier: Box<dyn Notifier> = match notify_command.as_deref() {
                Some(command) => Box::new(CommandNotifier::parse(command)?),
                None => Box::new(ConsoleNotifier::stdout()),
            };
            start_daemon(dir, notifier, hourly).await
        }
        Commands::Stop => {
            let stopped = stop_daemon()?;
            println!("Stopped {stopped} daemon(s)");
            Ok(())
        }
    }
}

async fn process_add(dir: &Path) -> Result<()> {
    let mut tracker = IntakeTracker::load(create_store(dir)?, DefaultClock::shared()).await?;
    tracker.add_water().await?;
    println!("{}", render_progress(&tracker.progress()));
    Ok(())
}

async fn process_reset(dir: &Path, yes: bool) -> Result<()> {
    let mut tracker = IntakeTracker::load(create_store(dir)?, DefaultClock::shared()).await?;
    let outcome = if yes {
        tracker.reset_daily_intake(&true).await?
    } else {
        tracker.reset_daily_intake(&TerminalConfirmation).await?
    };
    match outcome {
        ResetOutcome::Reset => println!("{}", render_progress(&tracker.progress())),
        ResetOutcome::Declined => println!("Nothing was reset"),
    }
    Ok(())
}

async fn process_status(dir: &Path) -> Result<()> {
    let store = create_store(dir)?;
    let clock = DefaultClock::shared();
    let tracker = IntakeTracker::load(store.clone(), clock.clone()).await?;
    let settings: ReminderSettings = load_record(&store, clock.time()).await?;

    println!("{}", render_progress(&tracker.progress()));
    println!("{}", render_increments(&tracker.increments()));
    println!("{}", render_settings(&settings));
    Ok(())
}

/// Rewrites the stored reminder settings. A running daemon adopts them on its next poll.
async fn update_settings(
    store: &impl KeyValueStore,
    change: impl FnOnce(ReminderSettings) -> ReminderSettings,
) -> Result<ReminderSettings> {
    let current: ReminderSettings = load_record(store, DefaultClock.time()).await?;
    let updated = change(current);
    if updated != current {
        save_record(store, &updated).await?;
        info!("Reminder settings changed from {current:?} to {updated:?}");
    }
    Ok(updated)
}
