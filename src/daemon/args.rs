use std::path::PathBuf;

use clap::Parser;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
pub struct DaemonArgs {
    /// Stay attached to the current console instead of detaching.
    #[arg(long)]
    pub force: bool,
    #[arg(long)]
    pub dir: Option<PathBuf>,
    /// This option is for debugging purposes only.
    #[arg(long = "log-console")]
    pub log_console: bool,
    #[arg(long = "log-filter")]
    pub log: Option<LevelFilter>,
    /// Program used to deliver reminders, e.g. "notify-send". Title and body are passed as the
    /// last two arguments. Reminders are printed to stdout when omitted.
    #[arg(long = "notify-command")]
    pub notify_command: Option<String>,
    /// Also remind at the top of every hour.
    #[arg(long)]
    pub hourly: bool,
}
