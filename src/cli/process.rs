use std::{env, path::Path, process::Command};

use anyhow::{anyhow, bail, Result};
use sysinfo::{get_current_pid, Pid, Process, Signal, System};
use tracing::{debug, info};

use super::daemon_path::to_daemon_path;

/// Other processes running the executable at `name`, excluding this process and its children.
fn other_instances<'a>(system: &'a System, name: &Path) -> Result<Vec<(Pid, &'a Process)>> {
    let current_id = get_current_pid().map_err(|e| anyhow!(e))?;
    Ok(system
        .processes()
        .iter()
        .filter(|(pid, _)| **pid != current_id)
        .filter(|(_, process)| !matches!(process.parent(), Some(p) if p == current_id))
        .filter(|(_, process)| {
            process
                .exe()
                .filter(|v| v.exists())
                .filter(|v| name == *v)
                .is_some()
        })
        .map(|(pid, process)| (*pid, process))
        .collect())
}

/// Terminates every other process running the executable at `name`. Returns how many were
/// stopped.
pub fn kill_previous_servers(name: &Path) -> Result<usize> {
    let system = System::new_all();
    let instances = other_instances(&system, name)?;
    for (pid, process) in &instances {
        info!("Stopping daemon {pid}");
        // SIGTERM lets the daemon cancel its pending reminder. This forcefully terminates the
        // process on Windows.
        if process.kill_with(Signal::Term).is_none() {
            process.kill();
        }
        process.wait();
    }
    Ok(instances.len())
}

/// Stops a running daemon, if any, and starts a new one for `dir`. The daemon binary detaches by
/// itself, so this only waits for the launcher half.
pub fn restart_daemon(dir: &Path, notify_command: Option<&str>, hourly: bool) -> Result<()> {
    let daemon = to_daemon_path(env::current_exe()?);
    kill_previous_servers(&daemon)?;

    let mut command = Command::new(&daemon);
    command.arg("--dir").arg(dir);
    if let Some(notify_command) = notify_command {
        command.arg("--notify-command").arg(notify_command);
    }
    if hourly {
        command.arg("--hourly");
    }

    info!("Spawning {daemon:?}");
    let status = command.status()?;
    if !status.success() {
        bail!("{daemon:?} exited with {status}");
    }
    Ok(())
}

pub fn stop_daemon() -> Result<usize> {
    kill_previous_servers(&to_daemon_path(env::current_exe()?))
}

/// Whether a reminder daemon for this installation is currently running.
pub fn daemon_running() -> Result<bool> {
    let daemon = to_daemon_path(env::current_exe()?);
    let system = System::new_all();
    let running = !other_instances(&system, &daemon)?.is_empty();
    debug!("Reminder daemon running: {running}");
    Ok(running)
}
