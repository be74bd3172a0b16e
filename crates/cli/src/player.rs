//! External player collaborator.
//!
//! Watches catalog snapshots and reacts only when the render target's URL
//! changes: it announces the new target and, when a player command is
//! configured, replaces the running player process with one pointed at the
//! new playlist. Playback itself (pause, seek, ...) belongs to the player.

use std::process::Stdio;

use catalog::{CatalogSnapshot, RenderTarget};
use tokio::process::{Child, Command};
use tokio::sync::watch;

pub async fn drive(mut updates: watch::Receiver<CatalogSnapshot>, player: Option<String>) {
    let mut current: Option<String> = None;
    let mut child: Option<Child> = None;

    loop {
        let target = updates.borrow_and_update().render_target.clone();
        let url = target.url().map(str::to_string);

        if url != current {
            if let Some(mut old) = child.take() {
                let _ = old.kill().await;
            }
            announce(&target);
            if let (Some(url), Some(cmd)) = (&url, &player) {
                child = spawn(cmd, url);
            }
            current = url;
        }

        if updates.changed().await.is_err() {
            break;
        }
    }

    if let Some(mut old) = child {
        let _ = old.kill().await;
    }
}

fn announce(target: &RenderTarget) {
    match target {
        RenderTarget::Empty => println!("select or add a stream below"),
        RenderTarget::Playing { url } => println!("now playing {url}"),
    }
}

fn spawn(cmd: &str, url: &str) -> Option<Child> {
    let mut parts = cmd.split_whitespace();
    let program = parts.next()?;

    match Command::new(program)
        .args(parts)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
    {
        Ok(child) => {
            tracing::debug!(program, url, pid = ?child.id(), "player started");
            Some(child)
        }
        Err(e) => {
            tracing::warn!(program, error = %e, "could not start player");
            None
        }
    }
}
