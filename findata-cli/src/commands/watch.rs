//! Watch command - live login/logout monitoring.
//!
//! Prints one line for every auth transition, whether it came from this
//! process or from another `findata` process sharing the session file.

use anyhow::Result;
use chrono::Utc;
use findata_store::AuthTransition;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::info;

use super::{connect, print_json, text};
use crate::output::SessionOutput;
use crate::{Cli, OutputFormat};

/// Runs the watch command until interrupted.
pub async fn run(cli: &Cli) -> Result<()> {
    let client = connect(cli).await?;
    let formatter = text(cli);

    let (tx, mut rx) = mpsc::unbounded_channel::<AuthTransition>();
    let subscription = client.notifier().subscribe(move |transition| {
        // Receiver gone means we are shutting down
        let _ = tx.send(transition);
    });
    info!("Watching session changes");

    if cli.format == OutputFormat::Text {
        println!("{}", formatter.format_session(&client.auth().current_session()));
        println!("Press Ctrl+C to exit");
    }

    let result = follow(&mut rx, tokio::signal::ctrl_c(), |transition| {
        // Transitions carry no data, re-read the store
        let session = client.auth().current_session();
        match cli.format {
            OutputFormat::Text => {
                println!("{}", formatter.format_transition(transition, &session, Utc::now()));
                Ok(())
            }
            OutputFormat::Json => print_json(
                &json!({
                    "source": transition.source.to_string(),
                    "at": Utc::now(),
                    "session": SessionOutput::from(&session),
                }),
                cli,
            ),
        }
    })
    .await;

    client.notifier().unsubscribe(subscription);
    result
}

/// Hands every transition to `on_transition` until `shutdown` resolves or
/// the channel closes.
///
/// `shutdown` is polled across iterations, so a signal that arrives while a
/// transition is being handled ends the loop on the next turn.
async fn follow<S, F>(
    rx: &mut mpsc::UnboundedReceiver<AuthTransition>,
    shutdown: S,
    mut on_transition: F,
) -> Result<()>
where
    S: Future,
    F: FnMut(AuthTransition) -> Result<()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => return Ok(()),
            transition = rx.recv() => match transition {
                Some(transition) => on_transition(transition)?,
                None => return Ok(()),
            },
        }
    }
}
