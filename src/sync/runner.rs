use std::future::Future;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};

use super::{Forest, NeuronSource, NotificationSink, SyncEngine, SyncError};
use crate::graph::{extract, GraphSink};
use crate::models::RenderDirection;

/// Parameters of a watch session.
#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub avatar_url: String,
    pub direction: RenderDirection,
    /// Poll period; the settings default is 2000ms.
    pub interval: Duration,
}

/// Reload, then poll on a fixed interval until `shutdown` resolves.
///
/// Cycles run strictly serially: a tick that fires while the previous cycle is
/// still awaiting its fetch is delayed, never overlapped. Poll fetch errors are
/// reported and the next tick retries unconditionally; only the initial reload
/// failure aborts the watch. The graph is re-extracted and displayed after the
/// reload and after every appending poll, and `on_change` runs alongside so the
/// caller can re-render its tree view.
pub async fn run_watch<S, N, G, F, D>(
    engine: &mut SyncEngine,
    source: &S,
    notifications: &N,
    sink: &mut G,
    mut on_change: F,
    options: &WatchOptions,
    shutdown: D,
) -> Result<(), SyncError>
where
    S: NeuronSource,
    N: NotificationSink,
    G: GraphSink,
    F: FnMut(&Forest),
    D: Future<Output = ()>,
{
    engine
        .reload(source, &options.avatar_url, options.direction)
        .await?;
    notifications.report_success("Tree reload successful.");
    on_change(engine.forest());
    sink.display_graph(&extract(engine.forest()));

    let mut interval = time::interval(options.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick completes immediately; consume it so the first poll
    // happens one full period after the reload
    interval.tick().await;

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::debug!("watch loop stopped");
                break;
            }
            _ = interval.tick() => {
                match engine.poll(source, &options.avatar_url).await {
                    Ok(outcome) if outcome.appended > 0 => {
                        if outcome.first_new {
                            notifications.alert();
                        }
                        notifications.report_success(&format!(
                            "{} new neuron(s), {} since reload.",
                            outcome.appended,
                            engine.new_items()
                        ));
                        on_change(engine.forest());
                        sink.display_graph(&extract(engine.forest()));
                    }
                    Ok(_) => {}
                    Err(err) => {
                        // non-fatal: the next tick retries unconditionally
                        notifications.report_error(&err.to_string());
                    }
                }
            }
        }
    }
    Ok(())
}
