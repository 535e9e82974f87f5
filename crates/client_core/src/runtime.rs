//! Runs capability calls off the controller and routes their outcomes back.

use std::future::Future;

use tokio::sync::mpsc::UnboundedSender;

/// Spawns `work` and always delivers exactly one outcome, even if the work
/// panics or its task is cancelled.
pub(crate) fn spawn_capability<T, O, F, M>(
    outcomes: &UnboundedSender<O>,
    label: &'static str,
    work: F,
    into_outcome: M,
) where
    T: Send + 'static,
    O: Send + 'static,
    F: Future<Output = anyhow::Result<T>> + Send + 'static,
    M: FnOnce(Result<T, String>) -> O + Send + 'static,
{
    let outcomes = outcomes.clone();
    tokio::spawn(async move {
        let result = match tokio::spawn(work).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(format!("{err:#}")),
            Err(err) => Err(format!("{label} task aborted: {err}")),
        };
        if outcomes.send(into_outcome(result)).is_err() {
            tracing::debug!(capability = label, "controller dropped before outcome arrived");
        }
    });
}
