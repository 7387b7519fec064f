//! Polling subscriptions over backend queries.
//!
//! Each subscription is a spawned task that re-runs a query on an interval
//! and publishes on a `watch` channel only when the answer changes. The
//! channel starts out pending, and the task stops once every receiver has
//! been dropped.
//!
//! Must be called from within a tokio runtime.

use std::sync::Arc;
use std::time::Duration;

use marketplace_core::{AuthSnapshot, Loadable, SessionUser};
use serde_json::Value;
use tokio::sync::watch;

use super::{Backend, BackendError, Credentials, functions};

/// Subscribe to a query's result as a [`Loadable`].
///
/// `null` answers stay pending, empty arrays are `Empty`. Failed polls keep
/// the previous value.
pub fn subscribe_query(
    backend: Arc<dyn Backend>,
    function: impl Into<String>,
    args: Value,
    token: Option<String>,
    interval: Duration,
) -> watch::Receiver<Loadable<Value>> {
    let function = function.into();
    spawn_poller(
        backend,
        function.clone(),
        args,
        token,
        interval,
        Loadable::Pending,
        move |result| match result {
            Ok(value) => Some(Loadable::from_json(value)),
            Err(error) => {
                tracing::warn!(%function, %error, "subscription poll failed");
                None
            }
        },
    )
}

/// Subscribe to the auth state behind `token`.
///
/// Starts loading; resolves to signed in or signed out after the first
/// answer. A rejected token resolves to signed out.
pub fn watch_session(
    backend: Arc<dyn Backend>,
    token: Option<String>,
    interval: Duration,
) -> watch::Receiver<AuthSnapshot> {
    spawn_poller(
        backend,
        functions::USERS_VIEWER.to_owned(),
        Value::Object(serde_json::Map::new()),
        token,
        interval,
        AuthSnapshot::loading(),
        |result| match result {
            Ok(value) => match serde_json::from_value::<Option<SessionUser>>(value) {
                Ok(Some(user)) => Some(AuthSnapshot::signed_in(user)),
                Ok(None) => Some(AuthSnapshot::signed_out()),
                Err(error) => {
                    tracing::warn!(%error, "unreadable viewer document");
                    None
                }
            },
            Err(BackendError::Unauthenticated) => Some(AuthSnapshot::signed_out()),
            Err(error) => {
                tracing::warn!(%error, "session poll failed");
                None
            }
        },
    )
}

fn spawn_poller<T, F>(
    backend: Arc<dyn Backend>,
    function: String,
    args: Value,
    token: Option<String>,
    interval: Duration,
    initial: T,
    map: F,
) -> watch::Receiver<T>
where
    T: PartialEq + Send + Sync + 'static,
    F: Fn(Result<Value, BackendError>) -> Option<T> + Send + 'static,
{
    let (tx, rx) = watch::channel(initial);

    tokio::spawn(async move {
        loop {
            let result = backend
                .query(
                    &function,
                    args.clone(),
                    Credentials::from_token(token.as_deref()),
                )
                .await;

            if let Some(next) = map(result) {
                tx.send_if_modified(|current| {
                    if *current == next {
                        false
                    } else {
                        *current = next;
                        true
                    }
                });
            }

            tokio::select! {
                () = tx.closed() => break,
                () = tokio::time::sleep(interval) => {}
            }
        }
        tracing::debug!(%function, "subscription closed");
    });

    rx
}
