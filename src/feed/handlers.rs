use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures_util::stream::{self, Stream};
use tokio::sync::broadcast::{error::RecvError, Receiver};
use tracing::{debug, info, warn};

use super::{FeedCursor, JobChange};
use crate::state::AppState;

pub fn feed_routes() -> Router<AppState> {
    Router::new().route("/jobs/stream", get(stream_jobs))
}

/// GET /jobs/stream: server-sent events, one per job change, named after its kind.
pub async fn stream_jobs(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.feed.subscribe();
    info!(subscribers = state.feed.subscriber_count(), "job feed subscriber connected");
    Sse::new(change_events(rx)).keep_alive(KeepAlive::default())
}

fn change_events(rx: Receiver<JobChange>) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold((rx, FeedCursor::default()), |(mut rx, mut cursor)| async move {
        loop {
            match rx.recv().await {
                Ok(change) if !cursor.admit(&change) => {
                    debug!(job_id = %change.job_id(), kind = change.kind(), "stale job change skipped");
                }
                Ok(change) => match Event::default().event(change.kind()).json_data(&change) {
                    Ok(event) => return Some((Ok(event), (rx, cursor))),
                    Err(e) => warn!(error = %e, "job change could not be encoded"),
                },
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "job feed subscriber lagged; events dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use time::OffsetDateTime;
    use uuid::Uuid;

    use crate::feed::JobFeed;

    #[tokio::test]
    async fn stream_yields_events_then_ends_when_feed_drops() {
        let feed = JobFeed::new(4);
        let events = change_events(feed.subscribe());
        futures_util::pin_mut!(events);

        feed.publish(JobChange::Delete {
            id: Uuid::new_v4(),
            at: OffsetDateTime::now_utc(),
        });
        assert!(events.next().await.is_some());

        drop(feed);
        assert!(events.next().await.is_none());
    }

    #[tokio::test]
    async fn stream_skips_changes_older_than_what_it_sent() {
        let feed = JobFeed::new(8);
        let events = change_events(feed.subscribe());
        futures_util::pin_mut!(events);

        let id = Uuid::new_v4();
        let at = OffsetDateTime::now_utc();
        feed.publish(JobChange::Delete { id, at });
        feed.publish(JobChange::Delete { id, at: at - time::Duration::seconds(5) });
        let later = Uuid::new_v4();
        feed.publish(JobChange::Delete { id: later, at });

        assert!(events.next().await.is_some());
        // The older delete for `id` never reaches the wire; the next event is for `later`.
        assert!(events.next().await.is_some());
        drop(feed);
        assert!(events.next().await.is_none());
    }
}
