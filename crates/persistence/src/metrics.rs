//! Database metrics: per-query latency and pool gauges.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::{Duration, Instant};
use tracing::warn;

/// Queries slower than this are logged by name.
const SLOW_QUERY: Duration = Duration::from_millis(500);

/// Record database query duration.
pub fn record_query_duration(query_name: &'static str, duration_secs: f64) {
    histogram!("database_query_duration_seconds", "query" => query_name).record(duration_secs);
}

/// Refresh the connection pool gauges. Called from the readiness probe.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("database_connections_active").set(active as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Times one repository query.
///
/// ```ignore
/// let timer = QueryTimer::new("find_guest_vote");
/// let result = sqlx::query_as::<_, DessertVoteEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// result
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration, warning when the query was slow.
    pub fn record(self) {
        let elapsed = self.start.elapsed();
        if elapsed >= SLOW_QUERY {
            warn!(
                query = self.query_name,
                elapsed_ms = elapsed.as_millis() as u64,
                "Slow database query"
            );
        }
        record_query_duration(self.query_name, elapsed.as_secs_f64());
    }
}
