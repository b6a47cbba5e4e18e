use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info};
use zenlink_reclaimer::ReservationReclaimer;

/// Periodic driver for the reservation reclaimer. `run()` converts
/// every fault into a structured outcome, so a failed run never stops
/// the schedule; the loop always reaches the next tick.
pub async fn start_reclaim_worker(reclaimer: Arc<ReservationReclaimer>, every: Duration) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        "Reclaim worker started: ttl = {} minute(s), interval = {:?}",
        reclaimer.ttl_minutes(),
        every
    );

    loop {
        ticker.tick().await;

        let outcome = reclaimer.run().await;
        if outcome.success {
            info!(
                released = outcome.released_count.unwrap_or(0),
                "{}", outcome.message
            );
        } else {
            error!("{}", outcome.message);
        }
    }
}
