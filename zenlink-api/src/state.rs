use std::sync::Arc;
use zenlink_reclaimer::ReservationReclaimer;

#[derive(Clone)]
pub struct AppState {
    pub reclaimer: Arc<ReservationReclaimer>,
}
