// Application state shared by the HTTP, WebSocket, and background tasks.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::time::Instant;

use crate::config::Config;
use crate::constants::FRAME_CHANNEL_CAPACITY;
use crate::store::StandingsStore;

#[derive(Clone)]
pub struct AppState {
    pub tx: broadcast::Sender<String>,
    pub sequence: Arc<AtomicU64>,
    pub start_instant: Instant,
    pub store: Arc<StandingsStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let (tx, _) = broadcast::channel::<String>(FRAME_CHANNEL_CAPACITY);
        Self {
            tx,
            sequence: Arc::new(AtomicU64::new(0)),
            start_instant: Instant::now(),
            store: Arc::new(StandingsStore::new()),
            config: Arc::new(config),
        }
    }
}
