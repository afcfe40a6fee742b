//! ==============================================================================
//! service.rs - the ingest service instance
//! ==============================================================================
//!
//! purpose:
//!     owns the retained window and the daily log and serializes every
//!     ingest through one lock, so a reading's file append and window push
//!     happen as a single unit.
//!
//! relationships:
//!     - used by: api.rs (handlers share an Arc<IngestService>)
//!     - uses: domain.rs (parse + stamp), storage.rs (append), window.rs,
//!       stats.rs
//!
//! locking:
//!
//! ```text
//!     POST /plant_data ──► parse + stamp (no lock)
//!                             │
//!                             ▼
//!                    ┌──── write lock ────┐
//!                    │ 1. append to file  │  failure: window untouched
//!                    │ 2. push to window  │
//!                    └────────────────────┘
//!
//!     GET /latest, GET /stats ──► read lock
//! ```
//!
//! ==============================================================================

use chrono::{Local, NaiveDateTime};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::StorageConfig;
use crate::domain::Reading;
use crate::error::IngestError;
use crate::stats::WindowStats;
use crate::storage::DailyLog;
use crate::window::RetainedWindow;

struct ServiceState {
    window: RetainedWindow,
    log: DailyLog,
}

pub struct IngestService {
    state: RwLock<ServiceState>,
    show_sensor_data: bool,
}

impl IngestService {
    /// create the service, making sure the data directory exists
    pub async fn new(config: &StorageConfig) -> std::io::Result<Self> {
        let log = DailyLog::new(config);
        log.ensure_dir().await?;
        Ok(Self {
            state: RwLock::new(ServiceState {
                window: RetainedWindow::new(config.window_capacity),
                log,
            }),
            show_sensor_data: true,
        })
    }

    /// log each accepted reading at info (true) or debug (false)
    pub fn with_sensor_logging(mut self, show: bool) -> Self {
        self.show_sensor_data = show;
        self
    }

    /// accept a posted body, stamped with the current local time
    pub async fn ingest(&self, body: &[u8]) -> Result<Reading, IngestError> {
        self.ingest_at(body, Local::now().naive_local()).await
    }

    /// accept a posted body as if it arrived at `now`
    pub async fn ingest_at(&self, body: &[u8], now: NaiveDateTime) -> Result<Reading, IngestError> {
        let reading = Reading::stamp(Reading::parse(body)?, now);
        let line = reading.to_json_line()?;

        let path = {
            let mut state = self.state.write().await;
            let path = state.log.append(now.date(), &line).await?;
            state.window.push(reading.clone());
            path
        };

        if self.show_sensor_data {
            info!("saved {} at {} -> {}", reading.summary(), reading.timestamp().unwrap_or("-"), path.display());
        } else {
            debug!("saved reading -> {}", path.display());
        }
        Ok(reading)
    }

    /// most recently accepted reading
    pub async fn latest(&self) -> Option<Reading> {
        self.state.read().await.window.latest().cloned()
    }

    /// moisture aggregates over the current window
    pub async fn stats(&self) -> Option<WindowStats> {
        WindowStats::compute(&self.state.read().await.window)
    }

    pub async fn data_dir(&self) -> std::path::PathBuf {
        self.state.read().await.log.dir().to_path_buf()
    }

    /// how many readings the window keeps
    pub async fn capacity(&self) -> usize {
        self.state.read().await.window.capacity()
    }

    /// copy of the window, oldest first
    #[cfg(test)]
    pub(crate) async fn window(&self) -> Vec<Reading> {
        self.state.read().await.window.iter().cloned().collect()
    }
}
