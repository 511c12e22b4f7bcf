//! Bed inventory client.
//!
//! The building service owns bed occupancy. The only call the booking state
//! machine makes against it is:
//!
//! ```text
//! PUT {BUILDING_SERVICE_URL}/api/buildings/beds/{bed_id}/occupancy
//! {"is_occupied": bool, "occupied_by": string|null, "occupied_by_name": string|null}
//! ```
//!
//! Anything other than 200 counts as failure. No retries.

use crate::errors::BookingError;
use crate::observability::metrics;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{error, instrument, warn};

/// Connect timeout for inventory requests, in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Desired occupancy for one bed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyUpdate {
    pub is_occupied: bool,
    pub occupied_by: Option<String>,
    pub occupied_by_name: Option<String>,
}

impl OccupancyUpdate {
    /// Mark a bed occupied by `user_id`.
    pub fn occupy(user_id: &str, user_name: &str) -> Self {
        Self {
            is_occupied: true,
            occupied_by: Some(user_id.to_string()),
            occupied_by_name: Some(user_name.to_string()),
        }
    }

    /// Mark a bed free, clearing the occupant.
    pub fn release() -> Self {
        Self {
            is_occupied: false,
            occupied_by: None,
            occupied_by_name: None,
        }
    }

    fn operation(&self) -> &'static str {
        if self.is_occupied {
            "occupy"
        } else {
            "release"
        }
    }
}

/// Remote store of bed occupancy.
#[async_trait::async_trait]
pub trait BedInventory: Send + Sync {
    /// Set occupancy for `bed_id`.
    ///
    /// # Errors
    ///
    /// `BookingError::InventoryUnavailable` if the inventory is unreachable or
    /// answers with anything other than 200.
    async fn update_occupancy(
        &self,
        bed_id: &str,
        update: &OccupancyUpdate,
    ) -> Result<(), BookingError>;
}

/// HTTP client for the building service occupancy endpoint.
#[derive(Clone)]
pub struct BuildingServiceClient {
    client: Client,
    base_url: Url,
}

impl BuildingServiceClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Building service base URL (e.g. "http://localhost:8002")
    /// * `timeout` - Bound on each request
    ///
    /// # Errors
    ///
    /// Returns `BookingError::Internal` if the URL is invalid or the HTTP
    /// client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BookingError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            error!(target: "booking.inventory", error = %e, "Invalid building service URL");
            BookingError::Internal(format!("invalid building service URL: {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(BookingError::Internal(
                "building service URL cannot be a base".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS).min(timeout))
            .build()
            .map_err(|e| {
                error!(target: "booking.inventory", error = %e, "Failed to build HTTP client");
                BookingError::Internal(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, base_url })
    }

    /// URL of the occupancy endpoint for `bed_id`, with the id path-escaped.
    pub fn occupancy_url(&self, bed_id: &str) -> Result<Url, BookingError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| BookingError::Internal("building service URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(["api", "buildings", "beds", bed_id, "occupancy"]);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl BedInventory for BuildingServiceClient {
    #[instrument(skip_all, name = "booking.inventory.update_occupancy", fields(bed_id = %bed_id, operation = update.operation()))]
    async fn update_occupancy(
        &self,
        bed_id: &str,
        update: &OccupancyUpdate,
    ) -> Result<(), BookingError> {
        let url = self.occupancy_url(bed_id)?;
        let start = Instant::now();

        let result = self.client.put(url).json(update).send().await;

        let outcome = match result {
            Ok(response) if response.status() == StatusCode::OK => Ok(()),
            Ok(response) => {
                let status = response.status();
                warn!(
                    target: "booking.inventory",
                    status = status.as_u16(),
                    "Building service rejected occupancy update"
                );
                Err(BookingError::InventoryUnavailable(format!(
                    "building service returned {status}"
                )))
            }
            Err(e) => {
                warn!(target: "booking.inventory", error = %e, "Building service request failed");
                Err(BookingError::InventoryUnavailable(e.to_string()))
            }
        };

        metrics::record_inventory_request(
            update.operation(),
            if outcome.is_ok() { "success" } else { "error" },
            start.elapsed(),
        );

        outcome
    }
}

/// Mock bed inventory for testing.
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Behavior {
        Accept,
        Fail,
        FailRelease,
        Delay(Duration),
    }

    /// Mock inventory that records every call.
    pub struct MockBedInventory {
        behavior: Behavior,
        /// Number of calls made.
        call_count: AtomicUsize,
        calls: Mutex<Vec<(String, OccupancyUpdate)>>,
    }

    impl MockBedInventory {
        fn with_behavior(behavior: Behavior) -> Self {
            Self {
                behavior,
                call_count: AtomicUsize::new(0),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Create a mock that accepts every update.
        pub fn accepting() -> Self {
            Self::with_behavior(Behavior::Accept)
        }

        /// Create a mock that fails every update.
        pub fn failing() -> Self {
            Self::with_behavior(Behavior::Fail)
        }

        /// Create a mock that accepts occupy but fails release.
        pub fn failing_release() -> Self {
            Self::with_behavior(Behavior::FailRelease)
        }

        /// Create a mock that sleeps for `delay` before accepting.
        pub fn delayed(delay: Duration) -> Self {
            Self::with_behavior(Behavior::Delay(delay))
        }

        /// Get the number of calls made.
        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        /// Every `(bed_id, update)` received, in order.
        pub fn calls(&self) -> Vec<(String, OccupancyUpdate)> {
            self.calls
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .clone()
        }
    }

    #[async_trait::async_trait]
    impl BedInventory for MockBedInventory {
        async fn update_occupancy(
            &self,
            bed_id: &str,
            update: &OccupancyUpdate,
        ) -> Result<(), BookingError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.calls
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push((bed_id.to_string(), update.clone()));

            match self.behavior {
                Behavior::Accept => Ok(()),
                Behavior::Fail => Err(BookingError::InventoryUnavailable(
                    "Mock inventory error".to_string(),
                )),
                Behavior::FailRelease if !update.is_occupied => Err(
                    BookingError::InventoryUnavailable("Mock release error".to_string()),
                ),
                Behavior::FailRelease => Ok(()),
                Behavior::Delay(delay) => {
                    tokio::time::sleep(delay).await;
                    Ok(())
                }
            }
        }
    }
}
