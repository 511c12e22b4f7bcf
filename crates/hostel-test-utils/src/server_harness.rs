//! Test server harnesses for E2E testing.
//!
//! Each harness builds the service's real router from a `Config` assembled
//! with `from_vars`, binds `127.0.0.1:0` and serves in a background task that
//! is aborted on drop.

use crate::tokens::TEST_JWT_SECRET;
use axum::Router;
use booking_service::repositories::PgBookingRepository;
use booking_service::services::bed_inventory::BedInventory;
use booking_service::services::{BookingService, BuildingServiceClient};
use metrics_exporter_prometheus::PrometheusBuilder;
use sqlx::PgPool;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Inventory timeout used by booking test servers, in seconds.
pub const TEST_INVENTORY_TIMEOUT_SECONDS: u64 = 2;

fn vars(extra: &[(&str, &str)]) -> HashMap<String, String> {
    let mut vars = HashMap::from([
        (
            "DATABASE_URL".to_string(),
            "postgresql://test/test".to_string(),
        ),
        ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
        ("JWT_SECRET".to_string(), TEST_JWT_SECRET.to_string()),
    ]);
    for (key, value) in extra {
        vars.insert((*key).to_string(), (*value).to_string());
    }
    vars
}

/// A running router.
struct Served {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

async fn serve(app: Router) -> Result<Served, anyhow::Error> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

    let addr = listener
        .local_addr()
        .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("Test server error: {}", e);
        }
    });

    Ok(Served { addr, handle })
}

/// Test harness for the auth service.
///
/// # Example
/// ```rust,ignore
/// #[sqlx::test(migrations = "../../migrations/auth")]
/// async fn test_signup(pool: PgPool) -> Result<()> {
///     let server = TestAuthServer::spawn(pool).await?;
///     let response = reqwest::Client::new()
///         .post(format!("{}/api/auth/signup", server.url()))
///         .json(&json!({"email": "a@b.c", "password": "secret1", "name": "A"}))
///         .send()
///         .await?;
///     assert_eq!(response.status(), 201);
///     Ok(())
/// }
/// ```
pub struct TestAuthServer {
    addr: SocketAddr,
    pool: PgPool,
    _handle: JoinHandle<()>,
}

impl TestAuthServer {
    /// Spawn with the minimum bcrypt cost to keep tests fast.
    pub async fn spawn(pool: PgPool) -> Result<Self, anyhow::Error> {
        Self::spawn_with(pool, &[]).await
    }

    /// Spawn with extra environment variables (e.g. `JWT_EXPIRY`).
    pub async fn spawn_with(pool: PgPool, extra: &[(&str, &str)]) -> Result<Self, anyhow::Error> {
        let mut all = vec![("BCRYPT_COST", "10")];
        all.extend_from_slice(extra);

        let config = auth_service::config::Config::from_vars(&vars(&all))
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let state = Arc::new(auth_service::routes::AppState::new(pool.clone(), config));
        let served = serve(auth_service::routes::build_routes(state)).await?;

        Ok(Self {
            addr: served.addr,
            pool,
            _handle: served.handle,
        })
    }

    /// Get reference to the database pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestAuthServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}

/// Test harness for the building service.
///
/// The sample inventory is seeded before the server starts.
pub struct TestBuildingServer {
    addr: SocketAddr,
    pool: PgPool,
    _handle: JoinHandle<()>,
}

impl TestBuildingServer {
    pub async fn spawn(pool: PgPool) -> Result<Self, anyhow::Error> {
        let config = building_service::config::Config::from_vars(&vars(&[]))
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        building_service::services::seed::seed_if_empty(&pool)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to seed inventory: {}", e))?;

        let state = Arc::new(building_service::routes::AppState {
            pool: pool.clone(),
            config,
        });
        let served = serve(building_service::routes::build_routes(state)).await?;

        Ok(Self {
            addr: served.addr,
            pool,
            _handle: served.handle,
        })
    }

    /// Get reference to the database pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestBuildingServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}

/// Test harness for the booking service.
pub struct TestBookingServer {
    addr: SocketAddr,
    pool: PgPool,
    _handle: JoinHandle<()>,
}

impl TestBookingServer {
    /// Spawn against a building service (real or stubbed) at `building_service_url`.
    pub async fn spawn(pool: PgPool, building_service_url: &str) -> Result<Self, anyhow::Error> {
        let timeout = TEST_INVENTORY_TIMEOUT_SECONDS.to_string();
        let config = booking_service::config::Config::from_vars(&vars(&[
            ("BUILDING_SERVICE_URL", building_service_url),
            ("INVENTORY_TIMEOUT_SECONDS", timeout.as_str()),
        ]))
        .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let inventory =
            BuildingServiceClient::new(&config.building_service_url, config.inventory_timeout)
                .map_err(|e| anyhow::anyhow!("Failed to create inventory client: {}", e))?;

        Self::spawn_with_inventory(pool, config, Arc::new(inventory)).await
    }

    /// Spawn with a caller-supplied inventory (e.g. `MockBedInventory`).
    pub async fn spawn_with_inventory(
        pool: PgPool,
        config: booking_service::config::Config,
        inventory: Arc<dyn BedInventory>,
    ) -> Result<Self, anyhow::Error> {
        let bookings = BookingService::new(
            Arc::new(PgBookingRepository::new(pool.clone())),
            inventory,
            config.inventory_timeout,
        );
        let state = Arc::new(booking_service::routes::AppState { config, bookings });

        // Not installed globally; parallel tests would race on the recorder
        let metrics_handle = PrometheusBuilder::new().build_recorder().handle();

        let served = serve(booking_service::routes::build_routes(state, metrics_handle)).await?;

        Ok(Self {
            addr: served.addr,
            pool,
            _handle: served.handle,
        })
    }

    /// Config matching what `spawn` uses, for `spawn_with_inventory`.
    pub fn test_config() -> Result<booking_service::config::Config, anyhow::Error> {
        let timeout = TEST_INVENTORY_TIMEOUT_SECONDS.to_string();
        booking_service::config::Config::from_vars(&vars(&[(
            "INVENTORY_TIMEOUT_SECONDS",
            timeout.as_str(),
        )]))
        .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))
    }

    /// Get reference to the database pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestBookingServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}
