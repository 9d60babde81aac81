use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;


// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}


#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Dispatch metrics
    pub dispatch_requests: IntCounterVec,
    pub dispatch_outcomes: IntCounterVec,
    pub dispatch_duration: HistogramVec,

    // Auth metrics
    pub token_fetches: IntCounterVec,
    pub token_fetch_duration: Histogram,

    // Cache metrics
    pub token_cache_hits: IntCounter,
    pub token_invalidations: IntCounter,
    pub token_expiry_unix: IntGauge,

    // Log store metrics
    pub rotation_deleted: IntCounterVec,
    pub log_write_failures: IntCounter,

    // Config/runtime
    pub config_validation_errors: IntCounter,
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("indexnotifier".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Dispatch
            dispatch_requests: IntCounterVec::new(Opts::new("dispatch_requests_total", "Dispatch attempts by notification type"),&["type"],).unwrap(),
            dispatch_outcomes: IntCounterVec::new(Opts::new("dispatch_outcomes_total", "Dispatch outcomes by logged status"),&["status"],).unwrap(),
            dispatch_duration: HistogramVec::new(HistogramOpts::new("dispatch_duration_seconds", "Dispatch duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 15.0]),&["type"],).unwrap(),

            // Auth
            token_fetches: IntCounterVec::new(Opts::new("token_fetches_total", "Token endpoint exchanges by outcome"),&["outcome"],).unwrap(),
            token_fetch_duration: Histogram::with_opts(HistogramOpts::new("token_fetch_duration_seconds", "Token exchange duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0])).unwrap(),

            // Cache
            token_cache_hits: IntCounter::new("token_cache_hits_total", "Dispatches served by the cached token").unwrap(),
            token_invalidations: IntCounter::new("token_invalidations_total", "Cached token evictions after 401").unwrap(),
            token_expiry_unix: IntGauge::new("token_cache_expiry_unix_seconds", "Cache expiry of the current token, 0 when empty").unwrap(),

            // Log store
            rotation_deleted: IntCounterVec::new(Opts::new("rotation_deleted_entries_total", "Log entries removed by rotation"),&["policy"],).unwrap(),
            log_write_failures: IntCounter::new("log_write_failures_total", "Dispatch attempts whose log entry could not be written").unwrap(),

            // Config/runtime
            config_validation_errors: IntCounter::new("config_validation_errors_total","Validation errors during startup",).unwrap(),
            up: IntGauge::new("up", "1 if service is healthy").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.dispatch_requests.clone())).unwrap();
        reg.register(Box::new(metrics.dispatch_outcomes.clone())).unwrap();
        reg.register(Box::new(metrics.dispatch_duration.clone())).unwrap();
        reg.register(Box::new(metrics.token_fetches.clone())).unwrap();
        reg.register(Box::new(metrics.token_fetch_duration.clone())).unwrap();
        reg.register(Box::new(metrics.token_cache_hits.clone())).unwrap();
        reg.register(Box::new(metrics.token_invalidations.clone())).unwrap();
        reg.register(Box::new(metrics.token_expiry_unix.clone())).unwrap();
        reg.register(Box::new(metrics.rotation_deleted.clone())).unwrap();
        reg.register(Box::new(metrics.log_write_failures.clone())).unwrap();
        reg.register(Box::new(metrics.config_validation_errors.clone())).unwrap();
        reg.register(Box::new(metrics.up.clone())).unwrap();

        metrics
    }
}
