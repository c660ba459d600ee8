//! Prometheus metrics for the fetch layer and the relay server

use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

use crate::models::market::ConnectionStatus;

pub struct Metrics {
    registry: Registry,
    /// Every GET issued, direct or relayed
    pub fetch_attempts_total: IntCounter,
    /// Failed attempts labelled by error kind
    pub fetch_failures_total: IntCounterVec,
    /// Resolutions that had to fall back to the relay chain
    pub proxy_fallbacks_total: IntCounter,
    /// Resolutions that failed on every host
    pub exhausted_total: IntCounter,
    /// 0 offline, 1 proxy, 2 connected
    pub connection_status: IntGauge,
    pub relay_requests_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let fetch_attempts_total = IntCounter::with_opts(Opts::new(
            "fetch_attempts_total",
            "HTTP GET attempts issued against exchange or relay hosts",
        ))?;
        let fetch_failures_total = IntCounterVec::new(
            Opts::new("fetch_failures_total", "Failed fetch attempts by error kind"),
            &["kind"],
        )?;
        let proxy_fallbacks_total = IntCounter::with_opts(Opts::new(
            "proxy_fallbacks_total",
            "Resolutions that switched to the relay chain",
        ))?;
        let exhausted_total = IntCounter::with_opts(Opts::new(
            "fetch_exhausted_total",
            "Resolutions where every direct and relayed attempt failed",
        ))?;
        let connection_status = IntGauge::with_opts(Opts::new(
            "connection_status",
            "Current connection status (0 offline, 1 proxy, 2 connected)",
        ))?;
        let relay_requests_total = IntCounterVec::new(
            Opts::new("relay_requests_total", "Relay requests by response status"),
            &["status"],
        )?;

        registry.register(Box::new(fetch_attempts_total.clone()))?;
        registry.register(Box::new(fetch_failures_total.clone()))?;
        registry.register(Box::new(proxy_fallbacks_total.clone()))?;
        registry.register(Box::new(exhausted_total.clone()))?;
        registry.register(Box::new(connection_status.clone()))?;
        registry.register(Box::new(relay_requests_total.clone()))?;

        Ok(Self {
            registry,
            fetch_attempts_total,
            fetch_failures_total,
            proxy_fallbacks_total,
            exhausted_total,
            connection_status,
            relay_requests_total,
        })
    }

    pub fn record_failure(&self, kind: &str) {
        self.fetch_failures_total.with_label_values(&[kind]).inc();
    }

    pub fn set_status(&self, status: ConnectionStatus) {
        self.connection_status.set(status.gauge_value());
    }

    /// Text exposition format
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
