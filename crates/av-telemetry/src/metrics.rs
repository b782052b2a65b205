//! Prometheus text export.
//!
//! Subsystem crates register their collectors in the default registry
//! (behind their `metrics` feature); this module renders whatever is there.

use prometheus::{Encoder, TextEncoder};

use crate::TelemetryError;

/// Encode all registered metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::{register_int_counter, IntCounter};

    #[test]
    fn test_encode_includes_registered_counter() {
        let counter: IntCounter =
            register_int_counter!("av_telemetry_test_total", "Test counter").unwrap();
        counter.inc();
        let text = encode_metrics().unwrap();
        assert!(text.contains("av_telemetry_test_total 1"));
    }
}
