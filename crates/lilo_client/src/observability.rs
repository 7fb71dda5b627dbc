//! Request counters, reported through the `metrics` facade.
//!
//! Without an installed recorder every call here is a no-op.

pub const REQUESTS_TOTAL: &str = "lilo_client_requests_total";
pub const RETRIES_TOTAL: &str = "lilo_client_retries_total";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Status(u16),
    Transport,
}

impl Outcome {
    pub fn label(&self) -> String {
        match self {
            Outcome::Ok => "ok".to_string(),
            Outcome::Status(code) => format!("status_{code}"),
            Outcome::Transport => "transport_error".to_string(),
        }
    }
}

pub fn record_request(endpoint: &'static str, outcome: Outcome) {
    metrics::counter!(REQUESTS_TOTAL, "endpoint" => endpoint, "outcome" => outcome.label())
        .increment(1);
}

pub fn record_retry() {
    metrics::counter!(RETRIES_TOTAL).increment(1);
}
