use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackingError {
    #[error("Tracking registry is shutting down")]
    ShuttingDown,

    #[error("Collector for {0} panicked")]
    CollectorPanicked(String),
}
