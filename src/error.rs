use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("{field} must be a finite number, got {raw:?}")]
    NotFinite { field: &'static str, raw: String },

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("no pending map location; click on the map first")]
    NoPendingLocation,

    #[error(transparent)]
    Storage(anyhow::Error),
}

impl TrackerError {
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::NotFinite { .. } | Self::NotPositive { .. })
    }
}

pub type Result<T, E = TrackerError> = std::result::Result<T, E>;
