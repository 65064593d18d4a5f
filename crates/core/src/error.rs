use arrival_transit::TransitError;

#[derive(Debug, thiserror::Error)]
pub enum ArrivalError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Timestamp out of range: {0} ms")]
    InvalidTimestamp(i64),

    #[error(transparent)]
    Transit(#[from] TransitError),
}

pub type Result<T> = std::result::Result<T, ArrivalError>;
