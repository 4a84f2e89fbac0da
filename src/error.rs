use thiserror::Error;

/// Why a year's table was abandoned. Neither variant stops the run.
#[derive(Error, Debug)]
pub enum YearError {
    /// The table cannot be mapped onto the year's schema.
    #[error("structural failure: {0}")]
    Structure(String),

    /// Loading or transforming the table failed.
    #[error("processing error: {0:#}")]
    Processing(#[from] anyhow::Error),
}
