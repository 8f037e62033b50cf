pub type ScanrayResult<T> = Result<T, ScanrayError>;

#[derive(thiserror::Error, Debug)]
pub enum ScanrayError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("scheduling error: {0}")]
    Scheduling(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScanrayError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn scheduling(msg: impl Into<String>) -> Self {
        Self::Scheduling(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
