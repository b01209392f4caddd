/// Convenience result type used across talkhead.
pub type TalkheadResult<T> = Result<T, TalkheadError>;

/// Top-level error taxonomy used by the playback pipeline and its collaborators.
#[derive(thiserror::Error, Debug)]
pub enum TalkheadError {
    /// A media asset was unreadable, unsupported, or had zero duration.
    #[error("asset load error: {0}")]
    AssetLoad(String),

    /// Color correction failed for at least one frame of a job.
    #[error("pipeline error: {0}")]
    Pipeline(String),

    /// The generation service failed to produce a video.
    #[error("generation error: {0}")]
    Generation(String),

    /// Configuration or secrets could not be read.
    #[error("config error: {0}")]
    Config(String),

    /// Invalid caller-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TalkheadError {
    /// Build a [`TalkheadError::AssetLoad`] value.
    pub fn asset_load(msg: impl Into<String>) -> Self {
        Self::AssetLoad(msg.into())
    }

    /// Build a [`TalkheadError::Pipeline`] value.
    pub fn pipeline(msg: impl Into<String>) -> Self {
        Self::Pipeline(msg.into())
    }

    /// Build a [`TalkheadError::Generation`] value.
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    /// Build a [`TalkheadError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`TalkheadError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
