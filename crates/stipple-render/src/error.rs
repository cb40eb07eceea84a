use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// The splat record buffer does not fit in a single storage binding on
    /// this device. Fatal to the scene load, not to other scenes.
    #[error(
        "splat buffer of {size} bytes exceeds the device storage binding limit of {limit} bytes"
    )]
    BufferLimitExceeded { size: u64, limit: u64 },

    /// The texture-packed mobile record layout is a different backend; this
    /// crate only builds the full-quality one.
    #[error("the mobile renderer backend is not supported by this crate")]
    UnsupportedBackend,
}
