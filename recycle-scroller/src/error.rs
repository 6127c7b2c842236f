use alloc::string::String;

use thiserror::Error;

/// The visible range asked for more slots than the pool may hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("rendered items limit reached: {requested} items requested, limit is {limit}")]
pub struct CapacityExceeded {
    pub requested: usize,
    pub limit: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// Per-item state was requested on a component definition without an `id_state` factory.
    #[error("missing `id_state` factory on component definition")]
    MissingStateFactory,

    #[error("invalid direction `{0}`: expected `vertical` or `horizontal`")]
    InvalidDirection(String),

    #[error("invalid debounce `{0}`: expected a non-negative number of milliseconds")]
    InvalidDebounce(String),

    #[error(transparent)]
    CapacityExceeded(#[from] CapacityExceeded),
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
