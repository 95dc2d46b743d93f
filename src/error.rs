// Copyright (c) Kanari Contributors
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Errors surfaced by the tree substrate, the typed view layer, and the SSZ codec.
///
/// Every error is reported synchronously at the point of the offending call; there is no
/// implicit retry. Decoders must not leave a partially constructed view observable on failure.
#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum SszError {
    /// A generalized index was out of range, or navigation tried to descend into a `Leaf`
    /// without `expand`.
    #[error("navigation error: {0}")]
    Navigation(String),

    /// `get`/`set(i)` was called with `i >= length` (or, equivalently, an out-of-bounds index).
    /// Negative indices are not supported anywhere in this crate.
    #[error("index {index} out of range for length {length}")]
    IndexOutOfRange { index: u64, length: u64 },

    /// An out-of-range basic value, a wrong-width uint coercion, a non-0/1 boolean, a
    /// wrong-length byte vector, a type mismatch in a `Union`/`StableContainer` change, or
    /// uint arithmetic overflow/underflow.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// `append` was attempted on a `List`/`Bitlist` already at its limit.
    #[error("collection is at capacity, cannot append")]
    Full,

    /// `pop` was attempted on an empty `List`/`Bitlist`.
    #[error("collection is empty, cannot pop")]
    Empty,

    /// Scope bounds violation, bad offsets, a missing delimiting bit, an inactive-field index
    /// out of range, an element size outside its declared bounds, or trailing excess bytes.
    #[error("decode error: {0}")]
    Decode(String),

    /// True division on uints, arithmetic on booleans, or `set_backing` on a basic view.
    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, SszError>;

impl SszError {
    pub(crate) fn navigation(msg: impl Into<String>) -> Self {
        SszError::Navigation(msg.into())
    }

    pub(crate) fn decode(msg: impl Into<String>) -> Self {
        SszError::Decode(msg.into())
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SszError::InvalidValue(msg.into())
    }
}
