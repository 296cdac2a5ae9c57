// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for classification operations

use crate::{ExpressId, FragmentId, GeometryKey};
use thiserror::Error;

/// Result type alias for classification operations
pub type Result<T> = std::result::Result<T, ClassifierError>;

/// Errors that can occur during classification
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// Spatial classification requested before the model's relations were
    /// indexed. A caller-contract violation, not a recoverable condition.
    #[error("model {model} has no indexed relations; index relations before spatial classification")]
    RelationsNotIndexed { model: String },

    /// A geometry key resolved to no loaded fragment where that is fatal
    /// (predefined-type classification; everywhere else it is a silent skip)
    #[error("fragment for geometry key {key} not found in model {model}")]
    FragmentNotFound { key: GeometryKey, model: String },

    /// The query engine's match-count bookkeeping broke its own invariant.
    /// Indicates a bug, never a user input problem.
    #[error("malformed match count for {id} in fragment {fragment}")]
    MalformedFilterState { fragment: FragmentId, id: ExpressId },
}

impl ClassifierError {
    /// Create a relations-not-indexed error naming the model
    pub fn relations_not_indexed(model: impl Into<String>) -> Self {
        ClassifierError::RelationsNotIndexed {
            model: model.into(),
        }
    }

    /// Create a fragment-not-found error
    pub fn fragment_not_found(key: GeometryKey, model: impl Into<String>) -> Self {
        ClassifierError::FragmentNotFound {
            key,
            model: model.into(),
        }
    }
}
