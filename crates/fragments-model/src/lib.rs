// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fragments Model - Shared types and traits for fragment classification
//!
//! This crate provides the data model consumed by the classification engine.
//! A loaded BIM model is represented as a [`FragmentsGroup`]: a set of
//! semantic entities (keyed by [`ExpressId`]) whose geometry lives in opaque
//! fragment batches (keyed by [`FragmentId`]). Property access goes through
//! the [`PropertySource`] trait so that different loader backends (in-memory,
//! remote, WASM-hosted) can plug in without the engine knowing.
//!
//! # Architecture
//!
//! - [`ExpressId`], [`FragmentId`], [`GeometryKey`] - identifier newtypes
//! - [`IfcCategory`] - the category-code to name table
//! - [`RelationName`] / [`IfcRelation`] - IFC relationship vocabulary
//! - [`PropertySource`] / [`FragmentsGroup`] - the loaded-model contract
//! - [`ClassifierError`] - error type shared across the workspace

pub mod category;
pub mod error;
pub mod group;
pub mod relations;
pub mod types;

// Re-export all public types
pub use category::*;
pub use error::*;
pub use group::*;
pub use relations::*;
pub use types::*;
