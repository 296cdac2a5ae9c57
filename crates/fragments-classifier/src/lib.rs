// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fragments Classifier - multi-criteria indexing over loaded fragment models
//!
//! The [`Classifier`] groups scene fragments into named, nested
//! classification systems (by model, by predefined type, by entity category,
//! by arbitrary IFC relationship, by spatial containment) and answers
//! multi-condition intersection queries over those groups.
//!
//! It consumes two collaborators:
//!
//! - [`FragmentsManager`] - the live set of loaded fragments, which notifies
//!   subscribers when fragments are disposed
//! - [`RelationsIndexer`] - precomputed per-entity relation maps per model
//!
//! # Example
//!
//! ```ignore
//! use fragments_classifier::{Classifier, FragmentsManager};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let fragments = Rc::new(RefCell::new(FragmentsManager::new()));
//! let mut classifier = Classifier::new(Rc::clone(&fragments));
//!
//! classifier.by_model(&group.id.clone(), &group);
//! classifier.by_entity(&group);
//!
//! let mut filter = std::collections::HashMap::new();
//! filter.insert("entities".to_string(), vec!["IFCWALL".to_string()]);
//! let walls = classifier.find(Some(&filter))?;
//! ```

pub mod classifier;
pub mod event;
pub mod fragments;
pub mod index;
pub mod relations;

pub use classifier::*;
pub use event::*;
pub use fragments::*;
pub use index::*;
pub use relations::*;
