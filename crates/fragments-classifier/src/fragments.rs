// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Live fragment registry
//!
//! [`FragmentsManager`] owns the set of currently loaded fragments and is the
//! single source of truth for "does this fragment still exist". Disposal is
//! announced through its event so stale indexes can clean themselves up
//! lazily instead of being validated eagerly.

use crate::event::Event;
use fragments_model::{Color, ExpressId, FragmentId};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// One loaded fragment: a renderable geometry batch
#[derive(Debug)]
pub struct Fragment {
    /// Fragment identifier
    pub id: FragmentId,
    /// Express ids of the entities batched into this fragment
    pub ids: FxHashSet<ExpressId>,
    base_color: Color,
    overrides: FxHashMap<ExpressId, Color>,
}

impl Fragment {
    pub fn new(id: FragmentId, ids: impl IntoIterator<Item = ExpressId>) -> Self {
        Self {
            id,
            ids: ids.into_iter().collect(),
            base_color: Color::WHITE,
            overrides: FxHashMap::default(),
        }
    }

    /// Tint the given items
    ///
    /// An item already tinted keeps its color unless `override_existing` is
    /// set. Ids not batched into this fragment are ignored.
    pub fn set_color(
        &mut self,
        color: Color,
        ids: impl IntoIterator<Item = ExpressId>,
        override_existing: bool,
    ) {
        for id in ids {
            if !self.ids.contains(&id) {
                continue;
            }
            if override_existing || !self.overrides.contains_key(&id) {
                self.overrides.insert(id, color);
            }
        }
    }

    /// Restore the base color of the given items
    pub fn reset_color(&mut self, ids: impl IntoIterator<Item = ExpressId>) {
        for id in ids {
            self.overrides.remove(&id);
        }
    }

    /// Current display color of one item
    pub fn color_of(&self, id: ExpressId) -> Color {
        self.overrides.get(&id).copied().unwrap_or(self.base_color)
    }
}

/// Payload of a fragment disposal notification
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentsDisposed {
    /// Identifier of the model/group the fragments belonged to
    pub group_id: String,
    /// The disposed fragments
    pub fragment_ids: Vec<FragmentId>,
}

/// Registry of currently loaded fragments
#[derive(Debug, Default)]
pub struct FragmentsManager {
    /// Live fragments keyed by identifier
    pub list: FxHashMap<FragmentId, Fragment>,
    /// Fired once per disposal, after the fragments left `list`
    pub on_fragments_disposed: Event<FragmentsDisposed>,
}

impl FragmentsManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a loaded fragment
    pub fn add(&mut self, fragment: Fragment) {
        self.list.insert(fragment.id.clone(), fragment);
    }

    /// Dispose fragments belonging to one group
    ///
    /// Removes them from the live list and notifies subscribers exactly once.
    /// Identifiers that are already gone are skipped, so repeating a disposal
    /// only re-announces it with nothing left to remove.
    pub fn dispose_group(&mut self, group_id: impl Into<String>, fragment_ids: Vec<FragmentId>) {
        for fragment_id in &fragment_ids {
            self.list.remove(fragment_id);
        }
        let payload = FragmentsDisposed {
            group_id: group_id.into(),
            fragment_ids,
        };
        self.on_fragments_disposed.trigger(&payload);
    }
}
