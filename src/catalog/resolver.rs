//! Attribute resolution
//!
//! Drives the category-specific question sequence: given the attributes the
//! user has picked so far, decide which dimension to ask about next, or,
//! once the selection is complete, build the lookup key for the one
//! sellable item it denotes. Pure functions over the policy table; all
//! database access stays in `storage`.

use crate::catalog::policy::{CategoryKind, Dimension};

/// The attributes a user has picked so far for one model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub color_id: Option<i64>,
    pub memory_id: Option<i64>,
    pub screen_size_id: Option<i64>,
    pub connectivity_id: Option<i64>,
    pub ram_id: Option<i64>,
}

impl Selection {
    pub fn get(&self, dim: Dimension) -> Option<i64> {
        match dim {
            Dimension::Color => self.color_id,
            Dimension::Memory => self.memory_id,
            Dimension::ScreenSize => self.screen_size_id,
            Dimension::Connectivity => self.connectivity_id,
            Dimension::Ram => self.ram_id,
        }
    }

    pub fn set(&mut self, dim: Dimension, id: i64) {
        match dim {
            Dimension::Color => self.color_id = Some(id),
            Dimension::Memory => self.memory_id = Some(id),
            Dimension::ScreenSize => self.screen_size_id = Some(id),
            Dimension::Connectivity => self.connectivity_id = Some(id),
            Dimension::Ram => self.ram_id = Some(id),
        }
    }

    /// Drops a chosen dimension (used by «Назад» navigation).
    pub fn clear(&mut self, dim: Dimension) {
        match dim {
            Dimension::Color => self.color_id = None,
            Dimension::Memory => self.memory_id = None,
            Dimension::ScreenSize => self.screen_size_id = None,
            Dimension::Connectivity => self.connectivity_id = None,
            Dimension::Ram => self.ram_id = None,
        }
    }
}

/// Complete lookup key for a terminal item.
///
/// Dimensions outside the category's policy stay `None` and must be NULL
/// on the matching item row, so one query shape serves every category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemKey {
    pub model_id: i64,
    pub color_id: i64,
    pub memory_id: Option<i64>,
    pub screen_size_id: Option<i64>,
    pub connectivity_id: Option<i64>,
    pub ram_id: Option<i64>,
}

/// What the navigation should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveStep {
    /// Ask the user to pick a value for this dimension
    Ask(Dimension),
    /// Selection is complete; look the item up
    Lookup(ItemKey),
}

/// Decides the next navigation step for a model of the given category kind.
///
/// Walks the declared dimension sequence and asks for the first dimension
/// the user has not picked yet. When the sequence is exhausted the
/// selection is complete and a lookup key is produced. Branching is purely
/// on the category policy, never on which optional fields happen to be
/// populated.
pub fn next_step(kind: CategoryKind, model_id: i64, selection: &Selection) -> ResolveStep {
    for &dim in kind.dimensions() {
        if selection.get(dim).is_none() {
            return ResolveStep::Ask(dim);
        }
    }

    let relevant = |dim: Dimension| {
        if kind.dimensions().contains(&dim) {
            selection.get(dim)
        } else {
            None
        }
    };

    ResolveStep::Lookup(ItemKey {
        model_id,
        // Color is first in every sequence, so it is present here
        color_id: selection.color_id.unwrap_or_default(),
        memory_id: relevant(Dimension::Memory),
        screen_size_id: relevant(Dimension::ScreenSize),
        connectivity_id: relevant(Dimension::Connectivity),
        ram_id: relevant(Dimension::Ram),
    })
}

/// The dimension asked right before `current` in this category's sequence.
///
/// `None` means `current` is the first question, so «Назад» should return
/// to model selection instead.
pub fn previous_dimension(kind: CategoryKind, current: Dimension) -> Option<Dimension> {
    let dims = kind.dimensions();
    let pos = dims.iter().position(|&d| d == current)?;
    if pos == 0 {
        None
    } else {
        Some(dims[pos - 1])
    }
}
