// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

use crate::Action;
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

/// Maps the integer tags carried by native menu objects back to the [`Action`]s which created
/// them.
///
/// Ids are handed out from a counter which only ever increases, so an id is never reused for a
/// different action while the registry lives.  Entries are never removed individually; the whole
/// registry goes away with the controller that owns it.
#[derive(Debug)]
pub struct CallbackRegistry {
    base: u32,
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    last_id: u32,
    actions: HashMap<u32, Action>,
}

impl CallbackRegistry {
    /// The id given to items without an action.  Dispatching it does nothing.
    pub const NO_CALLBACK: u32 = 0;

    pub fn new() -> Self {
        Self::with_base(0)
    }

    /// A registry whose first id is `base + 1`.  Win32 starts above the ids reserved for
    /// system commands.
    pub fn with_base(base: u32) -> Self {
        Self {
            base,
            inner: Mutex::new(Inner {
                last_id: base,
                actions: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores `action` and returns its id, or [`NO_CALLBACK`](Self::NO_CALLBACK) when there is
    /// nothing to store.
    pub fn register(&self, action: Option<Action>) -> u32 {
        let Some(action) = action else {
            return Self::NO_CALLBACK;
        };
        let mut inner = self.lock();
        let Some(id) = inner.last_id.checked_add(1) else {
            log::error!("menu callback ids exhausted; item will not respond to clicks");
            return Self::NO_CALLBACK;
        };
        inner.last_id = id;
        inner.actions.insert(id, action);
        id
    }

    /// Runs the action registered under `id`.  The lock is released before the action runs, so
    /// actions may themselves register or dispatch.  Returns false for unknown ids.
    pub fn dispatch(&self, id: u32) -> bool {
        if id == Self::NO_CALLBACK {
            return false;
        }
        let action = self.lock().actions.get(&id).cloned();
        match action {
            Some(action) => {
                action.call();
                true
            }
            None => {
                log::trace!("ignoring activation of unknown menu id {id}");
                false
            }
        }
    }

    pub fn contains(&self, id: u32) -> bool {
        self.lock().actions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().actions.is_empty()
    }

    /// The id the first registration receives.
    pub fn first_id(&self) -> u32 {
        self.base.saturating_add(1)
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}


// End of File
