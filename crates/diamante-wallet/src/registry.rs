//! Local keypair registry.
//!
//! [`Registry`] is the in-memory list of known keypairs plus the selected
//! ("active") index. [`AccountRegistry`] binds it to a [`KeyValueStore`]:
//! every mutation reads or copies the whole list, changes it, writes the
//! whole list back, and only then updates memory. Two handles mutating the
//! same store are last-write-wins on the entire list.
//!
//! Selection invariant: `selected_index()` is `None` iff the list is empty,
//! and otherwise a valid index.

use crate::error::WalletError;
use crate::store::{KeyValueStore, StoreError};
use diamante_types::constants::KEYPAIRS_STORAGE_KEY;
use diamante_types::Keypair;

// =============================================================================
// Confirmation Gate
// =============================================================================

/// Text shown to the user before a destructive action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prompt {
    pub title: &'static str,
    pub message: &'static str,
}

pub const REMOVE_PROMPT: Prompt = Prompt {
    title: "Remove Account",
    message: "Are you sure you want to remove this account?",
};

/// Yes/no gate. Returning `false` takes the cancel path.
pub trait Confirm {
    fn confirm(&mut self, prompt: &Prompt) -> bool;
}

impl<F: FnMut(&Prompt) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &Prompt) -> bool {
        self(prompt)
    }
}

// =============================================================================
// In-memory Registry
// =============================================================================

/// Ordered keypairs (insertion order is display order) and the selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    keypairs: Vec<Keypair>,
    selected: Option<usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry over `keypairs` with the first one selected, as on a fresh load.
    pub fn from_keypairs(keypairs: Vec<Keypair>) -> Self {
        let selected = if keypairs.is_empty() { None } else { Some(0) };
        Self { keypairs, selected }
    }

    pub fn keypairs(&self) -> &[Keypair] {
        &self.keypairs
    }

    pub fn len(&self) -> usize {
        self.keypairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypairs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Keypair> {
        self.keypairs.get(index)
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// The active keypair, if any.
    pub fn selected(&self) -> Option<&Keypair> {
        self.selected.and_then(|i| self.keypairs.get(i))
    }

    pub fn contains_public_key(&self, public_key: &str) -> bool {
        self.keypairs.iter().any(|k| k.public_key == public_key)
    }

    /// Append and select the new keypair. Returns its index.
    pub fn push(&mut self, keypair: Keypair) -> usize {
        self.keypairs.push(keypair);
        let index = self.keypairs.len() - 1;
        self.selected = Some(index);
        index
    }

    /// Select `index` if it is in range. Out-of-range is ignored and
    /// reported as `false`.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.keypairs.len() {
            self.selected = Some(index);
            true
        } else {
            false
        }
    }

    /// Remove the keypair at `index`.
    ///
    /// Removing the selected entry selects the first remaining one (or
    /// nothing when the list becomes empty). Removing an entry before the
    /// selection shifts it down so the same keypair stays selected.
    pub fn remove(&mut self, index: usize) -> Option<Keypair> {
        if index >= self.keypairs.len() {
            return None;
        }
        let removed = self.keypairs.remove(index);
        self.selected = match self.selected {
            _ if self.keypairs.is_empty() => None,
            Some(s) if s == index => Some(0),
            Some(s) if s > index => Some(s - 1),
            other => other,
        };
        Some(removed)
    }
}

// =============================================================================
// Persistent Registry
// =============================================================================

/// Result of [`AccountRegistry::remove`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    Removed(Keypair),
    /// The user declined; nothing changed.
    Cancelled,
    /// No keypair at that index; nothing changed.
    OutOfRange,
}

/// Registry handle backed by durable storage.
///
/// Each front-end view loads its own handle; there is no shared instance.
pub struct AccountRegistry<S> {
    store: S,
    registry: Registry,
}

impl<S: KeyValueStore> AccountRegistry<S> {
    /// Load the registry from `store`.
    ///
    /// Never fails: a missing, unreadable or unparsable record yields an
    /// empty registry.
    pub fn load(store: S) -> Self {
        let registry = Registry::from_keypairs(read_or_empty(&store));
        log::debug!("loaded {} stored keypair(s)", registry.len());
        Self { store, registry }
    }

    /// Re-read storage, discarding in-memory state.
    pub fn reload(&mut self) {
        self.registry = Registry::from_keypairs(read_or_empty(&self.store));
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Append `keypair` to the stored list and select it.
    ///
    /// The stored list is re-read first, so accounts added elsewhere since
    /// this handle was loaded are kept. On a storage error nothing changes.
    pub fn add(&mut self, keypair: Keypair) -> Result<usize, WalletError> {
        let mut stored = read_keypairs(&self.store).inspect_err(|e| {
            log::error!("error storing keys: {}", e);
        })?;

        if stored.iter().any(|k| k.public_key == keypair.public_key) {
            log::warn!("public key {} is already registered", keypair.public_key);
        }
        let public_key = keypair.public_key.clone();
        stored.push(keypair);

        write_keypairs(&self.store, &stored).inspect_err(|e| {
            log::error!("error storing keys: {}", e);
        })?;

        let mut registry = Registry::from_keypairs(stored);
        let index = registry.len() - 1;
        registry.select(index);
        self.registry = registry;

        log::info!("added account #{} ({})", index + 1, public_key);
        Ok(index)
    }

    /// Select the keypair at `index`; out-of-range is ignored.
    pub fn select(&mut self, index: usize) -> bool {
        let selected = self.registry.select(index);
        if !selected {
            log::debug!(
                "ignoring selection of #{} ({} account(s))",
                index + 1,
                self.registry.len()
            );
        }
        selected
    }

    /// Remove the keypair at `index` after the user confirms.
    ///
    /// Storage is written before memory is updated; if the write fails the
    /// registry is unchanged.
    pub fn remove<C: Confirm + ?Sized>(
        &mut self,
        index: usize,
        confirm: &mut C,
    ) -> Result<Removal, WalletError> {
        if index >= self.registry.len() {
            return Ok(Removal::OutOfRange);
        }
        if !confirm.confirm(&REMOVE_PROMPT) {
            return Ok(Removal::Cancelled);
        }

        let mut next = self.registry.clone();
        let Some(removed) = next.remove(index) else {
            return Ok(Removal::OutOfRange);
        };
        write_keypairs(&self.store, next.keypairs()).inspect_err(|e| {
            log::error!("error removing account: {}", e);
        })?;
        self.registry = next;

        log::info!("removed account ({})", removed.public_key);
        Ok(Removal::Removed(removed))
    }
}

fn read_keypairs<S: KeyValueStore>(store: &S) -> Result<Vec<Keypair>, StoreError> {
    let Some(raw) = store.get(KEYPAIRS_STORAGE_KEY)? else {
        return Ok(Vec::new());
    };
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let parsed: Option<Vec<Keypair>> =
        serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
            key: KEYPAIRS_STORAGE_KEY.to_string(),
            source,
        })?;
    Ok(parsed.unwrap_or_default())
}

fn read_or_empty<S: KeyValueStore>(store: &S) -> Vec<Keypair> {
    read_keypairs(store).unwrap_or_else(|e| {
        log::warn!("error retrieving keys, treating as none: {}", e);
        Vec::new()
    })
}

fn write_keypairs<S: KeyValueStore>(store: &S, keypairs: &[Keypair]) -> Result<(), StoreError> {
    let json = serde_json::to_string(keypairs).map_err(StoreError::Encode)?;
    store.set(KEYPAIRS_STORAGE_KEY, &json)
}
