//! Explicit wiring for the single campaign session.
//!
//! A [`CampaignProvider`] owns the session. Views receive a [`ViewContext`]
//! and ask it for the [`CampaignHandle`]; no global state is involved.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::Lead;

use super::CampaignStore;

/// Usage faults raised when the campaign is accessed without a provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CampaignContextError {
    /// The view was built outside a [`CampaignProvider`].
    #[error("campaign accessed outside of a campaign provider")]
    MissingProvider,
}

/// Cloneable reference to the shared campaign store.
#[derive(Debug, Clone, Default)]
pub struct CampaignHandle(Arc<Mutex<CampaignStore>>);

impl CampaignHandle {
    /// Start a campaign; see [`CampaignStore::start`].
    pub fn start(
        &self,
        id: impl Into<String>,
        name: impl Into<String>,
        kind: impl Into<String>,
        leads: Vec<Lead>,
    ) {
        self.lock().start(id, name, kind, leads);
    }

    /// Exit the campaign; see [`CampaignStore::exit`].
    pub fn exit(&self) {
        self.lock().exit();
    }

    /// Advance; see [`CampaignStore::next`].
    pub fn next(&self) {
        self.lock().next();
    }

    /// Step back; see [`CampaignStore::previous`].
    pub fn previous(&self) {
        self.lock().previous();
    }

    /// Clone of the current lead.
    pub fn current(&self) -> Option<Lead> {
        self.lock().current().cloned()
    }

    /// Read the store without cloning it.
    pub fn read<T>(&self, f: impl FnOnce(&CampaignStore) -> T) -> T {
        f(&self.lock())
    }

    /// Point-in-time copy of the store.
    pub fn snapshot(&self) -> CampaignStore {
        self.lock().clone()
    }

    // Handlers run to completion, so a poisoned lock still holds a consistent store.
    fn lock(&self) -> MutexGuard<'_, CampaignStore> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Owner of the process's campaign session.
#[derive(Debug, Clone, Default)]
pub struct CampaignProvider {
    handle: CampaignHandle,
}

impl CampaignProvider {
    /// Provider holding an inactive session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the provided session.
    pub fn handle(&self) -> CampaignHandle {
        self.handle.clone()
    }

    /// Context for a view rendered under this provider.
    pub fn view_context(&self) -> ViewContext {
        ViewContext {
            campaign: Some(self.handle()),
        }
    }
}

/// Dependencies handed to a view.
#[derive(Debug, Clone, Default)]
pub struct ViewContext {
    campaign: Option<CampaignHandle>,
}

impl ViewContext {
    /// Context for a view rendered outside any provider.
    pub fn detached() -> Self {
        Self::default()
    }

    /// Campaign handle supplied by the enclosing provider.
    ///
    /// # Errors
    ///
    /// Returns [`CampaignContextError::MissingProvider`] when the view was not
    /// built by a [`CampaignProvider`].
    pub fn campaign(&self) -> Result<&CampaignHandle, CampaignContextError> {
        self.campaign
            .as_ref()
            .ok_or(CampaignContextError::MissingProvider)
    }
}
