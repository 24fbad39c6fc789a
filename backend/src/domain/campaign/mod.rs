//! Calling-campaign traversal.
//!
//! A [`CampaignStore`] holds at most one campaign session and walks an ordered
//! lead list. Navigation clamps at both ends: stepping past the last lead or
//! before the first is silently absorbed, never wrapped.
//!
//! ```
//! use leadline::domain::{CampaignStore, Lead};
//!
//! let mut store = CampaignStore::default();
//! store.start("c1", "Spring Promo", "cold-call", vec![Lead::new(1), Lead::new(2)]);
//! store.next();
//! store.next();
//! assert_eq!(store.current().map(|lead| lead.id.get()), Some(2));
//! ```

mod context;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::Lead;

pub use context::{CampaignContextError, CampaignHandle, CampaignProvider, ViewContext};

/// Identity of a running campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignInfo {
    /// Campaign identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Campaign type tag, for example `cold-call`.
    pub kind: String,
}

/// Payload carried while a campaign is active.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveCampaign {
    info: CampaignInfo,
    leads: Vec<Lead>,
    position: usize,
}

impl ActiveCampaign {
    /// Campaign identity.
    pub fn info(&self) -> &CampaignInfo {
        &self.info
    }

    /// Leads in traversal order.
    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }

    /// Zero-based traversal position.
    pub fn position(&self) -> usize {
        self.position
    }

    fn last_index(&self) -> usize {
        self.leads.len().saturating_sub(1)
    }
}

/// Macro-state of the traversal.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CampaignState {
    /// No campaign is running.
    #[default]
    Inactive,
    /// A campaign is running.
    Active(ActiveCampaign),
}

/// One-based progress indicator, for example "3 of 10".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// One-based index of the current lead.
    pub current: usize,
    /// Number of leads in the campaign.
    pub total: usize,
}

/// Single-session campaign traversal store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CampaignStore {
    state: CampaignState,
}

impl CampaignStore {
    /// Start a campaign, replacing any previous session wholesale.
    ///
    /// The position always resets to the first lead.
    pub fn start(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        kind: impl Into<String>,
        leads: Vec<Lead>,
    ) {
        let info = CampaignInfo {
            id: id.into(),
            name: name.into(),
            kind: kind.into(),
        };
        debug!(campaign = %info.id, leads = leads.len(), "campaign started");
        self.state = CampaignState::Active(ActiveCampaign {
            info,
            leads,
            position: 0,
        });
    }

    /// Discard the session, its leads, and its position.
    pub fn exit(&mut self) {
        if let CampaignState::Active(active) = &self.state {
            debug!(campaign = %active.info.id, position = active.position, "campaign exited");
        }
        self.state = CampaignState::Inactive;
    }

    /// Advance one lead, staying on the last lead at the end.
    pub fn next(&mut self) {
        if let CampaignState::Active(active) = &mut self.state {
            active.position = active.position.saturating_add(1).min(active.last_index());
        }
    }

    /// Step back one lead, staying on the first lead at the start.
    pub fn previous(&mut self) {
        if let CampaignState::Active(active) = &mut self.state {
            active.position = active.position.saturating_sub(1);
        }
    }

    /// Lead at the current position, if a non-empty campaign is active.
    pub fn current(&self) -> Option<&Lead> {
        match &self.state {
            CampaignState::Active(active) => active.leads.get(active.position),
            CampaignState::Inactive => None,
        }
    }

    /// Current macro-state.
    pub fn state(&self) -> &CampaignState {
        &self.state
    }

    /// Whether a campaign is running.
    pub fn is_active(&self) -> bool {
        matches!(self.state, CampaignState::Active(_))
    }

    /// Identity of the running campaign.
    pub fn campaign(&self) -> Option<&CampaignInfo> {
        self.active().map(ActiveCampaign::info)
    }

    /// Zero-based position; `0` when inactive.
    pub fn position(&self) -> usize {
        self.active().map_or(0, ActiveCampaign::position)
    }

    /// Number of leads in the running campaign; `0` when inactive.
    pub fn len(&self) -> usize {
        self.active().map_or(0, |active| active.leads.len())
    }

    /// Whether there is no lead to present.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the current lead is the first one.
    pub fn is_first(&self) -> bool {
        !self.is_empty() && self.position() == 0
    }

    /// Whether the current lead is the last one.
    pub fn is_last(&self) -> bool {
        self.active().is_some_and(|active| {
            !active.leads.is_empty() && active.position == active.last_index()
        })
    }

    /// One-based progress, if there is a current lead.
    pub fn progress(&self) -> Option<Progress> {
        self.current().map(|_| Progress {
            current: self.position() + 1,
            total: self.len(),
        })
    }

    fn active(&self) -> Option<&ActiveCampaign> {
        match &self.state {
            CampaignState::Active(active) => Some(active),
            CampaignState::Inactive => None,
        }
    }
}
