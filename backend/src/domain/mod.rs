//! Domain types and services.
//!
//! Purpose: model leads and campaigns, and expose the data-access services
//! that talk to the backend through the ports in [`ports`]. Adapters live in
//! [`crate::outbound`]; nothing here performs I/O directly.
//!
//! Public surface:
//! - [`Envelope`] and [`ErrorInfo`]: the uniform outcome of every data-access
//!   call.
//! - [`Record`], [`Table`], [`Filters`], [`Projection`]: typed table access.
//! - [`Lead`], [`LeadId`], [`LeadField`], [`LeadPatch`], [`LEADS`]: the lead
//!   schema.
//! - [`data_access::RecordAccess`] and [`data_access::FileAccess`].
//! - [`CampaignStore`] and its provider wiring.
//! - [`LeadEditForm`]: staged lead edits.

pub mod campaign;
pub mod data_access;
mod envelope;
mod error;
mod lead;
mod lead_form;
pub mod ports;
mod record;

pub use self::campaign::{
    ActiveCampaign, CampaignContextError, CampaignHandle, CampaignInfo, CampaignProvider,
    CampaignState, CampaignStore, Progress, ViewContext,
};
pub use self::envelope::Envelope;
pub use self::error::{ErrorInfo, ErrorKind};
pub use self::lead::{LEADS, Lead, LeadField, LeadId, LeadPatch};
pub use self::lead_form::{
    LEAD_UPDATED_MESSAGE, LeadEditForm, LeadFormContext, LeadFormError, SubmitOutcome,
};
pub use self::record::{FilterValue, Filters, Projection, Record, Table};
