//! Staged editing of a single lead.
//!
//! [`LeadEditForm`] holds the operator's edits until [`LeadEditForm::submit`]
//! sends them as one `update_by_id` call. Blank fields are submitted as
//! explicit nulls so the stored column is cleared rather than set to `""`.

use mockable::Clock;
use tracing::debug;

use super::data_access::RecordAccess;
use super::ports::{Notifier, RecordStore};
use super::{ErrorInfo, LEADS, Lead, LeadField, LeadPatch};

/// Notification text shown after a successful save.
pub const LEAD_UPDATED_MESSAGE: &str = "Lead updated";

/// Rejections raised while staging a field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LeadFormError {
    /// The value exceeds the field's character limit.
    #[error("{field} must be at most {max} characters (got {actual})")]
    TooLong {
        /// Field being edited.
        field: LeadField,
        /// Character limit.
        max: usize,
        /// Characters supplied.
        actual: usize,
    },
}

/// Result of a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The backend accepted the edit and returned the stored lead.
    Saved(Lead),
    /// The edit was rejected; staged values are kept for a retry.
    Failed(ErrorInfo),
}

/// Collaborators a submission needs.
pub struct LeadFormContext<'a, R> {
    /// Record data access.
    pub records: &'a RecordAccess<R>,
    /// User-facing notification sink.
    pub notifier: &'a dyn Notifier,
    /// Source of the last-modified timestamp.
    pub clock: &'a dyn Clock,
}

/// Edit form for one lead.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadEditForm {
    original: Lead,
    staged: StagedFields,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct StagedFields {
    name: String,
    company: String,
    address: String,
    city: String,
    district: String,
}

impl StagedFields {
    fn from_lead(lead: &Lead) -> Self {
        let mut staged = Self::default();
        for field in LeadField::ALL {
            lead.field(field)
                .unwrap_or_default()
                .clone_into(staged.get_mut(field));
        }
        staged
    }

    const fn get(&self, field: LeadField) -> &String {
        match field {
            LeadField::Name => &self.name,
            LeadField::Company => &self.company,
            LeadField::Address => &self.address,
            LeadField::City => &self.city,
            LeadField::District => &self.district,
        }
    }

    const fn get_mut(&mut self, field: LeadField) -> &mut String {
        match field {
            LeadField::Name => &mut self.name,
            LeadField::Company => &mut self.company,
            LeadField::Address => &mut self.address,
            LeadField::City => &mut self.city,
            LeadField::District => &mut self.district,
        }
    }
}

impl LeadEditForm {
    /// Open a form seeded from `lead`. No lead means no form.
    pub fn open(lead: Option<&Lead>) -> Option<Self> {
        lead.cloned().map(Self::seeded)
    }

    fn seeded(original: Lead) -> Self {
        let staged = StagedFields::from_lead(&original);
        Self { original, staged }
    }

    /// Lead the form was opened for.
    pub fn lead(&self) -> &Lead {
        &self.original
    }

    /// Staged text for `field`.
    pub fn staged(&self, field: LeadField) -> &str {
        self.staged.get(field)
    }

    /// Stage a new value for `field`.
    ///
    /// # Errors
    ///
    /// Returns [`LeadFormError::TooLong`] when `value` has more characters
    /// than [`LeadField::max_len`] allows; the staged value is left as it was.
    pub fn set_field(
        &mut self,
        field: LeadField,
        value: impl Into<String>,
    ) -> Result<(), LeadFormError> {
        let value = value.into();
        let actual = value.chars().count();
        let max = field.max_len();
        if actual > max {
            return Err(LeadFormError::TooLong { field, max, actual });
        }
        *self.staged.get_mut(field) = value;
        Ok(())
    }

    /// Whether any staged value differs from the lead.
    pub fn is_dirty(&self) -> bool {
        LeadField::ALL
            .iter()
            .any(|&field| self.staged(field) != self.original.field(field).unwrap_or_default())
    }

    /// Discard staged edits.
    pub fn cancel(&mut self) {
        *self = Self::seeded(self.original.clone());
    }

    /// Payload the next submission would send.
    pub fn patch(&self, clock: &dyn Clock) -> LeadPatch {
        let value = |field: LeadField| normalise(self.staged(field));
        LeadPatch {
            name: value(LeadField::Name),
            company: value(LeadField::Company),
            address: value(LeadField::Address),
            city: value(LeadField::City),
            district: value(LeadField::District),
            updated_at: clock.utc(),
        }
    }

    /// Save the staged edits.
    ///
    /// On success the notifier reports [`LEAD_UPDATED_MESSAGE`], then
    /// `on_refresh` and `on_close` run in that order and the form is reseeded
    /// from the stored lead. On failure the error message is reported and the
    /// staged values stay untouched.
    pub async fn submit<R>(
        &mut self,
        context: LeadFormContext<'_, R>,
        on_refresh: impl FnOnce(),
        on_close: impl FnOnce(),
    ) -> SubmitOutcome
    where
        R: RecordStore,
    {
        let patch = self.patch(context.clock);
        let id = self.original.id;
        debug!(lead = %id, "submitting lead edit");
        match context
            .records
            .update_by_id(LEADS, &id, &patch)
            .await
            .into_result()
        {
            Ok(saved) => {
                context.notifier.success(LEAD_UPDATED_MESSAGE);
                on_refresh();
                on_close();
                *self = Self::seeded(saved.clone());
                SubmitOutcome::Saved(saved)
            }
            Err(error) => {
                context.notifier.error(error.message());
                SubmitOutcome::Failed(error)
            }
        }
    }
}

fn normalise(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

#[cfg(test)]
#[path = "lead_form_tests.rs"]
mod tests;
