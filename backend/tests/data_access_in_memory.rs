//! End-to-end data access over the in-memory adapters.
//!
//! These tests drive `RecordAccess`, `FileAccess`, and the lead edit form
//! against process-local stores so every path through the envelope mapping
//! is exercised without a live backend.

#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]

use std::sync::{Arc, Mutex};

use leadline::domain::data_access::{ALREADY_EXISTS_CODE, FileAccess, RecordAccess};
use leadline::domain::ports::{Notifier, UploadOptions};
use leadline::domain::{
    ErrorKind, Filters, LEAD_UPDATED_MESSAGE, LEADS, Lead, LeadEditForm, LeadField,
    LeadFormContext, LeadId, Projection, SubmitOutcome,
};
use leadline::outbound::memory::{InMemoryObjectStorage, InMemoryRecordStore};
use leadline::test_support::MutableClock;
use mockable::Clock;
use rstest::{fixture, rstest};
use serde_json::json;

#[derive(Default)]
struct RecordingNotifier {
    messages: Mutex<Vec<(bool, String)>>,
}

impl RecordingNotifier {
    fn messages(&self) -> Vec<(bool, String)> {
        self.messages.lock().expect("notifier lock").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, text: &str) {
        self.messages
            .lock()
            .expect("notifier lock")
            .push((true, text.to_owned()));
    }

    fn error(&self, text: &str) {
        self.messages
            .lock()
            .expect("notifier lock")
            .push((false, text.to_owned()));
    }
}

struct Harness {
    clock: Arc<MutableClock>,
    records: RecordAccess<InMemoryRecordStore>,
}

#[fixture]
fn harness() -> Harness {
    let clock = Arc::new(MutableClock::fixed());
    let shared: Arc<dyn Clock> = clock.clone();
    let store = InMemoryRecordStore::new(shared);
    store
        .seed(
            LEADS.name(),
            vec![
                json!({ "id": 7, "name": "Ayla", "city": "Izmir", "district": "Konak" }),
                json!({ "id": 8, "name": "Burak", "city": "Ankara" }),
                json!({ "id": 9, "name": "Cem", "city": "Bursa" }),
                json!({ "id": 42, "name": "Deniz", "company": "Old Co", "city": "Izmir" }),
            ],
        )
        .expect("seed succeeds");
    Harness {
        clock,
        records: RecordAccess::new(Arc::new(store)),
    }
}

#[rstest]
#[tokio::test]
async fn updates_are_visible_with_a_later_timestamp(harness: Harness) {
    let id = LeadId::new(42);
    let before = harness
        .records
        .update_by_id(LEADS, &id, &json!({ "company": "Interim" }))
        .await
        .into_result()
        .expect("first update succeeds");
    assert!(before.updated_at.is_some(), "updates stamp updated_at");
    harness.clock.advance_seconds(90);

    let updated = harness
        .records
        .update_by_id(LEADS, &id, &json!({ "company": "Acme" }))
        .await
        .into_result()
        .expect("second update succeeds");
    let fetched = harness
        .records
        .fetch_by_id(LEADS, &id, &Projection::All)
        .await
        .into_result()
        .expect("lead exists");

    assert_eq!(updated, fetched);
    assert_eq!(fetched.company.as_deref(), Some("Acme"));
    assert_eq!(fetched.name.as_deref(), Some("Deniz"));
    assert!(fetched.updated_at > before.updated_at);
    assert_eq!(fetched.updated_at, Some(harness.clock.utc()));
}

#[rstest]
#[tokio::test]
async fn projections_without_the_key_still_decode(harness: Harness) {
    let projection = Projection::columns([LeadField::Name.column(), LeadField::City.column()]);

    let lead = harness
        .records
        .fetch_by_id(LEADS, &LeadId::new(7), &projection)
        .await
        .into_result()
        .expect("projected lead decodes");
    let leads = harness
        .records
        .fetch_all(LEADS, &Projection::columns(["name"]), &Filters::new())
        .await
        .into_result()
        .expect("projected leads decode");

    assert_eq!(lead.id, LeadId::new(7));
    assert_eq!(lead.city.as_deref(), Some("Izmir"));
    assert!(lead.district.is_none(), "unselected columns stay empty");
    let ids: Vec<i64> = leads.iter().map(|lead| lead.id.get()).collect();
    assert_eq!(ids, [7, 8, 9, 42]);
}

#[rstest]
#[tokio::test]
async fn bulk_inserts_with_a_duplicate_key_store_nothing(harness: Harness) {
    let envelope = harness
        .records
        .insert_many(LEADS, &[json!({ "id": 100 }), json!({ "id": 7 })])
        .await;

    let error = envelope.error().expect("duplicate key is rejected");
    assert_eq!(error.kind(), ErrorKind::Constraint);

    let ids: Vec<i64> = harness
        .records
        .fetch_all(LEADS, &Projection::All, &Filters::new())
        .await
        .into_result()
        .expect("fetch succeeds")
        .iter()
        .map(|lead| lead.id.get())
        .collect();
    assert_eq!(ids, [7, 8, 9, 42]);
}

#[rstest]
#[tokio::test]
async fn missing_rows_report_not_found(harness: Harness) {
    let envelope = harness
        .records
        .fetch_by_id(LEADS, &LeadId::new(999), &Projection::All)
        .await;

    let error = envelope.error().expect("lookup fails");
    assert_eq!(error.kind(), ErrorKind::NotFound);
    assert!(envelope.data().is_none());
}

#[rstest]
#[tokio::test]
async fn membership_filters_return_only_members(harness: Harness) {
    let filters = Filters::new()
        .any_of(LeadField::City.column(), ["Izmir", "Bursa"])
        .maybe_eq(LeadField::District.column(), None::<String>);

    let leads = harness
        .records
        .fetch_all(LEADS, &Projection::All, &filters)
        .await
        .into_result()
        .expect("fetch succeeds");

    let ids: Vec<i64> = leads.iter().map(|lead| lead.id.get()).collect();
    assert_eq!(ids, [7, 9, 42]);
    assert!(
        leads
            .iter()
            .all(|lead| matches!(lead.city.as_deref(), Some("Izmir" | "Bursa")))
    );
}

#[rstest]
#[tokio::test]
async fn edit_form_clears_blank_fields_and_saves_the_rest(harness: Harness) {
    let lead = harness
        .records
        .fetch_by_id(LEADS, &LeadId::new(42), &Projection::All)
        .await
        .into_result()
        .expect("lead exists");
    let mut form = LeadEditForm::open(Some(&lead)).expect("form opens for a lead");
    form.set_field(LeadField::Name, "   ").expect("within limit");
    form.set_field(LeadField::Company, "Acme").expect("within limit");
    harness.clock.advance_seconds(5);

    let notifier = RecordingNotifier::default();
    let context = LeadFormContext {
        records: &harness.records,
        notifier: &notifier,
        clock: harness.clock.as_ref(),
    };
    let refreshed = Mutex::new(false);
    let outcome = form
        .submit(
            context,
            || *refreshed.lock().expect("flag lock") = true,
            || {},
        )
        .await;

    let saved = match outcome {
        SubmitOutcome::Saved(saved) => saved,
        SubmitOutcome::Failed(error) => panic!("submit failed: {error}"),
    };
    assert_eq!(saved.name, None);
    assert_eq!(saved.company.as_deref(), Some("Acme"));
    assert_eq!(saved.city.as_deref(), Some("Izmir"));
    assert!(*refreshed.lock().expect("flag lock"));
    assert_eq!(
        notifier.messages(),
        vec![(true, LEAD_UPDATED_MESSAGE.to_owned())]
    );

    let stored: Lead = harness
        .records
        .fetch_by_id(LEADS, &LeadId::new(42), &Projection::All)
        .await
        .into_result()
        .expect("lead exists");
    assert_eq!(stored, saved);
}

#[rstest]
#[tokio::test]
async fn duplicate_uploads_are_reported_as_conflicts() {
    let clock: Arc<dyn Clock> = Arc::new(MutableClock::fixed());
    let files = FileAccess::new(Arc::new(InMemoryObjectStorage::new(clock)));
    let options = UploadOptions::default();

    files
        .upload_file("lead-files", "leads/42/card.png", b"png".to_vec(), &options)
        .await
        .into_result()
        .expect("first upload succeeds");
    let error = files
        .upload_file("lead-files", "leads/42/card.png", b"png".to_vec(), &options)
        .await
        .into_result()
        .expect_err("second upload conflicts");

    assert_eq!(error.kind(), ErrorKind::Constraint);
    assert_eq!(error.code(), Some(ALREADY_EXISTS_CODE));

    files
        .upload_file_overwrite("lead-files", "leads/42/card.png", b"png2".to_vec(), &options)
        .await
        .into_result()
        .expect("overwrite succeeds");
    let content = files
        .download_file("lead-files", "leads/42/card.png")
        .await
        .into_result()
        .expect("download succeeds");
    assert_eq!(content, b"png2");
}

#[rstest]
#[tokio::test]
async fn deleting_a_missing_file_succeeds() {
    let clock: Arc<dyn Clock> = Arc::new(MutableClock::fixed());
    let files = FileAccess::new(Arc::new(InMemoryObjectStorage::new(clock)));

    let envelope = files.delete_file("lead-files", "ghost.txt").await;

    assert!(envelope.is_success());
}
