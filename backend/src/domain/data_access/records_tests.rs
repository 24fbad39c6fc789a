//! Tests for the record-oriented data-access operations.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::domain::ports::MockRecordStore;
use crate::domain::{ErrorKind, LEADS, Lead, LeadId, LeadPatch};

fn lead_row(id: i64, name: &str) -> Value {
    json!({ "id": id, "name": name, "company": "Acme", "city": "Izmir" })
}

#[fixture]
fn store() -> MockRecordStore {
    MockRecordStore::new()
}

fn access(store: MockRecordStore) -> RecordAccess<MockRecordStore> {
    RecordAccess::new(Arc::new(store))
}

#[rstest]
#[tokio::test]
async fn fetch_all_decodes_rows_and_forwards_filters(mut store: MockRecordStore) {
    let filters = Filters::new()
        .any_of("city", ["Izmir", "Ankara"])
        .maybe_eq("district", None::<String>);
    let expected = filters.clone();
    store
        .expect_select()
        .withf(move |table, projection, filters| {
            table == "leads" && *projection == Projection::All && *filters == expected
        })
        .times(1)
        .return_once(|_, _, _| Ok(vec![lead_row(1, "Ada"), lead_row(2, "Grace")]));

    let leads = access(store)
        .fetch_all(LEADS, &Projection::All, &filters)
        .await
        .into_result()
        .expect("fetch succeeds");

    assert_eq!(leads.len(), 2);
    assert_eq!(leads.first().and_then(|lead| lead.name.as_deref()), Some("Ada"));
}

#[rstest]
#[case::fetch_all(false)]
#[case::fetch_by_id(true)]
#[tokio::test]
async fn column_projections_always_select_the_key(
    mut store: MockRecordStore,
    #[case] by_id: bool,
) {
    store
        .expect_select()
        .withf(|_, projection, _| *projection == Projection::columns(["name", "id"]))
        .times(1)
        .return_once(|_, _, _| Ok(vec![json!({ "id": 7, "name": "Ada" })]));
    let access = access(store);
    let projection = Projection::columns(["name"]);

    let lead = if by_id {
        access
            .fetch_by_id(LEADS, &LeadId::new(7), &projection)
            .await
            .into_result()
    } else {
        access
            .fetch_all(LEADS, &projection, &Filters::new())
            .await
            .into_result()
            .map(|mut leads| leads.remove(0))
    }
    .expect("projected rows decode");

    assert_eq!(lead.id, LeadId::new(7));
    assert_eq!(lead.name.as_deref(), Some("Ada"));
    assert!(lead.company.is_none());
}

#[rstest]
#[tokio::test]
async fn projections_naming_the_key_are_sent_unchanged(mut store: MockRecordStore) {
    store
        .expect_select()
        .withf(|_, projection, _| *projection == Projection::columns(["id", "city"]))
        .times(1)
        .return_once(|_, _, _| Ok(vec![json!({ "id": 7, "city": "Izmir" })]));

    let lead = access(store)
        .fetch_by_id(LEADS, &LeadId::new(7), &Projection::columns(["id", "city"]))
        .await
        .into_result()
        .expect("projected row decodes");

    assert_eq!(lead.city.as_deref(), Some("Izmir"));
}

#[rstest]
#[tokio::test]
async fn fetch_by_id_reports_not_found_for_zero_rows(mut store: MockRecordStore) {
    store
        .expect_select()
        .withf(|_, _, filters| filters.matches(&json!({ "id": 999 })))
        .times(1)
        .return_once(|_, _, _| Ok(Vec::new()));

    let envelope = access(store)
        .fetch_by_id(LEADS, &LeadId::new(999), &Projection::All)
        .await;

    assert!(envelope.data().is_none());
    let error = envelope.error().expect("missing lead is an error");
    assert_eq!(error.kind(), ErrorKind::NotFound);
    assert!(error.message().contains("999"));
}

#[rstest]
#[tokio::test]
async fn fetch_by_id_keeps_transport_failures_distinct(mut store: MockRecordStore) {
    store
        .expect_select()
        .times(1)
        .return_once(|_, _, _| Err(RecordStoreError::transport("connection refused")));

    let envelope = access(store)
        .fetch_by_id(LEADS, &LeadId::new(1), &Projection::All)
        .await;

    let error = envelope.error().expect("transport failure is reported");
    assert_eq!(error.kind(), ErrorKind::Transport);
    assert_eq!(error.message(), "connection refused");
}

#[rstest]
#[tokio::test]
async fn update_by_id_targets_key_and_sends_explicit_nulls(mut store: MockRecordStore) {
    let updated_at = Utc
        .with_ymd_and_hms(2024, 5, 2, 10, 0, 0)
        .single()
        .expect("valid timestamp");
    store
        .expect_update()
        .withf(|table, filters, patch| {
            table == "leads"
                && filters.matches(&json!({ "id": 42 }))
                && !filters.matches(&json!({ "id": 43 }))
                && patch.get("name") == Some(&Value::Null)
                && patch.get("company") == Some(&json!("Acme"))
        })
        .times(1)
        .return_once(move |_, _, _| {
            Ok(vec![json!({
                "id": 42,
                "name": null,
                "company": "Acme",
                "updated_at": updated_at,
            })])
        });

    let patch = LeadPatch {
        name: None,
        company: Some("Acme".to_owned()),
        address: None,
        city: None,
        district: None,
        updated_at,
    };
    let lead = access(store)
        .update_by_id(LEADS, &LeadId::new(42), &patch)
        .await
        .into_result()
        .expect("update succeeds");

    assert!(lead.name.is_none());
    assert_eq!(lead.company.as_deref(), Some("Acme"));
    assert_eq!(lead.updated_at, Some(updated_at));
}

#[rstest]
#[tokio::test]
async fn update_by_id_with_no_match_is_not_found(mut store: MockRecordStore) {
    store
        .expect_update()
        .times(1)
        .return_once(|_, _, _| Ok(Vec::new()));

    let envelope = access(store)
        .update_by_id(LEADS, &LeadId::new(7), &json!({ "name": "x" }))
        .await;

    assert!(envelope.error().is_some_and(ErrorInfo::is_not_found));
}

#[rstest]
#[tokio::test]
async fn insert_returns_persisted_row(mut store: MockRecordStore) {
    store
        .expect_insert()
        .withf(|table, rows| table == "leads" && rows.len() == 1)
        .times(1)
        .return_once(|_, _| Ok(vec![lead_row(10, "Ada")]));

    let lead: Lead = access(store)
        .insert(LEADS, &json!({ "name": "Ada" }))
        .await
        .into_result()
        .expect("insert succeeds");

    assert_eq!(lead.id, LeadId::new(10));
}

#[rstest]
#[tokio::test]
async fn insert_many_with_nothing_to_insert_skips_backend(mut store: MockRecordStore) {
    store.expect_insert().times(0);

    let inserted = access(store)
        .insert_many(LEADS, &Vec::<Value>::new()[..])
        .await
        .into_result()
        .expect("empty insert succeeds");

    assert!(inserted.is_empty());
}

#[rstest]
#[tokio::test]
async fn delete_many_uses_membership_filter(mut store: MockRecordStore) {
    store
        .expect_delete()
        .withf(|_, filters| {
            filters.matches(&json!({ "id": 1 }))
                && filters.matches(&json!({ "id": 3 }))
                && !filters.matches(&json!({ "id": 2 }))
        })
        .times(1)
        .return_once(|_, _| Ok(vec![lead_row(1, "Ada")]));

    let deleted = access(store)
        .delete_many(LEADS, &[LeadId::new(1), LeadId::new(3)])
        .await
        .into_result()
        .expect("delete succeeds");

    assert_eq!(deleted.len(), 1, "only rows that existed are returned");
}

#[rstest]
#[tokio::test]
async fn delete_by_id_returns_removed_row(mut store: MockRecordStore) {
    store
        .expect_delete()
        .times(1)
        .return_once(|_, _| Ok(vec![lead_row(5, "Grace")]));

    let lead = access(store)
        .delete_by_id(LEADS, &LeadId::new(5))
        .await
        .into_result()
        .expect("delete succeeds");

    assert_eq!(lead.name.as_deref(), Some("Grace"));
}

#[rstest]
#[tokio::test]
async fn undecodable_rows_become_internal_errors(mut store: MockRecordStore) {
    store
        .expect_select()
        .times(1)
        .return_once(|_, _, _| Ok(vec![json!({ "name": "no id" })]));

    let envelope = access(store)
        .fetch_all(LEADS, &Projection::All, &Filters::new())
        .await;

    assert_eq!(
        envelope.error().map(ErrorInfo::kind),
        Some(ErrorKind::Internal)
    );
}

#[rstest]
#[tokio::test]
async fn backend_rejections_surface_code(mut store: MockRecordStore) {
    store.expect_update().times(1).return_once(|_, _, _| {
        Err(RecordStoreError::rejected(
            "value too long for type character varying(50)",
            "22001",
            None::<Value>,
        ))
    });

    let envelope = access(store)
        .update_by_id(LEADS, &LeadId::new(1), &json!({ "city": "x" }))
        .await;

    let error = envelope.error().expect("rejection is reported");
    assert_eq!(error.kind(), ErrorKind::Constraint);
    assert_eq!(error.code(), Some("22001"));
}

#[rstest]
#[tokio::test]
async fn execute_query_hands_over_the_store(mut store: MockRecordStore) {
    store
        .expect_select()
        .times(1)
        .return_once(|_, _, _| Ok(vec![lead_row(1, "Ada")]));

    let count = access(store)
        .execute_query(|store| async move {
            let rows = store
                .select("leads", &Projection::columns(["id"]), &Filters::new())
                .await?;
            Ok::<_, RecordStoreError>(rows.len())
        })
        .await;

    assert_eq!(count.data(), Some(&1));
}

#[rstest]
#[tokio::test]
async fn execute_query_maps_builder_errors(store: MockRecordStore) {
    let envelope: Envelope<()> = access(store)
        .execute_query(|_| async { Err::<(), _>(RecordStoreError::transport("socket closed")) })
        .await;

    assert_eq!(
        envelope.error().map(ErrorInfo::kind),
        Some(ErrorKind::Transport)
    );
}
