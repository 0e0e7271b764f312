//! Integration tests for the nested specimen upsert path

use biosync_api::payload::{
    AliquotPayload, AttributePayload, DatasetItemPayload, DatasetPayload, DisposalStatusPayload,
    SpecimenPayload, StatusPayload,
};
use biosync_api::service::{fetch, upsert};
use biosync_common::db::init_memory_database;
use sqlx::SqlitePool;

async fn setup() -> SqlitePool {
    let pool = init_memory_database().await.unwrap();
    sqlx::query("INSERT INTO participants (biobank_id, created_at) VALUES ('Z1234', 0)")
        .execute(&pool)
        .await
        .unwrap();
    pool
}

fn base_payload(rlims_id: &str) -> SpecimenPayload {
    SpecimenPayload {
        rlims_id: Some(rlims_id.to_string()),
        order_id: Some("ord-1".to_string()),
        participant_id: Some("Z1234".to_string()),
        test_code: Some("1ED04".to_string()),
        ..Default::default()
    }
}

fn dataset(rlims_id: &str, param_id: &str) -> DatasetPayload {
    DatasetPayload {
        rlims_id: Some(rlims_id.to_string()),
        name: Some("CBC".to_string()),
        status: Some("Final".to_string()),
        items: Some(vec![DatasetItemPayload {
            param_id: Some(param_id.to_string()),
            display_value: Some("13.5".to_string()),
            display_units: Some("g/dL".to_string()),
        }]),
    }
}

#[tokio::test]
async fn test_minimal_specimen_round_trips_with_null_collections() {
    let pool = setup().await;

    upsert::upsert_specimen(&pool, &base_payload("sabrina"))
        .await
        .unwrap();

    let tree = fetch::fetch_specimen_tree(&pool, "sabrina").await.unwrap();
    assert_eq!(tree.rlims_id.as_deref(), Some("sabrina"));
    assert_eq!(tree.participant_id.as_deref(), Some("Z1234"));
    assert!(tree.attributes.is_none(), "absent attributes must be null");
    assert!(tree.aliquots.is_none(), "absent aliquots must be null");

    // And literally null in the client JSON
    let json = serde_json::to_value(&tree).unwrap();
    assert!(json.get("attributes").unwrap().is_null());
    assert!(json.get("aliquots").unwrap().is_null());
}

#[tokio::test]
async fn test_missing_required_fields_collected_into_one_message() {
    let pool = setup().await;

    let payload = SpecimenPayload {
        participant_id: Some("Z1234".to_string()),
        ..Default::default()
    };
    let err = upsert::upsert_specimen(&pool, &payload).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid input: Missing fields: rlimsID, orderID, testcode"
    );
}

#[tokio::test]
async fn test_unknown_participant_rejected() {
    let pool = setup().await;

    let mut payload = base_payload("sp-1");
    payload.participant_id = Some("Z9999".to_string());
    let err = upsert::upsert_specimen(&pool, &payload).await.unwrap_err();
    assert!(err.to_string().contains("Biobank id Z9999 does not exist"));
}

#[tokio::test]
async fn test_three_level_aliquot_chain_round_trips() {
    let pool = setup().await;

    let mut payload = base_payload("sp-root");
    payload.aliquots = Some(vec![AliquotPayload {
        rlims_id: Some("al-1".to_string()),
        sample_type: Some("Serum".to_string()),
        datasets: Some(vec![dataset("ds-1", "HGB")]),
        aliquots: Some(vec![AliquotPayload {
            rlims_id: Some("al-2".to_string()),
            datasets: Some(vec![dataset("ds-2", "WBC")]),
            aliquots: Some(vec![AliquotPayload {
                rlims_id: Some("al-3".to_string()),
                datasets: Some(vec![dataset("ds-3", "PLT")]),
                ..Default::default()
            }]),
            ..Default::default()
        }]),
        ..Default::default()
    }]);

    upsert::upsert_specimen(&pool, &payload).await.unwrap();
    let tree = fetch::fetch_specimen_tree(&pool, "sp-root").await.unwrap();

    let level1 = &tree.aliquots.as_ref().unwrap()[0];
    assert_eq!(level1.rlims_id.as_deref(), Some("al-1"));
    assert!(level1.parent_aliquot_id.is_none());
    assert_eq!(level1.specimen_rlims_id.as_deref(), Some("sp-root"));
    assert_eq!(
        level1.datasets.as_ref().unwrap()[0].rlims_id.as_deref(),
        Some("ds-1")
    );

    let level2 = &level1.aliquots.as_ref().unwrap()[0];
    assert_eq!(level2.rlims_id.as_deref(), Some("al-2"));
    assert_eq!(level2.parent_aliquot_id.as_deref(), Some("al-1"));
    assert_eq!(level2.specimen_rlims_id.as_deref(), Some("sp-root"));

    let level3 = &level2.aliquots.as_ref().unwrap()[0];
    assert_eq!(level3.rlims_id.as_deref(), Some("al-3"));
    assert_eq!(level3.parent_aliquot_id.as_deref(), Some("al-2"));
    let items = level3.datasets.as_ref().unwrap()[0].items.as_ref().unwrap();
    assert_eq!(items[0].param_id.as_deref(), Some("PLT"));
}

#[tokio::test]
async fn test_upsert_is_idempotent() {
    let pool = setup().await;

    let mut payload = base_payload("sp-idem");
    payload.attributes = Some(vec![
        AttributePayload {
            name: "visit".to_string(),
            value: Some("baseline".to_string()),
        },
        AttributePayload {
            name: "site".to_string(),
            value: Some("B-04".to_string()),
        },
    ]);
    payload.aliquots = Some(vec![AliquotPayload {
        rlims_id: Some("al-idem".to_string()),
        datasets: Some(vec![dataset("ds-idem", "HGB")]),
        ..Default::default()
    }]);

    upsert::upsert_specimen(&pool, &payload).await.unwrap();
    upsert::upsert_specimen(&pool, &payload).await.unwrap();

    let specimen_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM specimens")
        .fetch_one(&pool)
        .await
        .unwrap();
    let attribute_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM specimen_attributes")
        .fetch_one(&pool)
        .await
        .unwrap();
    let aliquot_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM aliquots")
        .fetch_one(&pool)
        .await
        .unwrap();
    let dataset_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM datasets")
        .fetch_one(&pool)
        .await
        .unwrap();
    let item_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM dataset_items")
        .fetch_one(&pool)
        .await
        .unwrap();

    assert_eq!(specimen_count, 1);
    assert_eq!(attribute_count, 2);
    assert_eq!(aliquot_count, 1);
    assert_eq!(dataset_count, 1);
    assert_eq!(item_count, 1);
}

#[tokio::test]
async fn test_omitted_collections_are_deleted_on_reupsert() {
    let pool = setup().await;

    let mut payload = base_payload("sp-replace");
    payload.attributes = Some(vec![AttributePayload {
        name: "visit".to_string(),
        value: Some("baseline".to_string()),
    }]);
    payload.aliquots = Some(vec![AliquotPayload {
        rlims_id: Some("al-replace".to_string()),
        ..Default::default()
    }]);
    upsert::upsert_specimen(&pool, &payload).await.unwrap();

    // Re-upsert without attributes/aliquots keys: the persisted sets are
    // replaced with nothing, not left untouched
    upsert::upsert_specimen(&pool, &base_payload("sp-replace"))
        .await
        .unwrap();

    let tree = fetch::fetch_specimen_tree(&pool, "sp-replace").await.unwrap();
    assert!(tree.attributes.is_none());
    assert!(tree.aliquots.is_none());
}

#[tokio::test]
async fn test_status_upsert_clears_prior_disposal() {
    let pool = setup().await;

    let mut payload = base_payload("sp-disposed");
    payload.disposal_status = Some(DisposalStatusPayload {
        reason: Some("mistake".to_string()),
        disposal_date: Some("2020-04-02".to_string()),
    });
    upsert::upsert_specimen(&pool, &payload).await.unwrap();

    let tree = fetch::fetch_specimen_tree(&pool, "sp-disposed").await.unwrap();
    assert_eq!(
        tree.status.as_ref().unwrap().status.as_deref(),
        Some("Disposed")
    );

    // Second upsert with a status block and no disposalStatus key
    let mut payload = base_payload("sp-disposed");
    payload.status = Some(StatusPayload {
        status: Some("In Circulation".to_string()),
        ..Default::default()
    });
    upsert::upsert_specimen(&pool, &payload).await.unwrap();

    let tree = fetch::fetch_specimen_tree(&pool, "sp-disposed").await.unwrap();
    assert_eq!(
        tree.status.as_ref().unwrap().status.as_deref(),
        Some("In Circulation")
    );
    assert!(tree.disposal_status.is_none(), "disposal must be cleared");

    let (reason, date): (String, Option<String>) =
        sqlx::query_as("SELECT disposal_reason, disposal_date FROM specimens WHERE rlims_id = 'sp-disposed'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(reason, "");
    assert_eq!(date, None);
}

#[tokio::test]
async fn test_aliquot_reattached_from_deleted_parent() {
    let pool = setup().await;

    // al-keep starts as a child of al-drop
    let mut payload = base_payload("sp-move");
    payload.aliquots = Some(vec![AliquotPayload {
        rlims_id: Some("al-drop".to_string()),
        aliquots: Some(vec![AliquotPayload {
            rlims_id: Some("al-keep".to_string()),
            ..Default::default()
        }]),
        ..Default::default()
    }]);
    upsert::upsert_specimen(&pool, &payload).await.unwrap();

    // Next payload drops al-drop and hangs al-keep off the specimen
    let mut payload = base_payload("sp-move");
    payload.aliquots = Some(vec![AliquotPayload {
        rlims_id: Some("al-keep".to_string()),
        ..Default::default()
    }]);
    upsert::upsert_specimen(&pool, &payload).await.unwrap();

    let tree = fetch::fetch_specimen_tree(&pool, "sp-move").await.unwrap();
    let aliquots = tree.aliquots.as_ref().unwrap();
    assert_eq!(aliquots.len(), 1);
    assert_eq!(aliquots[0].rlims_id.as_deref(), Some("al-keep"));
    assert!(aliquots[0].parent_aliquot_id.is_none());
}
