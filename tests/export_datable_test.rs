mod common;

use common::{schema_provider, setup_db};
use querysieve::{ApiHelper, QuerySource};
use serde_json::json;

#[tokio::test]
async fn test_export_layout_metadata_header_then_rows() {
    let db = setup_db().await.unwrap();
    let mut helper = ApiHelper::new(QuerySource::table("users"), schema_provider(&db))
        .filter("status", "eq", json!("active"))
        .columns(["id", "name"])
        .order("id", "asc");

    let rows = helper.export(&db).await.unwrap();
    assert_eq!(rows.len(), 5);

    // Metadata row: table name, range string, timestamp.
    assert_eq!(rows[0][0], json!("users"));
    assert_eq!(rows[0][1], json!("1-3/3"));
    let stamp = rows[0][2].as_str().expect("timestamp string");
    assert_eq!(stamp.len(), "2026-01-01 00:00:00".len());

    // Header row from the first keyed row.
    assert_eq!(rows[1], vec![json!("id"), json!("name")]);

    // Data rows in header-key order.
    assert_eq!(rows[2], vec![json!(1), json!("Alice")]);
    assert_eq!(rows[3], vec![json!(3), json!("Carol")]);
    assert_eq!(rows[4], vec![json!(5), json!("Erin")]);
}

#[tokio::test]
async fn test_export_of_empty_result_has_only_metadata() {
    let db = setup_db().await.unwrap();
    let mut helper = ApiHelper::new(QuerySource::table("users"), schema_provider(&db))
        .filter("status", "eq", json!("archived"));

    let rows = helper.export(&db).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][1], json!("0-0/0"));
}

#[tokio::test]
async fn test_export_hook_can_reshape_the_page() {
    let db = setup_db().await.unwrap();
    let mut helper = ApiHelper::new(QuerySource::table("users"), schema_provider(&db))
        .columns(["id", "name"])
        .order("id", "asc");

    let rows = helper
        .export_with(&db, |page| page.data.truncate(1))
        .await
        .unwrap();
    // metadata + header + the single surviving row
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2], vec![json!(1), json!("Alice")]);
}

#[tokio::test]
async fn test_data_envelope_echoes_applied_state() {
    let db = setup_db().await.unwrap();
    let mut helper = ApiHelper::new(QuerySource::table("users"), schema_provider(&db))
        .filter("status", "eq", json!("active"))
        .query("ofStatus", json!("active"))
        .order("age", "desc");

    let envelope = helper.data(&db).await.unwrap();
    assert_eq!(envelope.filters, json!({"status": {"=": "active"}}));
    assert_eq!(envelope.queries, json!({"ofStatus": "active"}));
    assert_eq!(envelope.orders, json!({"age": "desc"}));
    assert_eq!(envelope.page.total, 3);
}

#[tokio::test]
async fn test_data_hook_runs_before_enveloping() {
    let db = setup_db().await.unwrap();
    let mut helper = ApiHelper::new(QuerySource::table("users"), schema_provider(&db));

    let envelope = helper
        .data_with(&db, |page| {
            for row in &mut page.data {
                if let Some(object) = row.as_object_mut() {
                    object.insert("enriched".to_string(), json!(true));
                }
            }
        })
        .await
        .unwrap();
    assert_eq!(envelope.page.data[0]["enriched"], json!(true));
}

#[tokio::test]
async fn test_datable_reports_both_totals() {
    let db = setup_db().await.unwrap();
    let mut helper = ApiHelper::new(QuerySource::table("users"), schema_provider(&db))
        .filter("status", "eq", json!("active"));

    let envelope = helper.datable(&db).await.unwrap();
    assert_eq!(envelope.records_total, 5);
    assert_eq!(envelope.records_filtered, 3);
    assert_eq!(envelope.data.page.total, 3);

    let serialized = serde_json::to_value(&envelope).unwrap();
    assert_eq!(serialized["recordsTotal"], json!(5));
    assert_eq!(serialized["recordsFiltered"], json!(3));
}
