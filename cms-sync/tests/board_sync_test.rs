use cms_sync::host::{PluginMode, StaticHost};
use cms_sync::types::plugin_keys;
use cms_sync::{
    configure_and_sync, sync_existing_collection, DataSourceAdapter, FieldType, FieldValue,
    ManagedCollection, MemoryCollection, PinterestAdapter, PreviousSync, SqliteCollection,
};
use mockito::Server;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

async fn board_server(body: &str) -> (mockito::ServerGuard, mockito::Mock) {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/boards/board1/pins?page_size=100")
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await;
    (server, mock)
}

#[tokio::test]
async fn test_configure_then_resume_from_disk() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("collection.db");
    let cancel = CancellationToken::new();

    // First run: interactive configure with two selected fields.
    let (server, _mock) = board_server(
        r#"{"items": [
            {"id": "p1", "title": "Lemon tart", "media": {"image_cover_url": "https://i.pinimg.com/a.jpg"}},
            {"id": "p2", "title": "Plum cake"}
        ]}"#,
    )
    .await;
    {
        let collection = SqliteCollection::new(&db_path).unwrap();
        let adapter = PinterestAdapter::with_base_url(server.url());
        let source = adapter.fetch("board1", "tok", &cancel).await.unwrap();

        let selected = vec!["title".to_string(), "media".to_string()];
        let report = configure_and_sync(&collection, &source, Some(&selected), "id", "tok")
            .await
            .unwrap();

        assert_eq!(report.upserted, vec!["p1", "p2"]);
        let p1 = collection.get_item("p1").unwrap().unwrap();
        assert_eq!(p1.slug, "p1");
        assert_eq!(p1.field_data["title"].value, "Lemon tart");
        assert_eq!(
            p1.field_data["media"],
            FieldValue::asset(FieldType::Image, "https://i.pinimg.com/a.jpg")
        );
        assert!(!p1.field_data.contains_key("description"));
    }

    // Second run: the board lost p1 and gained p3.
    let (server, _mock) =
        board_server(r#"{"items": [{"id": "p2", "title": "Plum cake v2"}, {"id": "p3"}]}"#).await;
    let collection = SqliteCollection::new(&db_path).unwrap();

    let previous = PreviousSync::load(&collection).await.unwrap();
    assert_eq!(previous.board_id.as_deref(), Some("board1"));
    assert_eq!(previous.slug_field_id.as_deref(), Some("id"));
    assert_eq!(previous.access_token.as_deref(), Some("tok"));

    let host = StaticHost::permissive(PluginMode::SyncManagedCollection);
    let adapter = PinterestAdapter::with_base_url(server.url());
    let outcome = sync_existing_collection(&host, &collection, &adapter, &previous, &cancel).await;

    assert!(outcome.did_sync);
    assert!(host.notifications().is_empty());

    let mut ids = collection.get_item_ids().await.unwrap();
    ids.sort();
    assert_eq!(ids, vec!["p2", "p3"]);

    let p2 = collection.get_item("p2").unwrap().unwrap();
    assert_eq!(p2.field_data["title"].value, "Plum cake v2");
    let p3 = collection.get_item("p3").unwrap().unwrap();
    assert_eq!(p3.field_data["title"].value, serde_json::Value::Null);
    assert_eq!(
        collection.get_plugin_data(plugin_keys::BOARD_ID).await.unwrap().as_deref(),
        Some("board1")
    );
}

#[tokio::test]
async fn test_resume_with_revoked_token_leaves_collection() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/boards/board1/pins?page_size=100")
        .with_status(401)
        .create_async()
        .await;

    let collection = SqliteCollection::new(":memory:").unwrap();
    collection.set_plugin_data(plugin_keys::BOARD_ID, "board1").await.unwrap();
    collection.set_plugin_data(plugin_keys::SLUG_FIELD_ID, "id").await.unwrap();
    collection.set_plugin_data(plugin_keys::ACCESS_TOKEN, "revoked").await.unwrap();

    let previous = PreviousSync::load(&collection).await.unwrap();
    let host = StaticHost::permissive(PluginMode::SyncManagedCollection);
    let adapter = PinterestAdapter::with_base_url(server.url());

    let outcome =
        sync_existing_collection(&host, &collection, &adapter, &previous, &CancellationToken::new())
            .await;

    assert!(!outcome.did_sync);
    assert_eq!(host.notifications().len(), 1);
    assert!(host.notifications()[0].0.contains("board1"));
    assert!(collection.get_item_ids().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_pin_without_id_is_skipped_and_siblings_sync() {
    let (server, _mock) = board_server(
        r#"{"items": [
            {"id": "p1", "title": "ok"},
            {"id": null, "title": "no id"},
            {"id": "p3", "title": "also ok"}
        ]}"#,
    )
    .await;

    let collection = MemoryCollection::new();
    let adapter = PinterestAdapter::with_base_url(server.url());
    let source = adapter
        .fetch("board1", "tok", &CancellationToken::new())
        .await
        .unwrap();

    let report = configure_and_sync(&collection, &source, None, "id", "tok")
        .await
        .unwrap();

    assert_eq!(report.upserted, vec!["p1", "p3"]);
    assert_eq!(report.skipped, vec![1]);
    assert_eq!(collection.get_item_ids().await.unwrap(), vec!["p1", "p3"]);
}
