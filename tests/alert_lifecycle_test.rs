mod common;

use assert_matches::assert_matches;
use common::TestApp;

use stockroom_api::errors::ServiceError;
use stockroom_api::services::parts::UpdatePartInput;

#[tokio::test]
async fn creating_a_part_below_minimum_raises_an_alert() {
    let app = TestApp::new().await;
    let part = app.create_part("Chain link", 3, 10).await;

    let page = app.state.services.alerts.list(None, None).await.unwrap();
    assert_eq!(page.unread_count, 1);
    assert_eq!(page.alerts[0].part_id, part.id);
    assert_eq!(page.alerts[0].part_name.as_deref(), Some("Chain link"));
    assert!(page.alerts[0].message.contains("has 3 units (minimum: 10)"));
}

#[tokio::test]
async fn direct_quantity_edit_runs_the_low_stock_check() {
    let app = TestApp::new().await;
    let part = app.create_part("Drive shaft", 50, 10).await;
    assert_eq!(app.state.services.alerts.unread_count().await.unwrap(), 0);

    app.state
        .services
        .parts
        .update(
            part.id,
            UpdatePartInput {
                quantity: Some(4),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(app.state.services.alerts.unread_count().await.unwrap(), 1);
}

#[tokio::test]
async fn mark_read_is_terminal_and_unknown_ids_fail() {
    let app = TestApp::new().await;
    app.create_part("Gasket", 1, 10).await;

    let page = app.state.services.alerts.list(None, None).await.unwrap();
    let alert_id = page.alerts[0].id;

    let marked = app.state.services.alerts.mark_read(alert_id).await.unwrap();
    assert!(marked.seen);
    assert_eq!(app.state.services.alerts.unread_count().await.unwrap(), 0);

    let err = app.state.services.alerts.mark_read(99_999).await.unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn mark_all_read_is_idempotent() {
    let app = TestApp::new().await;
    app.create_part("Bushing", 1, 10).await;
    app.create_part("Washer", 2, 10).await;

    let first = app.state.services.alerts.mark_all_read().await.unwrap();
    assert_eq!(first, 2);

    let second = app.state.services.alerts.mark_all_read().await.unwrap();
    assert_eq!(second, 0);

    let page = app.state.services.alerts.list(None, None).await.unwrap();
    assert!(page.alerts.iter().all(|a| a.seen));
    assert_eq!(page.unread_count, 0);
}

#[tokio::test]
async fn listing_puts_unseen_first_and_respects_the_seen_filter() {
    let app = TestApp::new().await;
    app.create_part("Spring", 1, 10).await;
    app.state.services.alerts.mark_all_read().await.unwrap();
    app.create_part("Clip", 1, 10).await;

    let page = app.state.services.alerts.list(None, None).await.unwrap();
    assert_eq!(page.alerts.len(), 2);
    assert!(!page.alerts[0].seen, "unseen alerts order first");
    assert!(page.alerts[1].seen);
    assert_eq!(page.unread_count, 1);

    let unseen_only = app
        .state
        .services
        .alerts
        .list(Some(false), None)
        .await
        .unwrap();
    assert_eq!(unseen_only.alerts.len(), 1);
    assert_eq!(unseen_only.alerts[0].part_name.as_deref(), Some("Clip"));

    let capped = app.state.services.alerts.list(None, Some(1)).await.unwrap();
    assert_eq!(capped.alerts.len(), 1);
    assert_eq!(capped.total, 1);
    // The unseen count is global, not page-scoped.
    assert_eq!(capped.unread_count, 1);
}
