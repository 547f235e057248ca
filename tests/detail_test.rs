//! Integration tests for hydrated detail and credits with SWR caching.

mod common;

use std::time::Duration;

use common::{eventually, itunes_item, itunes_term, podchaser_credit, podchaser_item, TestHarness};
use podvault_common::{Error, ProviderKind};
use serde_json::json;
use wiremock::matchers::method;
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn cold_detail_is_hydrated_then_served_fresh() {
    let h = TestHarness::new().await;
    itunes_term("vault cast")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [itunes_item(1001, "Vault Cast")]
        })))
        .expect(1)
        .mount(&h.itunes)
        .await;
    h.mount_podchaser_token().await;
    h.mount_podchaser_search(vec![podchaser_item("778899", "Vault Cast", 4.2)])
        .await;
    let catalog = h.catalog();

    let detail = catalog.get_detail("vault-cast").await.unwrap();
    assert_eq!(detail.provider, ProviderKind::Itunes);
    assert_eq!(detail.remote_id, "1001");
    assert_eq!(detail.rating, Some(4.2));
    assert_eq!(detail.credits, Some(Vec::new()));

    // Within the freshness window nothing goes upstream.
    let again = catalog.get_detail("vault-cast").await.unwrap();
    assert_eq!(again, detail);
}

#[tokio::test]
async fn unknown_podcast_is_not_found_and_not_cached() {
    let h = TestHarness::new().await;
    h.mount_itunes_search(Vec::new()).await;
    let catalog = h.catalog();

    let err = catalog.get_detail("no-such-show").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(err.body().detail, "No podcast found for id 'no-such-show'.");

    catalog.get_detail("no-such-show").await.unwrap_err();
    assert_eq!(h.itunes.received_requests().await.unwrap().len(), 2);
    assert!(h.podchaser.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn podchaser_outage_degrades_to_primary_data() {
    let h = TestHarness::new().await;
    h.mount_itunes_search(vec![itunes_item(1001, "Vault Cast")]).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&h.podchaser)
        .await;

    let detail = h.catalog().get_detail("vault-cast").await.unwrap();

    assert_eq!(detail.title, "Vault Cast");
    assert_eq!(detail.rating, None);
    assert_eq!(detail.credits, None);
}

#[tokio::test]
async fn stale_detail_is_served_then_refreshed_in_background() {
    let h = TestHarness::new().await;
    itunes_term("vault cast")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [itunes_item(1001, "Vault Cast")]
        })))
        .up_to_n_times(1)
        .mount(&h.itunes)
        .await;
    itunes_term("vault cast")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [itunes_item(1001, "Vault Cast (Remastered)")]
        })))
        .mount(&h.itunes)
        .await;
    h.mount_podchaser_token().await;
    h.mount_podchaser_search(Vec::new()).await;
    let catalog = h.catalog();

    assert_eq!(catalog.get_detail("vault-cast").await.unwrap().title, "Vault Cast");

    // Let the one-second freshness marker lapse.
    tokio::time::sleep(Duration::from_millis(1_200)).await;

    let stale = catalog.get_detail("vault-cast").await.unwrap();
    assert_eq!(stale.title, "Vault Cast");

    let catalog = &catalog;
    let refreshed = eventually(move || async move {
        catalog.get_detail("vault-cast").await.unwrap().title == "Vault Cast (Remastered)"
    })
    .await;
    assert!(refreshed, "background refresh never landed");
}

#[tokio::test]
async fn credits_are_fetched_and_cached() {
    let h = TestHarness::new().await;
    h.mount_podchaser_token().await;
    h.mount_podchaser_search(vec![podchaser_item("778899", "Vault Cast", 4.6)])
        .await;
    h.mount_podchaser_credits(vec![
        podchaser_credit("Ada", "Host"),
        podchaser_credit("Grace", "Guest"),
    ])
    .await;
    let catalog = h.catalog();

    let payload = catalog.get_credits("vault-cast").await.unwrap();
    assert_eq!(payload.id, "vault-cast");
    assert_eq!(payload.provider, ProviderKind::Podchaser);
    assert_eq!(payload.credits.len(), 2);
    assert_eq!(payload.credits[0].person.name, "Ada");
    assert_eq!(payload.credits[1].role, "Guest");

    let requests = h.podchaser.received_requests().await.unwrap().len();
    catalog.get_credits("vault-cast").await.unwrap();
    assert_eq!(h.podchaser.received_requests().await.unwrap().len(), requests);
}

#[tokio::test]
async fn exhausted_quota_yields_empty_credits() {
    let h = TestHarness::new().await;
    h.mount_podchaser_token().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(402))
        .mount(&h.podchaser)
        .await;

    let payload = h.catalog().get_credits("vault-cast").await.unwrap();

    assert_eq!(
        serde_json::to_value(&payload).unwrap(),
        json!({"id": "vault-cast", "provider": "podchaser", "credits": []})
    );
}
