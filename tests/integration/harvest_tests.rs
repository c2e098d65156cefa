//! Integration tests for the harvester
//!
//! These tests use wiremock to serve listing pages and exercise the full
//! fetch, extract, paginate and write cycle end-to-end.

use listing_harvest::config::{CategoryEntry, Config};
use listing_harvest::crawler::{harvest, Orchestrator};
use listing_harvest::output::write_envelope;
use listing_harvest::StopReason;
use serde_json::Value;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with no delays and a single category
fn create_test_config(category: &str, urls: Vec<String>) -> Config {
    let mut config = Config::default();
    config.http.timeout_secs = 5;
    config.fetch.politeness_delay_ms = 0;
    config.fetch.politeness_step_ms = 0;
    config.pagination.page_delay_ms = 0;
    config.categories = vec![CategoryEntry {
        name: category.to_string(),
        urls,
    }];
    config
}

fn listing_item(title: &str, href: &str, revenue: &str, price: &str) -> String {
    format!(
        r#"<div class="annonce-item">
            <a class="titre" href="{}">{}</a>
            <span class="secteur">Commerce</span>
            <span class="ville">Lyon</span>
            <span class="chiffre-affaires">{}</span>
            <span class="prix">{}</span>
            <span class="date">12/03/2024</span>
        </div>"#,
        href, title, revenue, price
    )
}

fn listing_page(items: &[String], next: bool) -> String {
    let next = if next {
        r#"<nav><a class="next" href="?page=2">Suivant</a></nav>"#
    } else {
        ""
    };
    format!(
        "<html><head><title>Annonces</title></head><body>{}{}</body></html>",
        items.join("\n"),
        next
    )
}

async fn mount_page(server: &MockServer, route: &str, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(query_param("page", page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Mounts a two-page result set: three listings, then an empty page
async fn mount_two_page_listing(server: &MockServer, route: &str) {
    let items = vec![
        listing_item("Boulangerie artisanale", "/annonce/101", "CA : 1,2 M€", "350 k€"),
        listing_item("Agence immobilière", "/annonce/102", "800 000 €", "N/A"),
        listing_item("Société de transport", "/annonce/103", "2 millions", "1.5 M€"),
    ];
    mount_page(server, route, "1", listing_page(&items, true)).await;
    mount_page(server, route, "2", listing_page(&[], true)).await;
}

#[tokio::test]
async fn test_two_page_harvest() {
    let server = MockServer::start().await;
    mount_two_page_listing(&server, "/fonds").await;

    let seed = format!("{}/fonds", server.uri());
    let config = create_test_config("fonds", vec![seed.clone()]);

    let run = harvest(&config, CancellationToken::new())
        .await
        .expect("harvest should run");

    assert_eq!(run.envelope.total_items(), 3);
    let records = run.envelope.category("fonds").unwrap();

    let first = &records[0];
    assert_eq!(first.title, "Boulangerie artisanale");
    assert_eq!(
        first.url.as_deref(),
        Some(format!("{}/annonce/101", server.uri()).as_str())
    );
    assert_eq!(first.sector, "Commerce");
    assert_eq!(first.location, "Lyon");
    assert_eq!(first.raw_revenue, "CA : 1,2 M€");
    assert_eq!(first.normalized_revenue, Some(1_200_000));
    assert_eq!(first.normalized_price, Some(350));
    assert_eq!(first.date, "12/03/2024");
    assert_eq!(first.source_url, seed);

    assert_eq!(records[1].normalized_revenue, Some(800));
    assert_eq!(records[1].normalized_price, None);
    assert_eq!(records[2].normalized_revenue, Some(2_000_000));
    assert_eq!(records[2].normalized_price, Some(1_500_000));

    let report = &run.statistics.reports[0];
    assert_eq!(report.pages_visited, 2);
    assert_eq!(report.stop_reason, Some(StopReason::EmptyPage));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_first_page_failure_yields_empty_bucket() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cession"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let config = create_test_config("cession", vec![format!("{}/cession", server.uri())]);
    let run = harvest(&config, CancellationToken::new()).await.unwrap();

    assert_eq!(run.envelope.total_items(), 0);
    assert_eq!(run.envelope.category("cession").unwrap().len(), 0);
    assert_eq!(
        run.statistics.reports[0].stop_reason,
        Some(StopReason::FetchFailed)
    );
    assert_eq!(run.statistics.failed_urls().len(), 1);
}

#[tokio::test]
async fn test_retry_recovers_from_transient_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fonds"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    let items = vec![listing_item("Garage", "/annonce/7", "N/A", "N/A")];
    mount_page(&server, "/fonds", "1", listing_page(&items, false)).await;

    let config = create_test_config("fonds", vec![format!("{}/fonds", server.uri())]);
    let run = harvest(&config, CancellationToken::new()).await.unwrap();

    assert_eq!(run.envelope.total_items(), 1);
    assert_eq!(
        run.statistics.reports[0].stop_reason,
        Some(StopReason::NoNextPage)
    );
}

#[tokio::test]
async fn test_query_string_seed() {
    let server = MockServer::start().await;
    let items = vec![listing_item("Pressing", "fiche-12", "N/A", "90 k€")];
    Mock::given(method("GET"))
        .and(path("/classement"))
        .and(query_param("codePays", "_fr_"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&items, false)))
        .expect(1)
        .mount(&server)
        .await;

    let seed = format!("{}/classement?codePays=_fr_", server.uri());
    let config = create_test_config("classement", vec![seed]);
    let run = harvest(&config, CancellationToken::new()).await.unwrap();

    let records = run.envelope.category("classement").unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].url.as_deref(),
        Some(format!("{}/fiche-12", server.uri()).as_str())
    );
}

#[tokio::test]
async fn test_one_failing_category_does_not_affect_others() {
    let server = MockServer::start().await;
    mount_two_page_listing(&server, "/fonds").await;
    Mock::given(method("GET"))
        .and(path("/cession"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut config = create_test_config("cession", vec![format!("{}/cession", server.uri())]);
    config.categories.push(CategoryEntry {
        name: "fonds".to_string(),
        urls: vec![format!("{}/fonds", server.uri())],
    });

    let run = harvest(&config, CancellationToken::new()).await.unwrap();

    assert_eq!(run.envelope.category("cession").unwrap().len(), 0);
    assert_eq!(run.envelope.category("fonds").unwrap().len(), 3);
    assert_eq!(run.envelope.total_items(), 3);
}

#[tokio::test]
async fn test_repeated_runs_are_identical() {
    let server = MockServer::start().await;
    mount_two_page_listing(&server, "/fonds").await;

    let config = create_test_config("fonds", vec![format!("{}/fonds", server.uri())]);
    let orchestrator = Orchestrator::from_config(&config, CancellationToken::new()).unwrap();

    let first = orchestrator.run(&config.categories).await;
    let second = orchestrator.run(&config.categories).await;

    assert_eq!(strip_timestamps(&first), strip_timestamps(&second));
}

#[tokio::test]
async fn test_written_json_layout() {
    let server = MockServer::start().await;
    mount_two_page_listing(&server, "/fonds").await;

    let mut config = create_test_config("fonds", vec![format!("{}/fonds", server.uri())]);
    config.categories.insert(
        0,
        CategoryEntry {
            name: "cession".to_string(),
            urls: vec![format!("{}/missing", server.uri())],
        },
    );

    let run = harvest(&config, CancellationToken::new()).await.unwrap();

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out").join("listings.json");
    write_envelope(&run.envelope, &output).unwrap();

    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.find("\"cession\"").unwrap() < text.find("\"fonds\"").unwrap());

    let json: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["total_items"], 3);
    assert!(json["scraped_at"].is_string());
    assert_eq!(json["sources"]["cession"], Value::Array(vec![]));

    let record = &json["sources"]["fonds"][1];
    for key in [
        "title",
        "url",
        "sector",
        "location",
        "ca",
        "price",
        "date",
        "source",
        "scraped_at",
        "ca_clean",
        "price_clean",
    ] {
        assert!(record.get(key).is_some(), "missing key {}", key);
    }
    assert_eq!(record["price"], "N/A");
    assert!(record["price_clean"].is_null());
    assert_eq!(record["ca_clean"], 800);
}

#[tokio::test]
async fn test_cancelled_run_still_lists_categories() {
    let server = MockServer::start().await;
    mount_two_page_listing(&server, "/fonds").await;

    let config = create_test_config("fonds", vec![format!("{}/fonds", server.uri())]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let run = harvest(&config, cancel).await.unwrap();

    assert_eq!(run.envelope.total_items(), 0);
    assert_eq!(run.envelope.category("fonds").unwrap().len(), 0);
    assert!(server.received_requests().await.unwrap().is_empty());
}

/// Serializes an envelope with every `scraped_at` removed
fn strip_timestamps(envelope: &listing_harvest::ResultEnvelope) -> Value {
    let mut json = serde_json::to_value(envelope).unwrap();
    json.as_object_mut().unwrap().remove("scraped_at");

    if let Some(sources) = json["sources"].as_object_mut() {
        for records in sources.values_mut() {
            for record in records.as_array_mut().into_iter().flatten() {
                record.as_object_mut().unwrap().remove("scraped_at");
            }
        }
    }
    json
}
