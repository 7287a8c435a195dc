//! Scraper integration tests against a mock listing server.
//!
//! The fixture page carries six cards (one beyond the result bound), tied
//! ratings, a card with no rating bar, and per-card link variants.

use std::sync::{Arc, Mutex};

use medgid_directory::{
    registry, DirectoryError, ProviderScraper, ProviderSource, ScrapeProgress, MAX_PROVIDERS,
};

const LISTING_FIXTURE: &str = include_str!("fixtures/listing.html");

fn collecting_progress(
    seen: Arc<Mutex<Vec<ScrapeProgress>>>,
) -> Box<medgid_directory::ProgressCallback> {
    Box::new(move |p| {
        let seen = Arc::clone(&seen);
        Box::pin(async move {
            seen.lock().unwrap().push(p);
        })
    })
}

#[tokio::test]
async fn test_scrape_parses_bounds_and_sorts() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/domodedovo/kardiolog/")
        .with_status(200)
        .with_body(LISTING_FIXTURE)
        .create_async()
        .await;

    let scraper = ProviderScraper::new(server.url(), "domodedovo").unwrap();
    let spec = registry::by_slug("kardiolog").unwrap();
    let mut progress = medgid_directory::progress::silent();

    let providers = scraper.fetch(spec, &mut *progress).await.unwrap();
    mock.assert_async().await;

    assert_eq!(providers.len(), MAX_PROVIDERS);

    let names: Vec<&str> = providers.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Belov Nikolai Petrovich",
            "Titova Elena Viktorovna",
            "Orlova Maria Sergeevna",
            "Zhukov Denis Andreevich",
            "Gusev Artem Olegovich",
        ]
    );

    let ratings: Vec<f64> = providers.iter().map(|p| p.rating).collect();
    assert_eq!(ratings, vec![4.9, 4.9, 4.2, 3.1, 0.0]);

    // Links are absolutized against the fetch base; already-absolute ones pass through.
    let belov = &providers[0];
    assert_eq!(
        belov.link.as_deref(),
        Some(format!("{}/vrach/102-belov/", server.url()).as_str())
    );
    let titova = &providers[1];
    assert_eq!(
        titova.link.as_deref(),
        Some("https://prodoctorov.ru/vrach/104-titova/")
    );

    // The card with only a bare anchor still resolves a profile link.
    let zhukov = &providers[3];
    assert_eq!(
        zhukov.link.as_deref(),
        Some(format!("{}/vrach/105-zhukov/", server.url()).as_str())
    );

    // Sparse card degraded to sentinels instead of being dropped.
    let gusev = &providers[4];
    assert_eq!(gusev.phone, medgid_directory::NOT_SPECIFIED);
    assert!(gusev.phone_clean.is_none());
}

#[tokio::test]
async fn test_scrape_reports_progress_checkpoints_in_order() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/domodedovo/kardiolog/")
        .with_status(200)
        .with_body(LISTING_FIXTURE)
        .create_async()
        .await;

    let scraper = ProviderScraper::new(server.url(), "domodedovo").unwrap();
    let spec = registry::by_slug("kardiolog").unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut progress = collecting_progress(Arc::clone(&seen));

    scraper.fetch(spec, &mut *progress).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0], ScrapeProgress::Connecting);
    assert_eq!(seen[1], ScrapeProgress::PageLoaded);
    assert_eq!(seen[2], ScrapeProgress::CardsLocated(MAX_PROVIDERS));
    for i in 1..=MAX_PROVIDERS {
        assert_eq!(
            seen[2 + i],
            ScrapeProgress::CardProcessed {
                index: i,
                total: MAX_PROVIDERS
            }
        );
    }
    assert_eq!(*seen.last().unwrap(), ScrapeProgress::Complete);

    // Percentages never go backwards.
    let percents: Vec<u8> = seen.iter().map(|p| p.percent()).collect();
    let mut sorted = percents.clone();
    sorted.sort_unstable();
    assert_eq!(percents, sorted);
}

#[tokio::test]
async fn test_no_results_marker_is_empty_success() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/domodedovo/ftiziatr/")
        .with_status(200)
        .with_body(
            r#"<html><body><div class="b-search-page__nothing-found">No doctors</div></body></html>"#,
        )
        .create_async()
        .await;

    let scraper = ProviderScraper::new(server.url(), "domodedovo").unwrap();
    let spec = registry::by_slug("ftiziatr").unwrap();
    let mut progress = medgid_directory::progress::silent();

    let providers = scraper.fetch(spec, &mut *progress).await.unwrap();
    assert!(providers.is_empty());
}

#[tokio::test]
async fn test_unrecognized_markup_is_parse_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/domodedovo/urolog/")
        .with_status(200)
        .with_body("<html><body><p>redesigned page</p></body></html>")
        .create_async()
        .await;

    let scraper = ProviderScraper::new(server.url(), "domodedovo").unwrap();
    let spec = registry::by_slug("urolog").unwrap();
    let mut progress = medgid_directory::progress::silent();

    let err = scraper.fetch(spec, &mut *progress).await.unwrap_err();
    assert!(matches!(err, DirectoryError::Parse(_)));
    assert!(!err.is_network());
}

#[tokio::test]
async fn test_non_success_status_is_upstream_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/domodedovo/nevrolog/")
        .with_status(503)
        .with_body("unavailable")
        .create_async()
        .await;

    let scraper = ProviderScraper::new(server.url(), "domodedovo").unwrap();
    let spec = registry::by_slug("nevrolog").unwrap();
    let mut progress = medgid_directory::progress::silent();

    let err = scraper.fetch(spec, &mut *progress).await.unwrap_err();
    assert!(matches!(err, DirectoryError::UpstreamStatus(s) if s.as_u16() == 503));
    assert!(err.is_network());
}
