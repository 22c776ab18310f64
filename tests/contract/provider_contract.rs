//! Contract every bundled pricing provider must honor.

use std::sync::Arc;

use dealscope_core::{
    EbaySoldProvider, FixtureBook, FixtureFeed, PricingProvider, ProviderId, SourceErrorKind,
    TcgplayerProvider,
};
use dealscope_tests::item;

fn providers() -> Vec<Arc<dyn PricingProvider>> {
    vec![
        Arc::new(TcgplayerProvider::sample().expect("bundled tcgplayer fixtures")),
        Arc::new(EbaySoldProvider::sample().expect("bundled ebay fixtures")),
    ]
}

#[tokio::test]
async fn every_provider_returns_an_attributed_summary() {
    let key = item("base1-4");

    for provider in providers() {
        let summary = provider
            .market_summary(&key)
            .await
            .expect("bundled item is priced");

        assert_eq!(summary.currency, "USD", "{}", provider.name());
        assert!(summary.market > 0.0, "{}", provider.name());
        assert!(summary.market.is_finite());
        assert_eq!(summary.sources.len(), 1);
        assert_eq!(summary.sources[0].source, provider.name());
        assert_eq!(summary.sources[0].currency, summary.currency);
    }
}

#[tokio::test]
async fn provider_names_match_known_sources() {
    let names = providers()
        .iter()
        .map(|provider| provider.name().to_owned())
        .collect::<Vec<_>>();

    let expected = ProviderId::ALL
        .iter()
        .map(|id| id.as_str().to_owned())
        .collect::<Vec<_>>();
    assert_eq!(names, expected);
}

#[tokio::test]
async fn list_prices_carry_no_sold_average() {
    let provider = TcgplayerProvider::sample().expect("bundled fixtures");

    let summary = provider
        .market_summary(&item("swsh4-183"))
        .await
        .expect("bundled item is priced");

    assert_eq!(summary.sold_avg, None);
    assert_eq!(summary.mid, Some(95.5));
    assert_eq!(summary.sample_size, Some(47));
}

#[tokio::test]
async fn sold_listings_carry_no_midpoint() {
    let provider = EbaySoldProvider::sample().expect("bundled fixtures");

    let summary = provider
        .market_summary(&item("swsh4-183"))
        .await
        .expect("bundled item is priced");

    assert_eq!(summary.market, 101.25);
    assert_eq!(summary.sold_avg, Some(101.25));
    assert_eq!(summary.mid, None);
    assert_eq!(summary.low, Some(85.0));
    assert_eq!(summary.high, Some(125.0));
}

#[tokio::test]
async fn unknown_items_are_served_the_default_record() {
    let key = item("xy7-999");

    for provider in providers() {
        let summary = provider
            .market_summary(&key)
            .await
            .expect("default record answers");

        assert!(summary.market > 0.0, "{}", provider.name());
    }
}

#[tokio::test]
async fn item_keys_are_case_insensitive() {
    let provider = TcgplayerProvider::sample().expect("bundled fixtures");

    let lower = provider
        .market_summary(&item("swsh4-183"))
        .await
        .expect("lowercase key");
    let upper = provider
        .market_summary(&item("SWSH4-183"))
        .await
        .expect("uppercase key");

    assert_eq!(lower.market, upper.market);
    assert_eq!(lower.sample_size, upper.sample_size);
}

#[tokio::test]
async fn empty_books_report_not_found() {
    let tcgplayer = TcgplayerProvider::new(Arc::new(FixtureFeed::new(
        "tcgplayer",
        FixtureBook::default(),
    )));
    let ebay = EbaySoldProvider::new(Arc::new(FixtureFeed::new("ebay", FixtureBook::default())));
    let key = item("base1-4");

    for provider in [&tcgplayer as &dyn PricingProvider, &ebay] {
        let err = provider.market_summary(&key).await.expect_err("must fail");

        assert_eq!(err.kind(), SourceErrorKind::NotFound, "{}", provider.name());
        assert!(!err.retryable());
    }
}

#[tokio::test(start_paused = true)]
async fn simulated_latency_delays_the_answer() {
    let provider = EbaySoldProvider::sample_with_latency().expect("bundled fixtures");
    let started = tokio::time::Instant::now();

    provider
        .market_summary(&item("base1-4"))
        .await
        .expect("bundled item is priced");

    assert!(started.elapsed() >= dealscope_core::EBAY_SAMPLE_LATENCY);
}
