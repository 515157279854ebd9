//! Integration tests for cache busting: the busted URL is what the document
//! sees, but the raw URL stays the cache key.

mod init_logging;

use std::sync::Arc;

use loadstone::host::mock::{MockDocument, MockFonts, MockTransport};
use loadstone::{LoadOptions, LoadState, Loader};
use url::Url;

fn loader_with(document: Arc<MockDocument>) -> Loader {
    Loader::builder()
        .document(document)
        .transport(Arc::new(MockTransport::new()))
        .fonts(Arc::new(MockFonts::new()))
        .build()
}

fn local_document() -> Arc<MockDocument> {
    Arc::new(MockDocument::with_origin(
        Url::parse("https://example.com").unwrap(),
    ))
}

#[tokio::test]
async fn busted_url_reaches_the_document() {
    let document = local_document();
    let loader = loader_with(document.clone());
    let options = LoadOptions::new().with_cache_busting(true);

    loader
        .include("https://example.com/app.js", &options)
        .await
        .unwrap();

    let inserted = document.inserted_specs();
    assert_eq!(inserted.len(), 1);
    assert!(inserted[0].url.starts_with("https://example.com/app.js?_="));
}

#[tokio::test]
async fn raw_url_stays_the_cache_key() {
    let document = local_document();
    let loader = loader_with(document.clone());
    let options = LoadOptions::new().with_cache_busting(true);

    loader
        .include("https://example.com/app.js", &options)
        .await
        .unwrap();
    // A second call busts to a different timestamp, but the raw key dedupes.
    loader
        .include("https://example.com/app.js", &options)
        .await
        .unwrap();

    assert_eq!(document.insert_count(&document.inserted_specs()[0].url), 1);
    assert_eq!(document.total_inserts(), 1);
    assert_eq!(
        loader.resource_state("https://example.com/app.js"),
        LoadState::Loaded
    );
}

#[tokio::test]
async fn unload_detaches_the_busted_element() {
    let document = local_document();
    let loader = loader_with(document.clone());
    let options = LoadOptions::new().with_cache_busting(true);

    loader
        .include("https://example.com/app.js", &options)
        .await
        .unwrap();
    let busted = document.inserted_specs()[0].url.clone();
    assert!(document.is_attached(&busted));

    loader.unload_resource("https://example.com/app.js");
    assert!(!document.is_attached(&busted));
    assert_eq!(
        loader.resource_state("https://example.com/app.js"),
        LoadState::Unloaded
    );
}

#[tokio::test]
async fn cross_origin_urls_are_not_busted_by_default() {
    let document = local_document();
    let loader = loader_with(document.clone());
    let options = LoadOptions::new().with_cache_busting(true);

    loader
        .include("https://cdn.other.com/lib.js", &options)
        .await
        .unwrap();
    assert_eq!(document.inserted_specs()[0].url, "https://cdn.other.com/lib.js");
}

#[tokio::test]
async fn ineligible_kinds_are_not_busted() {
    let document = local_document();
    let loader = loader_with(document.clone());
    let options = LoadOptions::new().with_cache_busting(true);

    loader
        .include("https://example.com/logo.png", &options)
        .await
        .unwrap();
    assert_eq!(
        document.inserted_specs()[0].url,
        "https://example.com/logo.png"
    );
}
