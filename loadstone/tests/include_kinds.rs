//! Integration tests for per-kind load protocols through the public surface.

mod init_logging;

use std::sync::Arc;

use loadstone::host::mock::{MockDocument, MockFonts, MockTransport};
use loadstone::{
    CrossOrigin, ElementSpec, ElementTag, ErrorKind, InsertionPoint, LoadOptions, LoadState,
    LoadedResource, Loader, FONT_FAMILY_PLACEHOLDER,
};
use serde_json::json;

struct Harness {
    document: Arc<MockDocument>,
    transport: Arc<MockTransport>,
    fonts: Arc<MockFonts>,
    loader: Loader,
}

fn harness() -> Harness {
    let document = Arc::new(MockDocument::new());
    let transport = Arc::new(MockTransport::new());
    let fonts = Arc::new(MockFonts::new());
    let loader = Loader::builder()
        .document(document.clone())
        .transport(transport.clone())
        .fonts(fonts.clone())
        .build();
    Harness {
        document,
        transport,
        fonts,
        loader,
    }
}

#[tokio::test]
async fn script_attaches_element_and_tracks_state() {
    let h = harness();
    let options = LoadOptions::new()
        .with_attribute("id", "app")
        .with_attribute("bogus", "dropped");

    let outcomes = h.loader.include("app.js", &options).await.unwrap();
    assert_eq!(outcomes, vec![LoadedResource::Element]);
    assert_eq!(h.loader.resource_state("app.js"), LoadState::Loaded);

    let inserted = h.document.inserted_specs();
    assert_eq!(inserted.len(), 1);
    let spec = &inserted[0];
    assert_eq!(spec.tag, ElementTag::Script);
    assert_eq!(spec.url, "app.js");
    // Structural async attribute first, validated ones after; the bogus key
    // was dropped by the validator.
    assert_eq!(spec.attributes[0], ("async".to_string(), "true".to_string()));
    assert!(spec
        .attributes
        .contains(&("id".to_string(), "app".to_string())));
    assert!(!spec.attributes.iter().any(|(k, _)| k == "bogus"));
}

#[tokio::test]
async fn stylesheet_is_a_link_with_rel() {
    let h = harness();
    h.loader.include("theme.css", &LoadOptions::new()).await.unwrap();

    let inserted = h.document.inserted_specs();
    assert_eq!(inserted[0].tag, ElementTag::Link);
    assert_eq!(inserted[0].tag.url_attribute(), "href");
    assert_eq!(
        inserted[0].attributes[0],
        ("rel".to_string(), "stylesheet".to_string())
    );
}

#[tokio::test]
async fn image_is_an_img_element() {
    let h = harness();
    h.loader.include("logo.png", &LoadOptions::new()).await.unwrap();
    assert_eq!(h.document.inserted_specs()[0].tag, ElementTag::Img);
}

#[tokio::test]
async fn script_can_append_to_body() {
    let h = harness();
    let options = LoadOptions::new().with_append_to_body(true);
    h.loader.include("app.js", &options).await.unwrap();
    assert_eq!(
        h.document.inserted_specs()[0].insertion_point,
        InsertionPoint::Body
    );
}

#[tokio::test]
async fn cross_origin_policy_reaches_the_element() {
    let h = harness();
    let options = LoadOptions::new().with_cross_origin(CrossOrigin::Anonymous);
    h.loader.include("app.js", &options).await.unwrap();
    assert_eq!(
        h.document.inserted_specs()[0].cross_origin,
        Some(CrossOrigin::Anonymous)
    );
}

#[tokio::test]
async fn json_document_is_fetched_and_parsed() {
    let h = harness();
    h.transport
        .respond_json("config.json", json!({ "retries": 3 }));

    let outcomes = h.loader.include("config.json", &LoadOptions::new()).await.unwrap();
    let value = outcomes[0].json().unwrap();
    assert_eq!(value["retries"], 3);

    assert_eq!(h.transport.fetch_count("config.json"), 1);
    assert_eq!(h.document.total_inserts(), 0);
    assert_eq!(h.loader.resource_state("config.json"), LoadState::Loaded);
}

#[tokio::test]
async fn malformed_json_is_a_network_failure() {
    let h = harness();
    h.transport.respond("config.json", b"{not json".to_vec());
    let err = h
        .loader
        .include("config.json", &LoadOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NetworkFailure);
}

#[tokio::test]
async fn binary_blob_returns_raw_bytes() {
    let h = harness();
    h.transport.respond("bundle.zip", vec![0x50, 0x4b, 0x03, 0x04]);

    let outcomes = h.loader.include("bundle.zip", &LoadOptions::new()).await.unwrap();
    assert_eq!(outcomes[0].bytes().unwrap(), &[0x50, 0x4b, 0x03, 0x04]);
    assert_eq!(h.document.total_inserts(), 0);
}

#[tokio::test]
async fn font_is_loaded_then_registered() {
    let h = harness();
    let options = LoadOptions::new().with_cross_origin(CrossOrigin::UseCredentials);
    let outcomes = h.loader.include("brand.woff2", &options).await.unwrap();
    assert_eq!(outcomes, vec![LoadedResource::Font]);

    let faces = h.fonts.loaded_faces();
    assert_eq!(faces.len(), 1);
    assert_eq!(faces[0].family, FONT_FAMILY_PLACEHOLDER);
    assert_eq!(faces[0].source_url, "brand.woff2");
    assert_eq!(faces[0].cross_origin, Some(CrossOrigin::UseCredentials));
    assert_eq!(h.fonts.registered_count(), 1);
    assert_eq!(h.document.total_inserts(), 0);
}

#[tokio::test]
async fn font_failure_is_categorized() {
    let h = harness();
    h.fonts.fail("brand.woff2", "no such face");
    let err = h
        .loader
        .include("brand.woff2", &LoadOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NetworkFailure);
    assert_eq!(h.fonts.registered_count(), 0);
}

#[tokio::test]
async fn unsupported_extension_touches_no_collaborator() {
    let h = harness();
    let err = h
        .loader
        .include("notes.txt", &LoadOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedType);
    assert!(err.to_string().contains("notes.txt"));

    assert_eq!(h.document.total_inserts(), 0);
    assert_eq!(h.transport.total_fetches(), 0);
    assert_eq!(h.loader.resource_state("notes.txt"), LoadState::Unloaded);
}

#[tokio::test]
async fn already_attached_element_short_circuits() {
    let h = harness();
    h.document.attach_existing(ElementSpec {
        tag: ElementTag::Script,
        url: "present.js".to_string(),
        attributes: Vec::new(),
        insertion_point: InsertionPoint::Head,
        cross_origin: None,
    });

    let outcomes = h.loader.include("present.js", &LoadOptions::new()).await.unwrap();
    assert_eq!(outcomes, vec![LoadedResource::AlreadyPresent]);
    assert_eq!(h.document.insert_count("present.js"), 0);
    assert_eq!(h.loader.resource_state("present.js"), LoadState::Loaded);
}

#[tokio::test]
async fn element_error_signal_is_a_network_failure() {
    let h = harness();
    h.document.set_signal(
        "broken.js",
        loadstone::host::mock::ElementSignal::Error(std::time::Duration::ZERO),
    );
    let err = h
        .loader
        .include("broken.js", &LoadOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NetworkFailure);
    // The element's own error signal does not detach it; only timeout,
    // cancellation, and unload do.
    assert!(h.document.is_attached("broken.js"));
}
