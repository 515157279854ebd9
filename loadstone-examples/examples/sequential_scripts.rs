//! Example: sequential script loading against a mock document tree.
//!
//! Loads a library and a plugin strictly in order, shows that repeated
//! includes dedupe, then unloads and reloads the library.
//!
//! Run: `cargo run -p loadstone-examples --example sequential_scripts`

use std::sync::Arc;
use std::time::Duration;

use loadstone::host::mock::{ElementSignal, MockDocument, MockFonts, MockTransport};
use loadstone::{LoadOptions, LoadState, Loader};

#[tokio::main]
async fn main() {
    let document = Arc::new(MockDocument::new());
    document.set_signal(
        "https://cdn.example.com/lib.js",
        ElementSignal::Load(Duration::from_millis(120)),
    );
    document.set_signal(
        "https://cdn.example.com/plugin.js",
        ElementSignal::Load(Duration::from_millis(40)),
    );

    let loader = Loader::builder()
        .document(document.clone())
        .transport(Arc::new(MockTransport::new()))
        .fonts(Arc::new(MockFonts::new()))
        .build();

    let urls = [
        "https://cdn.example.com/lib.js",
        "https://cdn.example.com/plugin.js",
    ];
    let outcomes = loader.include(urls, &LoadOptions::new()).await.unwrap();
    println!("loaded {} resources in order:", outcomes.len());
    for event in document.events() {
        println!("  {:?}", event);
    }

    // A second include is answered from the cache: no new element.
    loader
        .include("https://cdn.example.com/lib.js", &LoadOptions::new())
        .await
        .unwrap();
    println!(
        "lib.js inserted {} time(s), state {:?}",
        document.insert_count("https://cdn.example.com/lib.js"),
        loader.resource_state("https://cdn.example.com/lib.js"),
    );

    loader.unload_resource("https://cdn.example.com/lib.js");
    assert_eq!(
        loader.resource_state("https://cdn.example.com/lib.js"),
        LoadState::Unloaded
    );
    println!("lib.js unloaded");
}
