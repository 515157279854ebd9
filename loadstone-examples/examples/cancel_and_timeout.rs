//! Example: timeout and cancellation against a stalled host.
//!
//! A stalled script hits the 80 ms timeout and its element is detached; a
//! stalled fetch is cancelled from another task.
//!
//! Run: `cargo run -p loadstone-examples --example cancel_and_timeout`

use std::sync::Arc;
use std::time::Duration;

use loadstone::host::mock::{ElementSignal, MockDocument, MockFonts, MockTransport};
use loadstone::{LoadOptions, Loader};

#[tokio::main]
async fn main() {
    let document = Arc::new(MockDocument::new());
    document.set_signal("slow.js", ElementSignal::Never);
    let transport = Arc::new(MockTransport::new());
    transport.stall("slow.json");

    let loader = Arc::new(
        Loader::builder()
            .document(document.clone())
            .transport(transport.clone())
            .fonts(Arc::new(MockFonts::new()))
            .build(),
    );

    // Timeout: the timer wins the race and the element is cleaned up.
    let options = LoadOptions::new().with_timeout(Duration::from_millis(80));
    let err = loader.include("slow.js", &options).await.unwrap_err();
    println!("slow.js: {} ({})", err, err.kind().as_str());
    println!("slow.js still attached: {}", document.is_attached("slow.js"));

    // Cancellation: another task severs the pending fetch.
    let pending = tokio::spawn({
        let loader = Arc::clone(&loader);
        async move { loader.include("slow.json", &LoadOptions::new()).await }
    });
    tokio::time::sleep(Duration::from_millis(30)).await;
    loader.cancel_resource("slow.json");

    let err = pending.await.unwrap().unwrap_err();
    println!("slow.json: {} ({})", err, err.kind().as_str());
    println!(
        "slow.json state: {:?}",
        loader.resource_state("slow.json")
    );
}
