//! Example: fetching a JSON document over HTTP.
//!
//! Uses the real `HttpTransport`; the document and font hosts stay headless
//! because JSON resources never touch the DOM.
//!
//! Run: `cargo run -p loadstone-examples --example fetch_json`

use std::time::Duration;

use loadstone::{LoadOptions, Loader};

#[tokio::main]
async fn main() {
    // The builder defaults to HttpTransport and the headless hosts.
    let loader = Loader::builder().build();

    let url = "https://unpkg.com/react@18.2.0/package.json";
    let options = LoadOptions::new().with_timeout(Duration::from_secs(15));

    match loader.include(url, &options).await {
        Ok(outcomes) => {
            let value = outcomes[0].json().expect("json outcome");
            println!("name    = {}", value["name"]);
            println!("version = {}", value["version"]);
        }
        Err(e) => eprintln!("error ({}): {}", e.kind().as_str(), e),
    }
}
