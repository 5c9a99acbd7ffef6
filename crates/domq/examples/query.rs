//! Example: query and rewrite a document
//!
//! Run with `RUST_LOG=domq=debug` to see mutation summaries.

use anyhow::Result;
use domq::NodeSet;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let doc = NodeSet::parse(
        r#"<nav><a href="/" class="home">Home</a><a href="/docs">Docs</a><a href="https://example.com">Out</a></nav>"#,
    );
    println!("domq v{}", domq::VERSION);

    let external = doc.find("a[href^=http]")?;
    external.add_class("external")?.set_attr("rel", "noopener")?;
    println!("external links: {}", external.len());

    doc.find("a.home")?.wrap("<strong></strong>")?;
    doc.find("nav")?.append("<a href=\"/about\">About</a>")?;

    for link in doc.find("nav a")?.iter() {
        println!("{:>8} -> {}", link.text()?.unwrap_or_default(), link.attr("href")?.unwrap_or_default());
    }
    println!("{doc}");
    Ok(())
}
