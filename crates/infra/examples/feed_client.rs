//! Example: signing in and paging through the global feed
//!
//! Configuration comes from `POSTLINE_*` environment variables or a
//! `postline.toml` next to the working directory.
//!
//! ```bash
//! export POSTLINE_API_URL=http://localhost:8000/api
//! export POSTLINE_EMAIL=ann@example.test POSTLINE_PASSWORD=secret
//! RUST_LOG=postline=debug,info cargo run --example feed_client
//! ```

use anyhow::Context as _;
use postline_core::{FeedKind, FetchOptions, FetchOutcome};
use postline_domain::Credentials;
use postline_infra::{config, init_logging, ClientContext, LogFormat};
use tracing::{info, warn};

const MAX_PAGES: usize = 3;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(LogFormat::Pretty)?;

    let config = config::load()?;
    let context = ClientContext::build(&config)?;

    if !context.session.is_authenticated() {
        let email = std::env::var("POSTLINE_EMAIL").context("POSTLINE_EMAIL is not set")?;
        let password = std::env::var("POSTLINE_PASSWORD").context("POSTLINE_PASSWORD is not set")?;
        context.session.begin_login(&Credentials::new(email, password)).await?;
    }
    info!(user = ?context.session.user().and_then(|u| u.name), "signed in");

    let mut options = FetchOptions::first_page();
    for page in 1..=MAX_PAGES {
        match context.collections.fetch_page("fetch_posts", options).await {
            FetchOutcome::Loaded { added } => info!(page, added, "page loaded"),
            FetchOutcome::Failed(err) => {
                warn!(page, status = err.status(), error = %err, "page failed");
                break;
            }
            other => {
                info!(page, outcome = ?other, "no more pages");
                break;
            }
        }
        options = FetchOptions::next_page();
    }

    let feed = context.collections.collection(FeedKind::Global);
    info!(items = feed.len(), last_page = feed.is_last_page(), "feed ready");

    context.session.logout(true).await;
    Ok(())
}
