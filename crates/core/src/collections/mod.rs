//! Paginated collections
//!
//! A [`Collection`] is one independently paginated, identity-deduplicated
//! list. [`CollectionStore`] keeps one collection per [`FeedKind`] and runs
//! every fetch through the same merge rules.

mod collection;
mod store;

pub use collection::Collection;
pub use store::{CollectionStore, FeedAction, FeedKind, FetchOptions, FetchOutcome};
