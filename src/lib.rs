//! AlKetab - natural-language Quran search client
//!
//! Request/response contract for the AlKetab search API and the session
//! state a presentation layer observes.

// Models must be defined first as they're used by everything else
pub mod models;
pub mod normalize;
pub mod client;
pub mod config;
pub mod error;
pub mod highlight;
pub mod session;

pub use error::AlKetabError;
pub use client::{SearchApi, SearchClient};
pub use config::Settings;
pub use models::{NormalizedPage, NormalizedVerse, Pagination, QueryInfo, SortOrder, WordEntry, WordStats};
pub use session::{Outcome, Phase, SearchSession, SessionState};
