//! DataForSEO v3 client: authenticated requests, task polling and the
//! [`SeoDataProvider`] trait the analysis pipeline is written against.

pub mod client;
pub mod error;
pub mod normalize;
pub mod poll;
pub mod provider;
pub(crate) mod retry;
pub mod types;

pub use client::DataForSeoClient;
pub use error::DataForSeoError;
pub use poll::{classify_status, poll_for_results, PollOutcome, PollPolicy, TaskStatus};
pub use provider::SeoDataProvider;
pub use types::{
    ApiResponse, CompetitorDomainItem, DomainMetrics, LocationItem, MapsItem, MapsRating,
    OrganicMetrics, SearchVolumeItem, SerpItem, SerpResult, Task,
};
