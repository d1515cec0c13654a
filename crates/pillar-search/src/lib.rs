pub mod controller;
pub mod error;
pub mod events;
pub mod facets;
pub mod multi;
pub mod response;
pub mod state;
pub mod transport;
pub mod types;
pub mod urlsync;

pub use controller::SearchController;
pub use error::SearchError;
pub use events::{ListenerRegistry, SearchEvent, SearchListener, SearchNotification};
pub use facets::{by_count_desc, by_value, entries_for, refined_first, FacetEntry};
pub use multi::{GroupResult, MultiSearch, ParamsGroup, SearchFacade};
pub use response::normalize;
pub use state::SearchState;
pub use transport::{HttpTransport, SearchTransport};
pub use types::{FacetBucket, HitDoc, SearchResult};

/// Initialize structured JSON logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    fmt()
        .json()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}
