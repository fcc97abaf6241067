pub mod catalog_search;
pub mod ingest;
pub mod providers;
pub mod ratings;
pub mod recommend;
pub mod tags;
pub mod taste;
pub mod watch;

pub use catalog_search::{CatalogSearchService, CatalogSections, SearchKind};
pub use ingest::MovieIngestor;
pub use ratings::RatingService;
pub use recommend::RecommendationEngine;
pub use tags::TagIndex;
pub use taste::TasteProfileBuilder;
pub use watch::WatchService;
