use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinError;

use crate::models::movie::release_year;
use crate::models::tmdb::MovieSummary;
use crate::models::CatalogEntry;
use crate::services::providers::{CatalogResult, CatalogSource};
use crate::services::tags::TagIndex;

/// Entries per catalog section and per search result page
pub const SECTION_LIMIT: usize = 20;

/// Upper bound on concurrent outbound catalog calls
pub const MAX_CONCURRENT_CATALOG_CALLS: usize = 5;

/// Image size segment for listing posters; full records use w500
const LISTING_POSTER_SIZE: &str = "w185";

const DIRECTOR_JOB: &str = "Director";

/// The sectioned catalog landing page
#[derive(Debug, Default, Serialize)]
pub struct CatalogSections {
    pub popular: Vec<CatalogEntry>,
    pub top_rated: Vec<CatalogEntry>,
    pub action: Vec<CatalogEntry>,
    pub comedy: Vec<CatalogEntry>,
    pub drama: Vec<CatalogEntry>,
}

/// How a search query should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    #[default]
    Title,
    Genre,
    Director,
}

/// Catalog browsing and search over the external provider
///
/// Section fetches run concurrently under a bounded permit pool; a failed
/// section or search degrades to an empty list rather than failing the whole
/// response.
#[derive(Clone)]
pub struct CatalogSearchService {
    catalog: Arc<dyn CatalogSource>,
    tags: Arc<TagIndex>,
    image_base_url: String,
    fan_out: Arc<Semaphore>,
}

impl CatalogSearchService {
    pub fn new(catalog: Arc<dyn CatalogSource>, tags: Arc<TagIndex>, image_base_url: String) -> Self {
        Self {
            catalog,
            tags,
            image_base_url,
            fan_out: Arc::new(Semaphore::new(MAX_CONCURRENT_CATALOG_CALLS)),
        }
    }

    /// Fetches all catalog sections concurrently
    pub async fn catalog(&self) -> CatalogSections {
        let popular = {
            let catalog = Arc::clone(&self.catalog);
            let permits = Arc::clone(&self.fan_out);
            tokio::spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                catalog.popular(1).await
            })
        };
        let top_rated = {
            let catalog = Arc::clone(&self.catalog);
            let permits = Arc::clone(&self.fan_out);
            tokio::spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                catalog.top_rated(1).await
            })
        };
        let action = self.spawn_genre_section("Action");
        let comedy = self.spawn_genre_section("Comedy");
        let drama = self.spawn_genre_section("Drama");

        let (popular, top_rated, action, comedy, drama) =
            tokio::join!(popular, top_rated, action, comedy, drama);

        CatalogSections {
            popular: self.section_entries("popular", popular),
            top_rated: self.section_entries("top_rated", top_rated),
            action: self.section_entries("action", action),
            comedy: self.section_entries("comedy", comedy),
            drama: self.section_entries("drama", drama),
        }
    }

    /// Runs one search, dispatching on the query kind
    pub async fn search(&self, query: &str, kind: SearchKind) -> Vec<CatalogEntry> {
        match kind {
            SearchKind::Title => {
                let results = self.catalog.search_title(query, 1).await;
                self.entries_or_empty("title search", results)
            }
            SearchKind::Genre => {
                let Some(genre_id) = self.tags.genre_id_for_name(query) else {
                    return Vec::new();
                };
                let results = self.catalog.discover_by_genres(&[genre_id], 1).await;
                self.entries_or_empty("genre search", results)
            }
            SearchKind::Director => self.search_by_director(query).await,
        }
    }

    /// Person search, then the first match's credits filtered to directing jobs
    async fn search_by_director(&self, name: &str) -> Vec<CatalogEntry> {
        let people = match self.catalog.search_person(name).await {
            Ok(people) => people,
            Err(e) => {
                tracing::warn!(error = %e, "Person search failed");
                return Vec::new();
            }
        };
        // The first result is the provider's most popular match
        let Some(person) = people.first() else {
            return Vec::new();
        };

        let credits = match self.catalog.person_movie_credits(person.id).await {
            Ok(credits) => credits,
            Err(e) => {
                tracing::warn!(person_id = person.id, error = %e, "Credits fetch failed");
                return Vec::new();
            }
        };

        credits
            .iter()
            .filter(|credit| credit.job.as_deref() == Some(DIRECTOR_JOB))
            .filter_map(|credit| self.format_entry(&credit.movie))
            .take(SECTION_LIMIT)
            .collect()
    }

    fn spawn_genre_section(
        &self,
        genre_name: &str,
    ) -> tokio::task::JoinHandle<CatalogResult<Vec<MovieSummary>>> {
        let genre_id = self.tags.genre_id_for_name(genre_name);
        let catalog = Arc::clone(&self.catalog);
        let permits = Arc::clone(&self.fan_out);
        tokio::spawn(async move {
            let Some(genre_id) = genre_id else {
                return Ok(Vec::new());
            };
            let _permit = permits.acquire_owned().await.ok();
            catalog.discover_by_genres(&[genre_id], 1).await
        })
    }

    /// Collects one joined section, degrading failures to an empty list
    fn section_entries(
        &self,
        section: &str,
        joined: Result<CatalogResult<Vec<MovieSummary>>, JoinError>,
    ) -> Vec<CatalogEntry> {
        let summaries = match joined {
            Ok(Ok(results)) => results,
            Ok(Err(e)) => {
                tracing::warn!(section, error = %e, "Catalog section fetch failed");
                Vec::new()
            }
            Err(e) => {
                tracing::error!(section, error = %e, "Catalog section task failed");
                Vec::new()
            }
        };
        self.take_entries(summaries)
    }

    fn entries_or_empty(
        &self,
        context: &str,
        results: CatalogResult<Vec<MovieSummary>>,
    ) -> Vec<CatalogEntry> {
        match results {
            Ok(summaries) => self.take_entries(summaries),
            Err(e) => {
                tracing::warn!(context, error = %e, "Search failed, returning no results");
                Vec::new()
            }
        }
    }

    fn take_entries(&self, summaries: Vec<MovieSummary>) -> Vec<CatalogEntry> {
        summaries
            .iter()
            .filter_map(|summary| self.format_entry(summary))
            .take(SECTION_LIMIT)
            .collect()
    }

    /// Shapes one provider summary for clients
    ///
    /// Entries without an id, a title, or a poster are dropped. Genre ids
    /// resolve through the tag index, falling back to "Unknown".
    fn format_entry(&self, summary: &MovieSummary) -> Option<CatalogEntry> {
        if summary.id == 0 {
            return None;
        }
        let title = summary.title.as_deref()?.trim();
        if title.is_empty() {
            return None;
        }
        let poster_path = summary.poster_path.as_deref()?;
        if poster_path.is_empty() {
            return None;
        }

        let genre = if summary.genre_ids.is_empty() {
            "Unknown".to_string()
        } else {
            summary
                .genre_ids
                .iter()
                .map(|id| {
                    self.tags
                        .genre_name_for_id(*id)
                        .unwrap_or_else(|| "Unknown".to_string())
                })
                .collect::<Vec<_>>()
                .join(", ")
        };

        let year = summary.release_date.as_deref().and_then(release_year);
        let average_rating = (summary.vote_average.unwrap_or(0.0) * 10.0).round() / 10.0;

        Some(CatalogEntry {
            external_id: summary.id,
            title: title.to_string(),
            poster_url: format!("{}/{}{}", self.image_base_url, LISTING_POSTER_SIZE, poster_path),
            genre,
            year,
            average_rating,
        })
    }
}
