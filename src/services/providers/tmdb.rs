/// TMDB catalog provider
///
/// Thin HTTP client over the TMDB v3 API. Only the endpoints the core
/// consumes are wrapped: movie details, keywords, discover, title/person
/// search, credits, and the popular/top-rated listings.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

use crate::models::tmdb::{
    CreditsResponse, CrewCredit, KeywordsResponse, ListingPage, MovieDetails, MovieSummary,
    PersonPage, PersonSummary, TagRef,
};

use super::{CatalogError, CatalogResult, CatalogSource};

/// Per-call timeout; expiry is reported as a `Transient` failure
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct TmdbCatalog {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbCatalog {
    pub fn new(api_key: String, api_url: String) -> anyhow::Result<Self> {
        let http_client = HttpClient::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http_client,
            api_key,
            api_url,
        })
    }

    /// Issues one GET and normalizes failures into the catalog taxonomy
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> CatalogResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| CatalogError::Transient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(path = %path, status = %status, "Catalog request failed");
            return Err(CatalogError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<T>().await.map_err(|e| CatalogError::Provider {
            status: status.as_u16(),
            body: format!("invalid response body: {}", e),
        })
    }

    fn join_ids(ids: &[i64]) -> String {
        ids.iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// One page of /discover/movie with the given attribute filter
    async fn discover(&self, filter: (&str, String), page: u32) -> CatalogResult<Vec<MovieSummary>> {
        let params = [
            filter,
            ("sort_by", "popularity.desc".to_string()),
            ("page", page.to_string()),
        ];
        let listing: ListingPage = self.get_json("/discover/movie", &params).await?;
        Ok(listing.results)
    }

    /// One page of a plain listing endpoint (popular, top rated)
    async fn listing(&self, path: &str, page: u32) -> CatalogResult<Vec<MovieSummary>> {
        let params = [("page", page.to_string())];
        let listing: ListingPage = self.get_json(path, &params).await?;
        Ok(listing.results)
    }
}

#[async_trait]
impl CatalogSource for TmdbCatalog {
    async fn movie_details(&self, external_id: i64) -> CatalogResult<MovieDetails> {
        let path = format!("/movie/{}", external_id);
        match self.get_json::<MovieDetails>(&path, &[]).await {
            Err(CatalogError::Provider { status: 404, .. }) => {
                Err(CatalogError::NotFound(external_id))
            }
            other => other,
        }
    }

    async fn movie_keywords(&self, external_id: i64) -> CatalogResult<Vec<TagRef>> {
        let path = format!("/movie/{}/keywords", external_id);
        let response: KeywordsResponse = self.get_json(&path, &[]).await?;
        Ok(response.keywords)
    }

    async fn discover_by_genres(
        &self,
        genre_ids: &[i64],
        page: u32,
    ) -> CatalogResult<Vec<MovieSummary>> {
        self.discover(("with_genres", Self::join_ids(genre_ids)), page)
            .await
    }

    async fn discover_by_keywords(
        &self,
        keyword_ids: &[i64],
        page: u32,
    ) -> CatalogResult<Vec<MovieSummary>> {
        self.discover(("with_keywords", Self::join_ids(keyword_ids)), page)
            .await
    }

    async fn search_title(&self, query: &str, page: u32) -> CatalogResult<Vec<MovieSummary>> {
        let params = [
            ("query", query.to_string()),
            ("page", page.to_string()),
        ];
        let listing: ListingPage = self.get_json("/search/movie", &params).await?;
        Ok(listing.results)
    }

    async fn search_person(&self, name: &str) -> CatalogResult<Vec<PersonSummary>> {
        let params = [("query", name.to_string()), ("page", "1".to_string())];
        let page: PersonPage = self.get_json("/search/person", &params).await?;
        Ok(page.results)
    }

    async fn person_movie_credits(&self, person_id: i64) -> CatalogResult<Vec<CrewCredit>> {
        let path = format!("/person/{}/movie_credits", person_id);
        let response: CreditsResponse = self.get_json(&path, &[]).await?;
        Ok(response.crew)
    }

    async fn popular(&self, page: u32) -> CatalogResult<Vec<MovieSummary>> {
        self.listing("/movie/popular", page).await
    }

    async fn top_rated(&self, page: u32) -> CatalogResult<Vec<MovieSummary>> {
        self.listing("/movie/top_rated", page).await
    }
}
