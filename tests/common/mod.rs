#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use filmhub_api::models::tmdb::{
    CrewCredit, MovieDetails, MovieSummary, PersonSummary, TagRef,
};
use filmhub_api::models::{Movie, NewMovie, Rating, UserProfile};
use filmhub_api::services::providers::{CatalogError, CatalogResult, CatalogSource};
use filmhub_api::store::{MovieStore, ProfileStore, RatingStore, StoreError, StoreResult};

/// In-memory store standing in for PostgreSQL, enforcing the same uniqueness
/// constraints so conflict paths behave like the real schema
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    movies: Vec<Movie>,
    ratings: Vec<Rating>,
    profiles: Vec<UserProfile>,
    watched: Vec<(i64, i64)>,
    watch_list: Vec<(i64, i64)>,
    recommended: Vec<(i64, i64, i32)>,
    next_movie_id: i64,
    next_rating_id: i64,
    next_profile_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn movie_count(&self) -> usize {
        self.inner.lock().unwrap().movies.len()
    }
}

#[async_trait]
impl MovieStore for MemoryStore {
    async fn find_by_external_id(&self, external_id: i64) -> StoreResult<Option<Movie>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .movies
            .iter()
            .find(|m| m.external_id == external_id)
            .cloned())
    }

    async fn insert(&self, movie: NewMovie) -> StoreResult<Movie> {
        let mut inner = self.inner.lock().unwrap();
        let duplicate = inner.movies.iter().any(|m| {
            m.external_id == movie.external_id
                || (m.title == movie.title
                    && m.description == movie.description
                    && m.genre == movie.genre
                    && m.year == movie.year)
        });
        if duplicate {
            return Err(StoreError::Conflict);
        }

        inner.next_movie_id += 1;
        let created = Movie {
            id: inner.next_movie_id,
            external_id: movie.external_id,
            title: movie.title,
            poster_url: movie.poster_url,
            description: movie.description,
            genre: movie.genre,
            keyword: movie.keyword,
            duration: movie.duration,
            year: movie.year,
        };
        inner.movies.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl RatingStore for MemoryStore {
    async fn find(&self, rating_id: i64) -> StoreResult<Option<Rating>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.ratings.iter().find(|r| r.id == rating_id).cloned())
    }

    async fn ratings_with_movies(&self, user_id: i64) -> StoreResult<Vec<(Rating, Movie)>> {
        let inner = self.inner.lock().unwrap();
        let pairs = inner
            .ratings
            .iter()
            .filter(|r| r.user_id == user_id)
            .filter_map(|r| {
                let movie = inner.movies.iter().find(|m| m.id == r.movie_id)?;
                Some((r.clone(), movie.clone()))
            })
            .collect();
        Ok(pairs)
    }

    async fn rated_external_ids(&self, user_id: i64) -> StoreResult<Vec<i64>> {
        let inner = self.inner.lock().unwrap();
        let ids = inner
            .ratings
            .iter()
            .filter(|r| r.user_id == user_id)
            .filter_map(|r| {
                inner
                    .movies
                    .iter()
                    .find(|m| m.id == r.movie_id)
                    .map(|m| m.external_id)
            })
            .collect();
        Ok(ids)
    }

    async fn insert(
        &self,
        user_id: i64,
        movie_id: i64,
        score: i32,
        comment: &str,
    ) -> StoreResult<Rating> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .ratings
            .iter()
            .any(|r| r.user_id == user_id && r.movie_id == movie_id)
        {
            return Err(StoreError::Conflict);
        }

        inner.next_rating_id += 1;
        let rating = Rating {
            id: inner.next_rating_id,
            user_id,
            movie_id,
            score,
            comment: comment.to_string(),
            created_at: Utc::now(),
        };
        inner.ratings.push(rating.clone());
        Ok(rating)
    }

    async fn update(
        &self,
        rating_id: i64,
        score: i32,
        comment: &str,
    ) -> StoreResult<Option<Rating>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(rating) = inner.ratings.iter_mut().find(|r| r.id == rating_id) else {
            return Ok(None);
        };
        rating.score = score;
        rating.comment = comment.to_string();
        Ok(Some(rating.clone()))
    }

    async fn delete(&self, rating_id: i64) -> StoreResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.ratings.len();
        inner.ratings.retain(|r| r.id != rating_id);
        Ok(inner.ratings.len() < before)
    }

    async fn average_for_movie(&self, movie_id: i64) -> StoreResult<Option<f64>> {
        let inner = self.inner.lock().unwrap();
        let scores: Vec<i32> = inner
            .ratings
            .iter()
            .filter(|r| r.movie_id == movie_id)
            .map(|r| r.score)
            .collect();
        if scores.is_empty() {
            return Ok(None);
        }
        Ok(Some(
            scores.iter().sum::<i32>() as f64 / scores.len() as f64,
        ))
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_or_create(&self, user_id: i64) -> StoreResult<UserProfile> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(profile) = inner.profiles.iter().find(|p| p.user_id == user_id) {
            return Ok(profile.clone());
        }
        inner.next_profile_id += 1;
        let profile = UserProfile {
            id: inner.next_profile_id,
            user_id,
        };
        inner.profiles.push(profile.clone());
        Ok(profile)
    }

    async fn watched_external_ids(&self, profile_id: i64) -> StoreResult<Vec<i64>> {
        let inner = self.inner.lock().unwrap();
        Ok(external_ids(&inner, &inner.watched, profile_id))
    }

    async fn watch_list_external_ids(&self, profile_id: i64) -> StoreResult<Vec<i64>> {
        let inner = self.inner.lock().unwrap();
        Ok(external_ids(&inner, &inner.watch_list, profile_id))
    }

    async fn watched_movies(&self, profile_id: i64) -> StoreResult<Vec<Movie>> {
        let inner = self.inner.lock().unwrap();
        Ok(movies_of(&inner, &inner.watched, profile_id))
    }

    async fn watch_list_movies(&self, profile_id: i64) -> StoreResult<Vec<Movie>> {
        let inner = self.inner.lock().unwrap();
        Ok(movies_of(&inner, &inner.watch_list, profile_id))
    }

    async fn add_watched(&self, profile_id: i64, movie_id: i64) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.watched.contains(&(profile_id, movie_id)) {
            return Err(StoreError::Conflict);
        }
        inner.watched.push((profile_id, movie_id));
        inner
            .watch_list
            .retain(|entry| *entry != (profile_id, movie_id));
        Ok(())
    }

    async fn remove_watched(&self, profile_id: i64, movie_id: i64) -> StoreResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.watched.len();
        inner.watched.retain(|entry| *entry != (profile_id, movie_id));
        Ok(inner.watched.len() < before)
    }

    async fn add_watch_list(&self, profile_id: i64, movie_id: i64) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.watch_list.contains(&(profile_id, movie_id)) {
            return Err(StoreError::Conflict);
        }
        inner.watch_list.push((profile_id, movie_id));
        Ok(())
    }

    async fn remove_watch_list(&self, profile_id: i64, movie_id: i64) -> StoreResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.watch_list.len();
        inner
            .watch_list
            .retain(|entry| *entry != (profile_id, movie_id));
        Ok(inner.watch_list.len() < before)
    }

    async fn recommended_movies(&self, profile_id: i64) -> StoreResult<Vec<Movie>> {
        let inner = self.inner.lock().unwrap();
        let mut entries: Vec<(i64, i32)> = inner
            .recommended
            .iter()
            .filter(|(pid, _, _)| *pid == profile_id)
            .map(|(_, movie_id, position)| (*movie_id, *position))
            .collect();
        entries.sort_by_key(|(_, position)| *position);
        Ok(entries
            .into_iter()
            .filter_map(|(movie_id, _)| {
                inner.movies.iter().find(|m| m.id == movie_id).cloned()
            })
            .collect())
    }

    async fn replace_recommended(&self, profile_id: i64, movie_ids: &[i64]) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.recommended.retain(|(pid, _, _)| *pid != profile_id);
        for (position, movie_id) in movie_ids.iter().enumerate() {
            inner
                .recommended
                .push((profile_id, *movie_id, position as i32));
        }
        Ok(())
    }
}

fn external_ids(inner: &Inner, entries: &[(i64, i64)], profile_id: i64) -> Vec<i64> {
    entries
        .iter()
        .filter(|(pid, _)| *pid == profile_id)
        .filter_map(|(_, movie_id)| {
            inner
                .movies
                .iter()
                .find(|m| m.id == *movie_id)
                .map(|m| m.external_id)
        })
        .collect()
}

fn movies_of(inner: &Inner, entries: &[(i64, i64)], profile_id: i64) -> Vec<Movie> {
    entries
        .iter()
        .filter(|(pid, _)| *pid == profile_id)
        .filter_map(|(_, movie_id)| inner.movies.iter().find(|m| m.id == *movie_id).cloned())
        .collect()
}

/// Scriptable catalog source with call counters
///
/// Unconfigured listing queries return empty pages; an unconfigured movie
/// detail lookup reports NotFound, like the real provider would.
#[derive(Default)]
pub struct StubCatalog {
    details: Mutex<HashMap<i64, MovieDetails>>,
    keywords: Mutex<HashMap<i64, Vec<TagRef>>>,
    genre_pages: Mutex<HashMap<String, Vec<MovieSummary>>>,
    keyword_pages: Mutex<HashMap<String, Vec<MovieSummary>>>,
    title_pages: Mutex<HashMap<String, Vec<MovieSummary>>>,
    popular_page: Mutex<Vec<MovieSummary>>,
    top_rated_page: Mutex<Vec<MovieSummary>>,
    people: Mutex<Vec<PersonSummary>>,
    credits: Mutex<HashMap<i64, Vec<CrewCredit>>>,
    fail_genre_discover: AtomicBool,
    pub detail_calls: AtomicUsize,
    pub discover_calls: AtomicUsize,
}

fn ids_key(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

impl StubCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_movie(self, details: MovieDetails) -> Self {
        self.details.lock().unwrap().insert(details.id, details);
        self
    }

    pub fn with_keywords(self, external_id: i64, keywords: Vec<TagRef>) -> Self {
        self.keywords.lock().unwrap().insert(external_id, keywords);
        self
    }

    pub fn with_genre_page(self, genre_ids: &[i64], results: Vec<MovieSummary>) -> Self {
        self.genre_pages
            .lock()
            .unwrap()
            .insert(ids_key(genre_ids), results);
        self
    }

    pub fn with_keyword_page(self, keyword_ids: &[i64], results: Vec<MovieSummary>) -> Self {
        self.keyword_pages
            .lock()
            .unwrap()
            .insert(ids_key(keyword_ids), results);
        self
    }

    pub fn with_title_page(self, query: &str, results: Vec<MovieSummary>) -> Self {
        self.title_pages
            .lock()
            .unwrap()
            .insert(query.to_string(), results);
        self
    }

    pub fn with_popular(self, results: Vec<MovieSummary>) -> Self {
        *self.popular_page.lock().unwrap() = results;
        self
    }

    pub fn with_failing_genre_discover(self) -> Self {
        self.fail_genre_discover.store(true, Ordering::SeqCst);
        self
    }
}

#[async_trait]
impl CatalogSource for StubCatalog {
    async fn movie_details(&self, external_id: i64) -> CatalogResult<MovieDetails> {
        // Yield so concurrent materialize callers interleave like real
        // network calls would
        tokio::task::yield_now().await;
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.details
            .lock()
            .unwrap()
            .get(&external_id)
            .cloned()
            .ok_or(CatalogError::NotFound(external_id))
    }

    async fn movie_keywords(&self, external_id: i64) -> CatalogResult<Vec<TagRef>> {
        Ok(self
            .keywords
            .lock()
            .unwrap()
            .get(&external_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn discover_by_genres(
        &self,
        genre_ids: &[i64],
        _page: u32,
    ) -> CatalogResult<Vec<MovieSummary>> {
        self.discover_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_genre_discover.load(Ordering::SeqCst) {
            return Err(CatalogError::Transient("connection timed out".to_string()));
        }
        Ok(self
            .genre_pages
            .lock()
            .unwrap()
            .get(&ids_key(genre_ids))
            .cloned()
            .unwrap_or_default())
    }

    async fn discover_by_keywords(
        &self,
        keyword_ids: &[i64],
        _page: u32,
    ) -> CatalogResult<Vec<MovieSummary>> {
        self.discover_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .keyword_pages
            .lock()
            .unwrap()
            .get(&ids_key(keyword_ids))
            .cloned()
            .unwrap_or_default())
    }

    async fn search_title(&self, query: &str, _page: u32) -> CatalogResult<Vec<MovieSummary>> {
        Ok(self
            .title_pages
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default())
    }

    async fn search_person(&self, _name: &str) -> CatalogResult<Vec<PersonSummary>> {
        Ok(self.people.lock().unwrap().clone())
    }

    async fn person_movie_credits(&self, person_id: i64) -> CatalogResult<Vec<CrewCredit>> {
        Ok(self
            .credits
            .lock()
            .unwrap()
            .get(&person_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn popular(&self, _page: u32) -> CatalogResult<Vec<MovieSummary>> {
        Ok(self.popular_page.lock().unwrap().clone())
    }

    async fn top_rated(&self, _page: u32) -> CatalogResult<Vec<MovieSummary>> {
        Ok(self.top_rated_page.lock().unwrap().clone())
    }
}

// Fixture builders

pub fn details(external_id: i64, title: &str, genres: &[(i64, &str)]) -> MovieDetails {
    MovieDetails {
        id: external_id,
        title: Some(title.to_string()),
        overview: Some(format!("Overview of {}", title)),
        release_date: Some("2014-11-05".to_string()),
        runtime: Some(120),
        poster_path: Some(format!("/{}.jpg", external_id)),
        genres: genres
            .iter()
            .map(|(id, name)| TagRef {
                id: *id,
                name: name.to_string(),
            })
            .collect(),
    }
}

pub fn summary(external_id: i64, title: &str, genre_ids: &[i64]) -> MovieSummary {
    MovieSummary {
        id: external_id,
        title: Some(title.to_string()),
        poster_path: Some(format!("/{}.jpg", external_id)),
        genre_ids: genre_ids.to_vec(),
        release_date: Some("2014-11-05".to_string()),
        vote_average: Some(7.5),
    }
}
