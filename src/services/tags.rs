use std::collections::HashMap;
use std::sync::RwLock;

/// The static TMDB movie genre table, used to seed the index at startup
const STATIC_GENRES: [(i64, &str); 19] = [
    (28, "Action"),
    (12, "Adventure"),
    (16, "Animation"),
    (35, "Comedy"),
    (80, "Crime"),
    (99, "Documentary"),
    (18, "Drama"),
    (10751, "Family"),
    (14, "Fantasy"),
    (36, "History"),
    (27, "Horror"),
    (10402, "Music"),
    (9648, "Mystery"),
    (10749, "Romance"),
    (878, "Science Fiction"),
    (10770, "TV Movie"),
    (53, "Thriller"),
    (10752, "War"),
    (37, "Western"),
];

/// Bidirectional id <-> name mapping for one tag family
///
/// Append-only: entries are recorded as movies are ingested and never
/// invalidated. Name lookup is case-insensitive. Concurrent writers may race
/// to record the same id with the same name; last-write-wins is safe because
/// the value is deterministic per id.
struct NameIndex {
    inner: RwLock<NameIndexInner>,
}

#[derive(Default)]
struct NameIndexInner {
    name_by_id: HashMap<i64, String>,
    id_by_name: HashMap<String, i64>,
}

impl NameIndex {
    fn new() -> Self {
        Self {
            inner: RwLock::new(NameIndexInner::default()),
        }
    }

    fn record(&self, id: i64, name: &str) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.name_by_id.insert(id, name.to_string());
        inner.id_by_name.insert(name.to_lowercase(), id);
    }

    fn id_for_name(&self, name: &str) -> Option<i64> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.id_by_name.get(&name.to_lowercase()).copied()
    }

    fn name_for_id(&self, id: i64) -> Option<String> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.name_by_id.get(&id).cloned()
    }
}

/// Shared genre and keyword reverse-lookup index
///
/// Constructed once at process start and injected wherever name <-> id
/// resolution is needed (taste-profile derivation, name-based search, listing
/// formatting). Grows as movies materialize.
pub struct TagIndex {
    genres: NameIndex,
    keywords: NameIndex,
}

impl TagIndex {
    /// Creates an index seeded with the static genre table
    pub fn seeded() -> Self {
        let index = Self {
            genres: NameIndex::new(),
            keywords: NameIndex::new(),
        };
        for (id, name) in STATIC_GENRES {
            index.genres.record(id, name);
        }
        index
    }

    pub fn record_genre(&self, id: i64, name: &str) {
        self.genres.record(id, name);
    }

    pub fn record_keyword(&self, id: i64, name: &str) {
        self.keywords.record(id, name);
    }

    pub fn genre_id_for_name(&self, name: &str) -> Option<i64> {
        self.genres.id_for_name(name)
    }

    pub fn keyword_id_for_name(&self, name: &str) -> Option<i64> {
        self.keywords.id_for_name(name)
    }

    pub fn genre_name_for_id(&self, id: i64) -> Option<String> {
        self.genres.name_for_id(id)
    }
}
