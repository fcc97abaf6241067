use serde::Deserialize;

/// An {id, name} pair as returned for genres and keywords
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TagRef {
    pub id: i64,
    pub name: String,
}

/// Full movie record from GET /movie/{id}
#[derive(Debug, Clone, Deserialize)]
pub struct MovieDetails {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<i32>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub genres: Vec<TagRef>,
}

/// Response from GET /movie/{id}/keywords
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordsResponse {
    #[serde(default)]
    pub keywords: Vec<TagRef>,
}

/// One entry of a listing page (discover, search, popular, top rated)
///
/// Listing entries carry `genre_ids` instead of the full genre objects of a
/// movie record, and `vote_average` instead of locally aggregated ratings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieSummary {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

/// A `{results: [...]}` listing page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingPage {
    #[serde(default)]
    pub results: Vec<MovieSummary>,
}

/// One entry of a person search page
#[derive(Debug, Clone, Deserialize)]
pub struct PersonSummary {
    pub id: i64,
    pub name: String,
}

/// A `{results: [...]}` person search page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonPage {
    #[serde(default)]
    pub results: Vec<PersonSummary>,
}

/// A crew credit from GET /person/{id}/movie_credits
///
/// The movie fields sit flat beside `job` in the provider payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CrewCredit {
    #[serde(flatten)]
    pub movie: MovieSummary,
    #[serde(default)]
    pub job: Option<String>,
}

/// Response from GET /person/{id}/movie_credits
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreditsResponse {
    #[serde(default)]
    pub crew: Vec<CrewCredit>,
}
