pub mod movie;
pub mod profile;
pub mod rating;
pub mod tmdb;

pub use movie::{CatalogEntry, Movie, MovieResponse, NewMovie};
pub use profile::{TasteProfile, UserProfile};
pub use rating::Rating;
