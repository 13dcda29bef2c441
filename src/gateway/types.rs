use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::util::split_genres;

/// Opaque bearer credential.
///
/// Formatting never reveals the value, so a token can sit inside structs
/// that get logged. Only gateway implementations should call [`Token::expose`].
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw value, for building the `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl User {
    pub fn display_name(&self) -> String {
        [&self.full_name, &self.username, &self.email]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .cloned()
            .unwrap_or_else(|| format!("user #{}", self.id))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    /// Pipe-delimited, e.g. `"Adventure|Children|Fantasy"`.
    #[serde(default)]
    pub genres: String,
    #[serde(default)]
    pub release_year: Option<i32>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}

impl Movie {
    pub fn genre_list(&self) -> Vec<String> {
        split_genres(&self.genres)
    }
}

/// Query for `GET /movies/`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MovieFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(rename = "q", skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingCreate {
    pub movie_id: i64,
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Rating must be between 1 and 5 stars, got {0}")]
pub struct InvalidRating(pub i64);

impl RatingCreate {
    pub fn new(movie_id: i64, stars: i64) -> Result<Self, InvalidRating> {
        if !(1..=5).contains(&stars) {
            return Err(InvalidRating(stars));
        }
        Ok(Self {
            movie_id,
            rating: stars as u8,
            timestamp: Some(chrono::Utc::now().timestamp()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Rating {
    pub id: i64,
    pub user_id: i64,
    pub movie_id: i64,
    pub rating: u8,
    #[serde(default)]
    pub timestamp: Option<i64>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub preferred_genres: Vec<String>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl Preferences {
    pub fn is_empty(&self) -> bool {
        self.preferred_genres.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PreferencesUpdate<'a> {
    pub preferred_genres: &'a [String],
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Prediction {
    pub movie_id: i64,
    pub predicted_rating: f64,
    #[serde(default)]
    pub confidence: Option<f64>,
}
