pub mod error;
pub mod http;
pub mod types;

pub use error::{ErrorKind, GatewayError, GatewayResult};
pub use http::HttpGateway;
pub use types::*;

use async_trait::async_trait;

#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> GatewayResult<LoginResponse>;
    async fn current_user(&self, token: &Token) -> GatewayResult<User>;
    async fn logout(&self, token: &Token) -> GatewayResult<()>;
    async fn register(&self, registration: &Registration) -> GatewayResult<User>;
}

#[async_trait]
pub trait PreferencesGateway: Send + Sync {
    /// Raw pipe-delimited genre strings as stored in the catalog.
    async fn genres(&self) -> GatewayResult<Vec<String>>;
    async fn preferences(&self, token: &Token) -> GatewayResult<Preferences>;
    async fn create_preferences(&self, token: &Token, genres: &[String]) -> GatewayResult<Preferences>;
    async fn update_preferences(&self, token: &Token, genres: &[String]) -> GatewayResult<Preferences>;
}

#[async_trait]
pub trait MovieGateway: Send + Sync {
    async fn search(&self, query: &str, limit: Option<u32>) -> GatewayResult<Vec<Movie>>;
    async fn list(&self, filter: &MovieFilter) -> GatewayResult<Vec<Movie>>;
    async fn movie(&self, id: i64) -> GatewayResult<Movie>;
    async fn rate(&self, token: &Token, rating: &RatingCreate) -> GatewayResult<Rating>;
    async fn my_ratings(&self, token: &Token) -> GatewayResult<Vec<Rating>>;
    async fn my_rating(&self, token: &Token, movie_id: i64) -> GatewayResult<Option<Rating>>;
    async fn global_recommendations(&self, n: u32) -> GatewayResult<Vec<Movie>>;
    async fn user_recommendations(&self, token: &Token, n: u32) -> GatewayResult<Vec<Movie>>;
    async fn similar_movies(&self, movie_id: i64, n: u32) -> GatewayResult<Vec<Movie>>;
    async fn predict_rating(&self, token: &Token, movie_id: i64) -> GatewayResult<Option<Prediction>>;
}
