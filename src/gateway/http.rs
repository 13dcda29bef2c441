use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::error::{GatewayError, GatewayResult};
use super::types::*;
use super::{AuthGateway, MovieGateway, PreferencesGateway};
use crate::config::{Config, LoginFormat};

/// REST client for the backend. Implements every gateway trait; each call
/// is exactly one request with no retry.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    login_format: LoginFormat,
}

impl HttpGateway {
    pub fn new(config: &Config) -> GatewayResult<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("movierec/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            warn!(error = %e, "failed to build HTTP client");
            GatewayError::network("Failed to initialize HTTP client")
        })?;

        Ok(Self {
            client,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            login_format: config.api.login_format,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, req: RequestBuilder, default_message: &str) -> GatewayResult<reqwest::Response> {
        let request = req.build().map_err(|e| {
            warn!(error = %e, "failed to build request");
            GatewayError::network(default_message)
        })?;

        debug!(method = %request.method(), path = %request.url().path(), "gateway request");

        let response = self.client.execute(request).await.map_err(|e| {
            warn!(error = %e, "gateway request failed");
            GatewayError::network(default_message)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let err = GatewayError::from_response(status.as_u16(), &body, default_message);
            debug!(status = status.as_u16(), message = %err.message, "gateway error response");
            return Err(err);
        }

        Ok(response)
    }

    async fn fetch<T: DeserializeOwned>(&self, req: RequestBuilder, default_message: &str) -> GatewayResult<T> {
        let response = self.send(req, default_message).await?;
        response.json::<T>().await.map_err(|e| {
            warn!(error = %e, "failed to decode gateway response");
            GatewayError::network(default_message)
        })
    }
}

#[async_trait]
impl AuthGateway for HttpGateway {
    async fn login(&self, username: &str, password: &str) -> GatewayResult<LoginResponse> {
        let credentials = LoginRequest { username, password };
        let req = self.client.post(self.url("/auth/login"));
        let req = match self.login_format {
            LoginFormat::Form => req.form(&credentials),
            LoginFormat::Json => req.json(&credentials),
        };
        self.fetch(req, "Failed to login").await
    }

    async fn current_user(&self, token: &Token) -> GatewayResult<User> {
        let req = self.client.get(self.url("/auth/me")).bearer_auth(token.expose());
        self.fetch(req, "Failed to fetch user").await
    }

    async fn logout(&self, token: &Token) -> GatewayResult<()> {
        let req = self.client.post(self.url("/auth/logout")).bearer_auth(token.expose());
        self.send(req, "Failed to logout").await?;
        Ok(())
    }

    async fn register(&self, registration: &Registration) -> GatewayResult<User> {
        let req = self.client.post(self.url("/auth/register")).json(registration);
        self.fetch(req, "Failed to register").await
    }
}

#[async_trait]
impl PreferencesGateway for HttpGateway {
    async fn genres(&self) -> GatewayResult<Vec<String>> {
        let req = self.client.get(self.url("/movies/genres/"));
        let genres: Vec<Option<String>> = self.fetch(req, "Failed to fetch genres").await?;
        Ok(genres.into_iter().flatten().collect())
    }

    async fn preferences(&self, token: &Token) -> GatewayResult<Preferences> {
        let req = self.client.get(self.url("/user_preferences/me")).bearer_auth(token.expose());
        self.fetch(req, "Failed to fetch preferences").await
    }

    async fn create_preferences(&self, token: &Token, genres: &[String]) -> GatewayResult<Preferences> {
        let req = self
            .client
            .post(self.url("/user_preferences"))
            .bearer_auth(token.expose())
            .json(&PreferencesUpdate { preferred_genres: genres });
        self.fetch(req, "Failed to save preferences").await
    }

    async fn update_preferences(&self, token: &Token, genres: &[String]) -> GatewayResult<Preferences> {
        let req = self
            .client
            .put(self.url("/user_preferences"))
            .bearer_auth(token.expose())
            .json(&PreferencesUpdate { preferred_genres: genres });
        self.fetch(req, "Failed to update preferences").await
    }
}

#[async_trait]
impl MovieGateway for HttpGateway {
    async fn search(&self, query: &str, limit: Option<u32>) -> GatewayResult<Vec<Movie>> {
        let mut req = self.client.get(self.url("/movies/search")).query(&[("q", query)]);
        if let Some(limit) = limit {
            req = req.query(&[("limit", limit)]);
        }
        self.fetch(req, "Failed to search movies").await
    }

    async fn list(&self, filter: &MovieFilter) -> GatewayResult<Vec<Movie>> {
        let req = self.client.get(self.url("/movies/")).query(filter);
        self.fetch(req, "Failed to list movies").await
    }

    async fn movie(&self, id: i64) -> GatewayResult<Movie> {
        let req = self.client.get(self.url(&format!("/movies/{}", id)));
        self.fetch(req, "Failed to fetch movie details").await
    }

    async fn rate(&self, token: &Token, rating: &RatingCreate) -> GatewayResult<Rating> {
        let req = self
            .client
            .post(self.url("/ratings/"))
            .bearer_auth(token.expose())
            .json(rating);
        self.fetch(req, "Failed to submit rating").await
    }

    async fn my_ratings(&self, token: &Token) -> GatewayResult<Vec<Rating>> {
        let req = self.client.get(self.url("/ratings/me")).bearer_auth(token.expose());
        self.fetch(req, "Failed to fetch ratings").await
    }

    async fn my_rating(&self, token: &Token, movie_id: i64) -> GatewayResult<Option<Rating>> {
        let req = self
            .client
            .get(self.url(&format!("/ratings/{}/me", movie_id)))
            .bearer_auth(token.expose());
        self.fetch(req, "Failed to fetch rating").await
    }

    async fn global_recommendations(&self, n: u32) -> GatewayResult<Vec<Movie>> {
        let req = self.client.get(self.url("/recommendations/global")).query(&[("n", n)]);
        self.fetch(req, "Failed to fetch recommendations").await
    }

    async fn user_recommendations(&self, token: &Token, n: u32) -> GatewayResult<Vec<Movie>> {
        let req = self
            .client
            .get(self.url("/recommendations/user"))
            .bearer_auth(token.expose())
            .query(&[("n", n)]);
        self.fetch(req, "Failed to fetch recommendations").await
    }

    async fn similar_movies(&self, movie_id: i64, n: u32) -> GatewayResult<Vec<Movie>> {
        let req = self
            .client
            .get(self.url(&format!("/recommendations/movies/{}/similar", movie_id)))
            .query(&[("n", n)]);
        self.fetch(req, "Failed to fetch similar movies").await
    }

    async fn predict_rating(&self, token: &Token, movie_id: i64) -> GatewayResult<Option<Prediction>> {
        let req = self
            .client
            .get(self.url(&format!("/recommendations/movies/{}/predict", movie_id)))
            .bearer_auth(token.expose());
        match self.fetch(req, "Failed to predict rating").await {
            Ok(prediction) => Ok(Some(prediction)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
