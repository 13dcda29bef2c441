pub mod commands;
pub mod config;
pub mod gateway;
pub mod route;
pub mod session;
pub mod storage;
pub mod util;

use std::sync::Arc;
use tracing::{debug, info};

use gateway::{HttpGateway, MovieGateway};
use session::{SessionReader, SessionStore};
use storage::FileTokenStore;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Session(#[from] session::SessionError),
    #[error(transparent)]
    Gateway(#[from] gateway::GatewayError),
    #[error(transparent)]
    Rating(#[from] gateway::InvalidRating),
    #[error("{0}")]
    Input(String),
}

/// Everything a front end needs: the session and the movie catalog.
pub struct App {
    movies: Arc<dyn MovieGateway>,
    session: SessionStore,
}

impl App {
    pub fn new(config: config::Config) -> Result<Self, ClientError> {
        let gateway = Arc::new(HttpGateway::new(&config)?);
        let tokens = Arc::new(FileTokenStore::new(config.token_path()));

        if config.debug_logs {
            info!("Debug logging enabled");
        }
        debug!(api = %gateway.base_url(), tokens = %tokens.path().display(), "client configured");

        let session = SessionStore::new(gateway.clone(), gateway.clone(), tokens);
        Ok(Self::with_parts(gateway, session))
    }

    pub fn with_parts(movies: Arc<dyn MovieGateway>, session: SessionStore) -> Self {
        Self { movies, session }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn reader(&self) -> SessionReader {
        self.session.reader()
    }

    pub fn movies(&self) -> &dyn MovieGateway {
        self.movies.as_ref()
    }
}

/// Build the client, restore the previous session, then run one command.
pub async fn run(config: config::Config, command: commands::Command) -> Result<(), ClientError> {
    let app = App::new(config)?;

    let mut reader = app.reader();
    let (hydrated, session) = tokio::join!(app.session().hydrate(), reader.ready());
    hydrated?;
    debug!(state = ?session.state(), "session ready");

    commands::execute(&app, command).await
}
