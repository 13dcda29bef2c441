//! Command-line front end. Each command reads the session through the
//! app's reader and calls store or gateway operations.

use std::io::{BufRead, IsTerminal, Write};

use clap::Subcommand;
use tracing::warn;

use crate::gateway::{Movie, MovieFilter, Preferences, Rating, RatingCreate};
use crate::route::{after_login, Destination, Route};
use crate::session::{PreferenceGate, RegistrationForm};
use crate::{App, ClientError};

const DEFAULT_SEARCH_LIMIT: u32 = 50;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and remember the session
    Login {
        username: String,
        #[arg(long, env = "MOVIEREC_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Page to open after signing in, e.g. /movie/42
        #[arg(long)]
        return_to: Option<String>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Create an account
    Register {
        email: String,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long, env = "MOVIEREC_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Search the catalog by title
    Search {
        query: String,
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Browse the catalog
    List {
        #[arg(long)]
        genre: Option<String>,
        #[arg(short, long)]
        query: Option<String>,
        #[arg(short, long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
    },
    /// Show movie details
    Show { id: i64 },
    /// Rate a movie from 1 to 5 stars
    Rate { id: i64, stars: i64 },
    /// List your ratings
    Ratings,
    /// Recommended movies: personal when signed in, popular otherwise
    Recommend {
        /// Popular movies even when signed in
        #[arg(long)]
        global: bool,
        /// Movies similar to this one
        #[arg(long, conflicts_with = "global")]
        similar: Option<i64>,
        #[arg(short, default_value_t = 10)]
        n: u32,
    },
    /// List every genre in the catalog
    Genres,
    /// Show or change your genre preferences
    Prefs {
        #[command(subcommand)]
        action: Option<PrefsAction>,
    },
    /// Open an app path such as /movie/42 or /?q=alien
    Open { path: String },
}

#[derive(Subcommand, Debug)]
pub enum PrefsAction {
    Show,
    Set { genres: Vec<String> },
}

pub async fn execute(app: &App, command: Command) -> Result<(), ClientError> {
    match command {
        Command::Login {
            username,
            password,
            return_to,
        } => login(app, &username, password, return_to.as_deref()).await,
        Command::Logout => logout(app).await,
        Command::Whoami => whoami(app),
        Command::Register {
            email,
            full_name,
            password,
        } => register(app, email, full_name, password).await,
        Command::Search { query, limit } => search(app, &query, limit).await,
        Command::List {
            genre,
            query,
            limit,
            offset,
        } => {
            let filter = MovieFilter {
                genre,
                query,
                limit,
                offset,
            };
            let movies = app.movies().list(&filter).await?;
            print_movies(&movies);
            Ok(())
        }
        Command::Show { id } => show(app, id).await,
        Command::Rate { id, stars } => rate(app, id, stars).await,
        Command::Ratings => ratings(app).await,
        Command::Recommend { global, similar, n } => recommend(app, global, similar, n).await,
        Command::Genres => {
            for genre in app.session().available_genres().await? {
                println!("{}", genre);
            }
            Ok(())
        }
        Command::Prefs { action } => match action.unwrap_or(PrefsAction::Show) {
            PrefsAction::Show => show_preferences(app).await,
            PrefsAction::Set { genres } => set_preferences(app, &genres).await,
        },
        Command::Open { path } => open(app, &Route::parse(&path)).await,
    }
}

async fn login(
    app: &App,
    username: &str,
    password: Option<String>,
    return_to: Option<&str>,
) -> Result<(), ClientError> {
    let password = match password {
        Some(p) => p,
        None => prompt("Password: ")?,
    };

    let user = app.session().login(username, &password).await?;
    println!("Logged in as {}", user.display_name());

    // The gate stays unchecked if this fails; the user is simply not prompted.
    if let Err(e) = app.session().refresh_preferences().await {
        warn!(error = %e, "could not load preferences after login");
    }

    let gate = app.reader().current().preference_gate();
    match after_login(return_to, gate) {
        Destination::PromptPreferences { then } => {
            prompt_preferences(app).await?;
            if return_to.is_some() {
                open(app, &then).await?;
            }
        }
        Destination::Navigate(route) => {
            if return_to.is_some() {
                open(app, &route).await?;
            }
        }
    }
    Ok(())
}

async fn logout(app: &App) -> Result<(), ClientError> {
    if !app.reader().is_authenticated() {
        println!("Not logged in");
        return Ok(());
    }
    app.session().logout().await?;
    println!("Logged out");
    Ok(())
}

fn whoami(app: &App) -> Result<(), ClientError> {
    let session = app.reader().current();
    match session.user() {
        Some(user) => {
            println!("{} (id {})", user.display_name(), user.id);
            if let Some(ref email) = user.email {
                println!("email: {}", email);
            }
            match session.preferences() {
                Some(prefs) if !prefs.is_empty() => {
                    println!("genres: {}", prefs.preferred_genres.join(", "))
                }
                _ => println!("genres: none selected"),
            }
        }
        None => println!("Not logged in"),
    }
    Ok(())
}

async fn register(
    app: &App,
    email: String,
    full_name: Option<String>,
    password: Option<String>,
) -> Result<(), ClientError> {
    let (password, confirm_password) = match password {
        Some(p) => (p.clone(), p),
        None => (prompt("Password: ")?, prompt("Confirm password: ")?),
    };

    let form = RegistrationForm {
        email,
        password,
        confirm_password,
        full_name,
    };
    let user = app.session().register(form).await?;
    println!("Registration successful for {}. You can now log in.", user.display_name());
    Ok(())
}

async fn search(app: &App, query: &str, limit: Option<u32>) -> Result<(), ClientError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ClientError::Input("Please enter a search term".to_string()));
    }
    let movies = app
        .movies()
        .search(query, Some(limit.unwrap_or(DEFAULT_SEARCH_LIMIT)))
        .await?;
    if movies.is_empty() {
        println!("No movies found for \"{}\"", query);
    }
    print_movies(&movies);
    Ok(())
}

async fn show(app: &App, id: i64) -> Result<(), ClientError> {
    let movie = app.movies().movie(id).await?;
    print_movie_details(&movie);

    if let Ok(token) = app.session().bearer() {
        match app.movies().my_rating(&token, id).await {
            Ok(Some(rating)) => println!("Your rating: {}", stars(rating.rating)),
            Ok(None) => println!("Your rating: not rated yet"),
            Err(e) => warn!(error = %e, "could not load rating"),
        }
        match app.movies().predict_rating(&token, id).await {
            Ok(Some(p)) => println!("Predicted for you: {:.1}", p.predicted_rating),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "could not load prediction"),
        }
    }

    match app.movies().similar_movies(id, 5).await {
        Ok(similar) if !similar.is_empty() => {
            println!();
            println!("Similar movies:");
            print_movies(&similar);
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "could not load similar movies"),
    }
    Ok(())
}

async fn rate(app: &App, id: i64, stars_given: i64) -> Result<(), ClientError> {
    let token = app.session().bearer()?;
    let rating = RatingCreate::new(id, stars_given)?;
    let saved = app.movies().rate(&token, &rating).await?;
    println!("Rated movie {}: {}", saved.movie_id, stars(saved.rating));
    Ok(())
}

async fn ratings(app: &App) -> Result<(), ClientError> {
    let token = app.session().bearer()?;
    let ratings = app.movies().my_ratings(&token).await?;
    if ratings.is_empty() {
        println!("You have not rated any movies yet");
    }
    for rating in &ratings {
        print_rating(rating);
    }
    Ok(())
}

async fn recommend(app: &App, global: bool, similar: Option<i64>, n: u32) -> Result<(), ClientError> {
    let movies = if let Some(id) = similar {
        app.movies().similar_movies(id, n).await?
    } else {
        match app.session().bearer() {
            Ok(token) if !global => app.movies().user_recommendations(&token, n).await?,
            _ => app.movies().global_recommendations(n).await?,
        }
    };
    print_movies(&movies);
    Ok(())
}

async fn show_preferences(app: &App) -> Result<(), ClientError> {
    match app.session().refresh_preferences().await? {
        Some(prefs) if !prefs.is_empty() => print_preferences(&prefs),
        _ => println!("No genre preferences set"),
    }
    Ok(())
}

async fn set_preferences(app: &App, genres: &[String]) -> Result<(), ClientError> {
    // Accept "Action,Comedy" as well as separate arguments.
    let selection: Vec<&str> = genres.iter().flat_map(|g| g.split(',')).collect();

    let available = app.session().available_genres().await?;
    if let Some(unknown) = selection
        .iter()
        .map(|g| g.trim())
        .find(|g| !g.is_empty() && !available.iter().any(|a| a == g))
    {
        return Err(ClientError::Input(format!("Unknown genre: {}", unknown)));
    }

    let saved = app.session().save_preferences(&selection).await?;
    println!("Preferences saved successfully!");
    print_preferences(&saved);
    Ok(())
}

async fn prompt_preferences(app: &App) -> Result<(), ClientError> {
    let genres = app.session().available_genres().await?;
    println!();
    println!("Pick the genres you like so we can recommend movies:");
    println!("  {}", genres.join(", "));

    if !std::io::stdin().is_terminal() {
        println!("Run `movierec prefs set <genre>...` to choose.");
        return Ok(());
    }

    let line = prompt("Genres (comma separated): ")?;
    let selection: Vec<String> = line.split(',').map(|g| g.trim().to_string()).collect();
    match set_preferences(app, &selection).await {
        Ok(()) => Ok(()),
        Err(e) => {
            println!("{}", e);
            println!("Run `movierec prefs set <genre>...` to try again.");
            Ok(())
        }
    }
}

/// Render an app route.
pub async fn open(app: &App, route: &Route) -> Result<(), ClientError> {
    match route {
        Route::Search { query: Some(q) } => search(app, q, None).await,
        Route::Search { query: None } => {
            let session = app.reader().current();
            if session.preference_gate() == PreferenceGate::Required {
                println!("Tip: run `movierec prefs set <genre>...` for better recommendations.");
            }
            recommend(app, false, None, 10).await
        }
        Route::Movie { id } => show(app, *id).await,
        Route::Login { return_to } => {
            match return_to {
                Some(r) => println!("Run `movierec login <username> --return-to {}`", r),
                None => println!("Run `movierec login <username>`"),
            }
            Ok(())
        }
        Route::Register => {
            println!("Run `movierec register <email>`");
            Ok(())
        }
        Route::NotFound(path) => Err(ClientError::Input(format!("Page not found: {}", path))),
    }
}

fn prompt(label: &str) -> Result<String, ClientError> {
    print!("{}", label);
    std::io::stdout()
        .flush()
        .map_err(|e| ClientError::Input(format!("Failed to write prompt: {}", e)))?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| ClientError::Input(format!("Failed to read input: {}", e)))?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn stars(rating: u8) -> String {
    let filled = rating.min(5) as usize;
    format!("{}{} ({}/5)", "★".repeat(filled), "☆".repeat(5 - filled), rating)
}

fn movie_line(movie: &Movie) -> String {
    let mut line = format!("{:>7}  {}", movie.id, movie.title);
    if let Some(year) = movie.release_year {
        line.push_str(&format!(" ({})", year));
    }
    let genres = movie.genre_list();
    if !genres.is_empty() {
        line.push_str(&format!("  [{}]", genres.join(", ")));
    }
    line
}

fn print_movies(movies: &[Movie]) {
    for movie in movies {
        println!("{}", movie_line(movie));
    }
}

fn print_movie_details(movie: &Movie) {
    match movie.release_year {
        Some(year) => println!("{} ({})", movie.title, year),
        None => println!("{}", movie.title),
    }
    let genres = movie.genre_list();
    if !genres.is_empty() {
        println!("Genres: {}", genres.join(", "));
    }
    if let Some(rating) = movie.rating {
        println!("Rating: {:.1}", rating);
    }
    if let Some(ref overview) = movie.overview {
        println!();
        println!("{}", overview);
    }
}

fn print_rating(rating: &Rating) {
    println!(
        "{:>7}  {}  {}",
        rating.movie_id,
        stars(rating.rating),
        rating.created_at.format("%Y-%m-%d")
    );
}

fn print_preferences(prefs: &Preferences) {
    println!("Preferred genres: {}", prefs.preferred_genres.join(", "));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(genres: &str, year: Option<i32>) -> Movie {
        Movie {
            id: 1,
            title: "Toy Story".to_string(),
            genres: genres.to_string(),
            release_year: year,
            overview: None,
            poster_path: None,
            rating: None,
        }
    }

    #[test]
    fn test_stars() {
        assert_eq!(stars(4), "★★★★☆ (4/5)");
        assert_eq!(stars(1), "★☆☆☆☆ (1/5)");
    }

    #[test]
    fn test_movie_line() {
        assert_eq!(
            movie_line(&movie("Adventure|Animation", Some(1995))),
            "      1  Toy Story (1995)  [Adventure, Animation]"
        );
        assert_eq!(movie_line(&movie("", None)), "      1  Toy Story");
    }
}
