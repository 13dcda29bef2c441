//! Navigation model for the front end: the page set, and where to go after
//! signing in.

use std::fmt;

use crate::session::PreferenceGate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Search { query: Option<String> },
    Movie { id: i64 },
    Login { return_to: Option<String> },
    Register,
    NotFound(String),
}

impl Route {
    pub fn home() -> Self {
        Route::Search { query: None }
    }

    pub fn parse(path: &str) -> Self {
        let (path, query) = match path.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (path, None),
        };
        let param = |name: &str| query.and_then(|q| query_param(q, name));

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Route::Search { query: param("q") },
            ["movie", id] => match id.parse::<i64>() {
                Ok(id) => Route::Movie { id },
                Err(_) => Route::NotFound(path.to_string()),
            },
            ["login"] => Route::Login {
                return_to: param("return_to"),
            },
            ["register"] => Route::Register,
            _ => Route::NotFound(path.to_string()),
        }
    }

    pub fn to_path(&self) -> String {
        match self {
            Route::Search { query: None } => "/".to_string(),
            Route::Search { query: Some(q) } => format!("/?q={}", urlencoding::encode(q)),
            Route::Movie { id } => format!("/movie/{}", id),
            Route::Login { return_to: None } => "/login".to_string(),
            Route::Login { return_to: Some(r) } => format!("/login?return_to={}", urlencoding::encode(r)),
            Route::Register => "/register".to_string(),
            Route::NotFound(path) => path.clone(),
        }
    }

    /// Pages that make no sense to return to once signed in.
    fn is_auth_page(&self) -> bool {
        matches!(self, Route::Login { .. } | Route::Register)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path())
    }
}

fn query_param(query: &str, name: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .and_then(|(_, value)| urlencoding::decode(&value.replace('+', " ")).ok().map(|v| v.into_owned()))
        .filter(|v| !v.is_empty())
}

/// Where the user lands after a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Ask for genre preferences first, then continue to `then`.
    PromptPreferences { then: Route },
    Navigate(Route),
}

impl Destination {
    pub fn route(&self) -> &Route {
        match self {
            Destination::PromptPreferences { then } => then,
            Destination::Navigate(route) => route,
        }
    }
}

/// Decide the post-login destination from an explicit return path and the
/// preference gate. Only in-app paths are honoured; anything else, or a
/// return to the login/register pages, goes home.
pub fn after_login(return_to: Option<&str>, gate: PreferenceGate) -> Destination {
    let target = return_to
        .filter(|p| p.starts_with('/') && !p.starts_with("//") && !p.starts_with("/\\"))
        .map(Route::parse)
        .filter(|r| !r.is_auth_page())
        .unwrap_or_else(Route::home);

    match gate {
        PreferenceGate::Required => Destination::PromptPreferences { then: target },
        _ => Destination::Navigate(target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_routes() {
        assert_eq!(Route::parse("/"), Route::home());
        assert_eq!(
            Route::parse("/?q=star%20wars"),
            Route::Search { query: Some("star wars".to_string()) }
        );
        assert_eq!(Route::parse("/movie/42"), Route::Movie { id: 42 });
        assert_eq!(Route::parse("/movie/abc"), Route::NotFound("/movie/abc".to_string()));
        assert_eq!(
            Route::parse("/login?return_to=%2Fmovie%2F42"),
            Route::Login { return_to: Some("/movie/42".to_string()) }
        );
        assert_eq!(Route::parse("/register"), Route::Register);
        assert_eq!(Route::parse("/nope"), Route::NotFound("/nope".to_string()));
    }

    #[test]
    fn test_paths() {
        let route = Route::Search { query: Some("toy story".to_string()) };
        assert_eq!(route.to_path(), "/?q=toy%20story");
        assert_eq!(Route::parse(&route.to_path()), route);

        let login = Route::Login { return_to: Some("/movie/7".to_string()) };
        assert_eq!(Route::parse(&login.to_path()), login);
    }

    #[test]
    fn test_after_login_return_to() {
        assert_eq!(
            after_login(Some("/movie/42"), PreferenceGate::Satisfied),
            Destination::Navigate(Route::Movie { id: 42 })
        );
        assert_eq!(
            after_login(None, PreferenceGate::Satisfied),
            Destination::Navigate(Route::home())
        );
    }

    #[test]
    fn test_after_login_keeps_return_path_when_prompting() {
        assert_eq!(
            after_login(Some("/movie/42"), PreferenceGate::Required),
            Destination::PromptPreferences { then: Route::Movie { id: 42 } }
        );
    }

    #[test]
    fn test_after_login_rejects_foreign_paths() {
        assert_eq!(after_login(Some("https://evil.example"), PreferenceGate::Satisfied).route(), &Route::home());
        assert_eq!(after_login(Some("//evil.example"), PreferenceGate::Satisfied).route(), &Route::home());
        assert_eq!(after_login(Some("/\\evil.example"), PreferenceGate::Satisfied).route(), &Route::home());
        assert_eq!(after_login(Some("/login"), PreferenceGate::Satisfied).route(), &Route::home());
    }
}
