use std::collections::BTreeSet;

/// Split a catalog genre string such as `"Adventure|Children|Fantasy"`.
/// Blank segments are dropped and whitespace is trimmed.
pub fn split_genres(genres: &str) -> Vec<String> {
    genres
        .split('|')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(|g| g.to_string())
        .collect()
}

/// Flatten the genre strings returned by the catalog into a sorted list of
/// unique genre names.
pub fn flatten_genres<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let set: BTreeSet<String> = raw
        .iter()
        .flat_map(|s| split_genres(s.as_ref()))
        .collect();
    set.into_iter().collect()
}

/// Trim, dedup and sort a user's genre selection before it is saved.
pub fn normalize_selection<S: AsRef<str>>(selection: &[S]) -> Vec<String> {
    let set: BTreeSet<String> = selection
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect();
    set.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_genres() {
        let raw = vec!["Action|Adventure".to_string(), "Comedy|Action".to_string()];
        assert_eq!(flatten_genres(&raw), vec!["Action", "Adventure", "Comedy"]);
    }

    #[test]
    fn test_flatten_skips_blanks() {
        let raw = ["", "Drama| |Romance", " Drama ", "(no genres listed)"];
        assert_eq!(
            flatten_genres(&raw),
            vec!["(no genres listed)", "Drama", "Romance"]
        );
        assert!(flatten_genres::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_split_genres() {
        assert_eq!(split_genres("Adventure|Children|Fantasy"), vec!["Adventure", "Children", "Fantasy"]);
        assert!(split_genres("").is_empty());
    }

    #[test]
    fn test_normalize_selection() {
        let picked = ["Drama", " Comedy", "Drama", ""];
        assert_eq!(normalize_selection(&picked), vec!["Comedy", "Drama"]);
    }
}
