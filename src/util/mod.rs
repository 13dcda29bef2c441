mod genres;

pub use genres::{flatten_genres, normalize_selection, split_genres};
