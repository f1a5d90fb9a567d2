pub mod movie;
pub mod rating;
pub mod summary;
pub mod watched;

pub use movie::{normalize_poster, parse_imdb_rating, parse_runtime, MovieDetail, MovieSummary};
pub use rating::{RatingError, UserRating};
pub use summary::WatchedSummary;
pub use watched::WatchedRecord;
