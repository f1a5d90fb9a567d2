use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RatingError {
    #[error("rating must be between 1 and 10, got {0}")]
    OutOfRange(u8),
}

/// A personal star rating on a 1-10 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct UserRating(u8);

impl UserRating {
    pub fn new(value: u8) -> Result<Self, RatingError> {
        if (MIN_RATING..=MAX_RATING).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RatingError::OutOfRange(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for UserRating {
    type Error = RatingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserRating> for u8 {
    fn from(rating: UserRating) -> Self {
        rating.0
    }
}

impl fmt::Display for UserRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_rating_bounds() {
        assert!(UserRating::new(1).is_ok());
        assert!(UserRating::new(10).is_ok());
        assert_eq!(UserRating::new(0), Err(RatingError::OutOfRange(0)));
        assert_eq!(UserRating::new(11), Err(RatingError::OutOfRange(11)));
    }

    #[test]
    fn test_user_rating_deserialize_rejects_out_of_range() {
        let ok: UserRating = serde_json::from_str("7").unwrap();
        assert_eq!(ok.value(), 7);
        assert!(serde_json::from_str::<UserRating>("42").is_err());
    }
}
