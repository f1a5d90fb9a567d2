use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rating::UserRating;

/// One entry in the watched collection.
///
/// Field names match the snapshot format the browser version of the app wrote
/// to local storage, so existing snapshots load unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchedRecord {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(default)]
    pub imdb_rating: Option<f32>,
    /// Runtime in minutes
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub user_rating: Option<UserRating>,
    #[serde(default)]
    pub count_rating_decisions: u32,
    /// When the record was added (absent in older snapshots)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_browser_snapshot() {
        let json = r#"[{
            "imdbID": "tt0133093",
            "title": "The Matrix",
            "year": "1999",
            "poster": "https://img/matrix.jpg",
            "imdbRating": 8.7,
            "runtime": 136,
            "userRating": 9,
            "countRatingDecisions": 2
        }]"#;

        let records: Vec<WatchedRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.imdb_id, "tt0133093");
        assert_eq!(record.runtime, Some(136));
        assert_eq!(record.user_rating.map(UserRating::value), Some(9));
        assert_eq!(record.count_rating_decisions, 2);
        assert!(record.added_at.is_none());
    }

    #[test]
    fn test_serialize_uses_snapshot_field_names() {
        let record = WatchedRecord {
            imdb_id: "tt1".to_string(),
            title: "One".to_string(),
            year: "2001".to_string(),
            poster: None,
            imdb_rating: Some(7.5),
            runtime: Some(100),
            user_rating: UserRating::new(8).ok(),
            count_rating_decisions: 1,
            added_at: None,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["imdbID"], "tt1");
        assert_eq!(value["userRating"], 8);
        assert_eq!(value["countRatingDecisions"], 1);
        assert!(value.get("poster").is_none());
    }
}
