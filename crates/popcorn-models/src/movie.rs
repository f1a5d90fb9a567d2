use serde::{Deserialize, Serialize};

/// One row of a search response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieSummary {
    pub imdb_id: String,
    pub title: String,
    pub year: String, // OMDb years are free text ("1999", "2010–2012")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
}

/// Extended record fetched by IMDb ID
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetail {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    pub released: String,
    /// Runtime in minutes, parsed from `runtime_text`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<u32>,
    /// Runtime as the API reports it (e.g. "142 min")
    pub runtime_text: String,
    pub genre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb_rating: Option<f32>,
    pub plot: String,
    pub actors: String,
    pub director: String,
}

/// Parse a free-text duration such as "142 min" into minutes.
///
/// Only the leading number is read; anything unparseable ("N/A", "") yields None.
pub fn parse_runtime(text: &str) -> Option<u32> {
    text.split_whitespace().next()?.parse().ok()
}

/// Parse a critics' rating such as "8.8"; "N/A" and blanks yield None.
pub fn parse_imdb_rating(text: &str) -> Option<f32> {
    text.trim().parse::<f32>().ok().filter(|r| r.is_finite())
}

/// OMDb reports missing posters as the literal "N/A"
pub fn normalize_poster(poster: Option<String>) -> Option<String> {
    poster.filter(|p| !p.is_empty() && p != "N/A")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_runtime() {
        assert_eq!(parse_runtime("142 min"), Some(142));
        assert_eq!(parse_runtime("  90 min "), Some(90));
        assert_eq!(parse_runtime("N/A"), None);
        assert_eq!(parse_runtime(""), None);
    }

    #[test]
    fn test_parse_imdb_rating() {
        assert_eq!(parse_imdb_rating("8.7"), Some(8.7));
        assert_eq!(parse_imdb_rating("N/A"), None);
        assert_eq!(parse_imdb_rating("NaN"), None);
    }

    #[test]
    fn test_normalize_poster() {
        assert_eq!(normalize_poster(Some("N/A".to_string())), None);
        assert_eq!(normalize_poster(None), None);
        assert_eq!(
            normalize_poster(Some("https://img/p.jpg".to_string())),
            Some("https://img/p.jpg".to_string())
        );
    }
}
