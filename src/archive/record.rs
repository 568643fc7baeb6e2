use crate::archive::keys::DayKey;
use crate::error::KeyError;
use serde::{Deserialize, Serialize};

/// One media item for one calendar date, in its persisted shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: String,
    #[serde(rename = "imgtitle")]
    pub title: String,
    #[serde(rename = "imgdesc", default)]
    pub description: String,
    #[serde(rename = "imgurl")]
    pub image_url: String,
}

impl DailyRecord {
    pub fn day_key(&self) -> Result<DayKey, KeyError> {
        DayKey::from_date_field(&self.date)
    }

    pub fn display_title(&self) -> &str {
        display_title(&self.title)
    }
}

/// Strip the headline prefix from a composite title.
///
/// With a `|` present, the label is everything after the first `|`, trimmed.
/// Without one, the title is returned unchanged.
pub fn display_title(title: &str) -> &str {
    match title.split_once('|') {
        Some((_headline, rest)) => rest.trim(),
        None => title,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_delimiter_strips_headline() {
        assert_eq!(
            display_title("Headline  |  True Title - Credit"),
            "True Title - Credit"
        );
    }

    #[test]
    fn bare_delimiter_strips_headline() {
        assert_eq!(display_title("Headline|Title"), "Title");
    }

    #[test]
    fn only_first_delimiter_splits() {
        assert_eq!(display_title("A | B | C"), "B | C");
    }

    #[test]
    fn title_without_delimiter_is_unchanged() {
        assert_eq!(display_title("  Plain title  "), "  Plain title  ");
        assert_eq!(display_title(""), "");
    }

    #[test]
    fn persisted_field_names_are_stable() {
        let record = DailyRecord {
            date: "2025-01-05".to_string(),
            title: "H  |  T".to_string(),
            description: String::new(),
            image_url: "https://cn.bing.com/th?id=OHR.X_UHD.jpg".to_string(),
        };
        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(value["imgtitle"], "H  |  T");
        assert_eq!(value["imgdesc"], "");
        assert_eq!(value["imgurl"], "https://cn.bing.com/th?id=OHR.X_UHD.jpg");
        assert_eq!(record.day_key().expect("key").as_str(), "20250105");
    }

    #[test]
    fn missing_description_defaults_to_empty() {
        let raw = r#"{"date":"2025-01-05","imgtitle":"t","imgurl":"https://x/y.jpg"}"#;
        let record: DailyRecord = serde_json::from_str(raw).expect("parse");
        assert_eq!(record.description, "");
    }
}
