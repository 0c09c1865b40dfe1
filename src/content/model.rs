use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A public figure's profile document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicFigure {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub name_kr: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub nationality: String,
    #[serde(default)]
    pub occupation: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub is_group: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
}

/// Payload of `GET /api/public-figure-content/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicFigureContent {
    pub main_overview: MainOverview,
    pub timeline_content: TimelineContent,
}

/// The introductory block shown above the timeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainOverview {
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "articleIds", default)]
    pub article_ids: Vec<String>,
}

/// Versioned timeline payload.
///
/// Serialized as `{"schema_version": "...", "data": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "schema_version", content = "data")]
pub enum TimelineContent {
    #[serde(rename = "v1_legacy")]
    Legacy(LegacyTimeline),
    #[serde(rename = "v2_curated")]
    Curated(CuratedTimeline),
}

impl TimelineContent {
    #[must_use]
    pub fn schema_version(&self) -> &'static str {
        match self {
            Self::Legacy(_) => "v1_legacy",
            Self::Curated(_) => "v2_curated",
        }
    }
}

/// Flat per-category wiki blocks (schema `v1_legacy`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyTimeline {
    #[serde(rename = "categoryContent", default)]
    pub category_content: Vec<WikiContentItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiContentItem {
    pub id: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "articleIds", default)]
    pub article_ids: Vec<String>,
}

/// Nested `main category -> sub category -> events` mapping (schema `v2_curated`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CuratedTimeline {
    pub categories: BTreeMap<String, BTreeMap<String, Vec<CuratedEvent>>>,
}

impl CuratedTimeline {
    /// Events filed under `main` / `sub`, or an empty slice.
    #[must_use]
    pub fn events(&self, main: &str, sub: &str) -> &[CuratedEvent] {
        self.categories
            .get(main)
            .and_then(|subs| subs.get(sub))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Total number of events across every category.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.categories
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuratedEvent {
    pub event_title: String,
    #[serde(default)]
    pub event_summary: String,
    #[serde(default)]
    pub primary_date: String,
    #[serde(default)]
    pub event_years: Vec<i32>,
    #[serde(default)]
    pub timeline_points: Vec<TimelinePoint>,
    #[serde(default)]
    pub status: String,
    /// Event-level source IDs.
    #[serde(default)]
    pub sources: Vec<String>,
}

/// A dated sub-event. `date` is `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "sourceIds", default)]
    pub source_ids: Vec<String>,
}

/// A resolved source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sub_title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub send_date: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// Lightweight article resolution used by the legacy view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub id: String,
    /// Date label to text, ordered by key.
    #[serde(default)]
    pub event_contents: BTreeMap<String, String>,
    #[serde(rename = "subCategory", default)]
    pub sub_category: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_curated_payload() {
        let json = r#"{
            "main_overview": {"id": "iu", "content": "Singer", "articleIds": ["a1"]},
            "timeline_content": {
                "schema_version": "v2_curated",
                "data": {
                    "Creative Works": {
                        "Music": [{
                            "event_title": "Album release",
                            "event_summary": "Released an album",
                            "primary_date": "2021-03-25",
                            "event_years": [2021],
                            "timeline_points": [
                                {"date": "2021-03", "description": "Announced", "sourceIds": ["s1"]}
                            ],
                            "status": "verified",
                            "sources": ["s1"]
                        }]
                    }
                }
            }
        }"#;

        let content: PublicFigureContent = serde_json::from_str(json).unwrap();
        assert_eq!(content.main_overview.article_ids, vec!["a1"]);
        let TimelineContent::Curated(curated) = &content.timeline_content else {
            panic!("expected curated timeline");
        };
        let events = curated.events("Creative Works", "Music");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].timeline_points[0].source_ids, vec!["s1"]);
        assert_eq!(curated.event_count(), 1);
        assert!(curated.events("Creative Works", "Film & TV").is_empty());
    }

    #[test]
    fn test_deserialize_legacy_payload() {
        let json = r#"{
            "schema_version": "v1_legacy",
            "data": {
                "categoryContent": [
                    {"id": "c1", "category": "Career", "content": "Debut", "articleIds": ["a", "b"]},
                    {"id": "c2", "category": "Career", "subcategory": "Music", "content": "Tour"}
                ]
            }
        }"#;

        let content: TimelineContent = serde_json::from_str(json).unwrap();
        assert_eq!(content.schema_version(), "v1_legacy");
        let TimelineContent::Legacy(legacy) = content else {
            panic!("expected legacy timeline");
        };
        assert_eq!(legacy.category_content.len(), 2);
        assert!(legacy.category_content[1].article_ids.is_empty());
        assert_eq!(legacy.category_content[1].subcategory.as_deref(), Some("Music"));
    }

    #[test]
    fn test_article_camel_case_fields() {
        let json = r#"{"id": "a1", "title": "T", "subTitle": "S", "sendDate": "20210325", "imageUrls": ["x.jpg"]}"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.sub_title, "S");
        assert_eq!(article.send_date, "20210325");
        assert_eq!(article.image_urls, vec!["x.jpg"]);
        assert!(article.body.is_empty());
    }

    #[test]
    fn test_unknown_schema_version_rejected() {
        let json = r#"{"schema_version": "v3_future", "data": {}}"#;
        assert!(serde_json::from_str::<TimelineContent>(json).is_err());
    }
}
