//! Article record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One blog article. Serialized as camelCase JSON, matching the persisted
/// storage layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: u64,
    pub title: String,
    pub description: String,
    /// Markdown body.
    pub content: String,
    /// Category key (dit, luna, note, art, travel).
    pub category_key: String,
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    /// Publish date, `YYYY-MM-DD`.
    pub date: String,
    pub platform: String,
    /// Cover background (CSS gradient or image URL).
    pub cover: String,
}

impl Article {
    /// The publish date as a calendar date; `None` when the stored string
    /// does not parse. Unparseable dates sort last in listings.
    #[must_use]
    pub fn publish_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

/// Built-in article set used when storage is empty or unreadable.
#[must_use]
pub fn default_articles() -> Vec<Article> {
    vec![
        Article {
            id: 1,
            title: "Markdown card generator: simpler visual summaries".to_owned(),
            description: "A lightweight card design tool for everyday sharing.".to_owned(),
            content: "# Background\nOne-step conversion from Markdown to visual cards.\n\n## Highlights\n- Templates and theme colors\n- Automatic layout and grid\n- High-resolution export\n\n## Roadmap\n- Custom templates and brand colors\n- Copy polishing and translation\n- One-click publishing".to_owned(),
            category_key: "dit".to_owned(),
            tag: "DiT".to_owned(),
            badge: Some("Beta".to_owned()),
            date: "2025-12-12".to_owned(),
            platform: "Wechat".to_owned(),
            cover: "linear-gradient(135deg, #0a0f26 0%, #0c1a4d 35%, #032c5f 65%, #0c1a4d 100%)".to_owned(),
        },
        Article {
            id: 2,
            title: "Personal site is live: first release notes".to_owned(),
            description: "First release focused on reading experience; more to come.".to_owned(),
            content: "# Launch notes\nThe first release covers navigation, the article list and color schemes.\n\n## Current features\n- Article list and detail pages\n- Language switching\n- Light and dark mode\n\n## Next\n- Portfolio section\n- Comments and subscriptions\n- A development log".to_owned(),
            category_key: "dit".to_owned(),
            tag: "DiT".to_owned(),
            badge: Some("1.0".to_owned()),
            date: "2025-12-11".to_owned(),
            platform: "Wechat".to_owned(),
            cover: "linear-gradient(135deg, #0d121f 0%, #132642 50%, #243c5a 100%)".to_owned(),
        },
        Article {
            id: 3,
            title: "Notebook: scattered ideas and inspiration".to_owned(),
            description: "Fragments on creative work and travel, collected loosely.".to_owned(),
            content: "# Foreword\nA loose creative memo for fragmentary ideas and travel notes.\n\n## In progress\n- Idea collection\n- Travel itineraries\n- Small experiments\n\n## Plans\n- Split into topic series\n- Add photos and maps\n- Finer-grained tags".to_owned(),
            category_key: "note".to_owned(),
            tag: "Notes".to_owned(),
            badge: None,
            date: "2025-11-28".to_owned(),
            platform: "Wechat".to_owned(),
            cover: "linear-gradient(135deg, #101820 0%, #1f1f2f 50%, #2c2c3b 100%)".to_owned(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_publish_date() {
        let mut article = default_articles().remove(0);
        assert_eq!(
            article.publish_date(),
            NaiveDate::from_ymd_opt(2025, 12, 12)
        );
        article.date = "not a date".to_owned();
        assert_eq!(article.publish_date(), None);
    }

    #[test]
    fn test_json_layout_is_camel_case() {
        let article = &default_articles()[0];
        let json = serde_json::to_string(article).unwrap();
        assert!(json.contains(r#""categoryKey":"dit""#));
        assert!(json.contains(r#""badge":"Beta""#));
        assert!(!json.contains("category_key"));
    }

    #[test]
    fn test_missing_badge_omitted() {
        let article = &default_articles()[2];
        let json = serde_json::to_string(article).unwrap();
        assert!(!json.contains("badge"));
        let back: Article = serde_json::from_str(&json).unwrap();
        assert_eq!(back.badge, None);
    }
}
