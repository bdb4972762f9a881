use chrono::{Duration, Utc};
use serde::{de::IgnoredAny, Deserialize, Serialize};

use crate::upstream::{Upstream, UpstreamError, UpstreamRequest};

pub const DEFAULT_LIMIT: u32 = 6;
pub const MAX_LIMIT: u32 = 12;
const DEFAULT_SOURCE: &str = "OceanCare News";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewsFeed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_articles: Option<u64>,
    pub articles: Vec<Article>,
}

impl NewsFeed {
    pub fn truncated(mut self, limit: u32) -> Self {
        self.articles.truncate(limit as usize);
        self
    }
}

/// The `source` field has been observed as a bare string, an object with a
/// name, or an object carrying only a URL.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSource {
    Label(String),
    Descriptor {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        url: Option<String>,
    },
    Unknown(IgnoredAny),
}

impl RawSource {
    fn into_label(self) -> String {
        let label = match self {
            RawSource::Label(label) => non_blank(label),
            RawSource::Descriptor { name, url } => name
                .and_then(non_blank)
                .or_else(|| url.as_deref().and_then(hostname)),
            RawSource::Unknown(_) => None,
        };
        label.unwrap_or_else(|| DEFAULT_SOURCE.to_string())
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn hostname(raw: &str) -> Option<String> {
    let parsed = url::Url::parse(raw).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    source: Option<RawSource>,
    #[serde(default)]
    published_at: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl From<RawArticle> for Article {
    fn from(raw: RawArticle) -> Self {
        Article {
            title: raw.title.unwrap_or_default(),
            description: raw.description,
            source: raw
                .source
                .map(RawSource::into_label)
                .unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            published_at: raw.published_at,
            image: raw.image,
            url: raw.url,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    total_articles: Option<u64>,
    articles: Vec<RawArticle>,
}

pub async fn fetch_news(
    upstream: &dyn Upstream,
    base_url: &str,
    limit: u32,
    token: String,
) -> Result<NewsFeed, UpstreamError> {
    let request = UpstreamRequest::get(format!("{base_url}/api/v4/search"))
        .query("q", "ocean conservation")
        .query("lang", "en")
        .query("max", limit)
        .query("token", token);

    let response: SearchResponse = serde_json::from_value(upstream.get_json(request).await?)?;

    Ok(NewsFeed {
        total_articles: response.total_articles,
        articles: response.articles.into_iter().map(Article::from).collect(),
    }
    .truncated(limit))
}

/// Title, description, source, age in hours, Unsplash photo id, slug.
const FALLBACK_ARTICLES: [(&str, &str, &str, i64, &str, &str); 3] = [
    (
        "Global Coral Restoration Hits New Milestone",
        "Community-led coral nurseries restore 50,000 coral fragments across three oceans.",
        "OceanCare Newsroom",
        2,
        "photo-1507525428034-b723cf961d3e",
        "coral-restoration-milestone",
    ),
    (
        "Coastal Communities Rally for Seagrass Protection",
        "Over 15,000 volunteers join monthly cleanups safeguarding vital blue carbon habitats.",
        "Marine Conservation Daily",
        24,
        "photo-1505761671935-60b3a7427bad",
        "seagrass-protection",
    ),
    (
        "Innovative Fishing Gear Reduces Bycatch by 40%",
        "OceanCare partners with fisheries to deploy AI-powered detection buoys protecting marine life.",
        "Sustainable Seas Report",
        48,
        "photo-1483683804023-6ccdb62f86ef",
        "bycatch-reduction",
    ),
];

pub fn news_fallback() -> NewsFeed {
    let now = Utc::now();
    let articles = FALLBACK_ARTICLES
        .iter()
        .map(
            |&(title, description, source, hours_ago, image, slug)| Article {
                title: title.to_string(),
                description: Some(description.to_string()),
                source: source.to_string(),
                published_at: Some((now - Duration::hours(hours_ago)).to_rfc3339()),
                image: Some(format!(
                    "https://images.unsplash.com/{image}?auto=format&fit=crop&w=1200&q=80"
                )),
                url: Some(format!("https://oceancare.example.org/news/{slug}")),
            },
        )
        .collect();

    NewsFeed {
        total_articles: None,
        articles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Canned, MockUpstream};
    use serde_json::{json, Value};

    fn label(value: Value) -> String {
        serde_json::from_value::<RawSource>(value).unwrap().into_label()
    }

    #[test]
    fn test_source_normalization() {
        assert_eq!(label(json!("  Reuters ")), "Reuters");
        assert_eq!(label(json!("")), DEFAULT_SOURCE);
        assert_eq!(
            label(json!({ "name": "The Guardian", "url": "https://www.theguardian.com" })),
            "The Guardian"
        );
        assert_eq!(label(json!({ "name": "", "url": "https://www.bbc.co.uk/news" })), "bbc.co.uk");
        assert_eq!(
            label(json!({ "url": "https://oceanographic.example.com/a" })),
            "oceanographic.example.com"
        );
        assert_eq!(label(json!({ "url": "not a url" })), DEFAULT_SOURCE);
        assert_eq!(label(json!(42)), DEFAULT_SOURCE);
    }

    #[tokio::test]
    async fn test_decodes_and_truncates_articles() {
        let articles: Vec<Value> = (0..8)
            .map(|i| json!({
                "title": format!("Story {i}"),
                "publishedAt": "2026-10-15T12:00:00Z",
                "source": { "name": "Ocean Wire", "url": "https://oceanwire.example.com" }
            }))
            .collect();
        let upstream = MockUpstream::new().respond(
            "https://gnews.io",
            Canned::Json(json!({ "totalArticles": 120, "articles": articles })),
        );

        let feed = fetch_news(&upstream, "https://gnews.io", 6, "token".into()).await.unwrap();

        assert_eq!(feed.total_articles, Some(120));
        assert_eq!(feed.articles.len(), 6);
        assert_eq!(feed.articles[0].source, "Ocean Wire");
        assert_eq!(upstream.requests()[0].query_value("max"), Some("6"));
        assert_eq!(upstream.requests()[0].query_value("q"), Some("ocean conservation"));
    }

    #[tokio::test]
    async fn test_missing_articles_is_a_failure() {
        let upstream = MockUpstream::new().respond(
            "https://gnews.io",
            Canned::Json(json!({ "errors": ["You have reached your daily quota"] })),
        );

        let err = fetch_news(&upstream, "https://gnews.io", 6, "token".into()).await.unwrap_err();
        assert!(matches!(err, UpstreamError::JsonParsing(_)));
    }

    #[test]
    fn test_fallback_articles_are_stable() {
        let first = news_fallback();
        let second = news_fallback();

        assert_eq!(first.articles.len(), 3);
        let titles = |feed: &NewsFeed| {
            feed.articles
                .iter()
                .map(|a| a.title.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(titles(&first), titles(&second));
        assert!(first.articles.iter().all(|a| a.published_at.is_some()));
    }
}
