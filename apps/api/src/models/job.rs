use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ────────────────────────────────────────────────────────────────────────────
// Ingestion boundary: the external search record, every field optional
// ────────────────────────────────────────────────────────────────────────────

/// Reads a field on its own: a value of the wrong type becomes `None` instead of
/// failing the whole record.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkRef {
    #[serde(default, deserialize_with = "lenient")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DetectedExtensions {
    #[serde(deserialize_with = "lenient")]
    pub posted_at: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub schedule_type: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub salary: Option<String>,
}

/// Typed view of a Google Jobs result as returned by SerpAPI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawJobFields {
    #[serde(deserialize_with = "lenient")]
    pub job_id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub company_name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub location: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub via: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub apply_link: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub apply_options: Option<Vec<LinkRef>>,
    #[serde(deserialize_with = "lenient")]
    pub share_url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub related_links: Option<Vec<LinkRef>>,
    #[serde(deserialize_with = "lenient")]
    pub detected_extensions: Option<DetectedExtensions>,
    #[serde(deserialize_with = "lenient")]
    pub thumbnail: Option<String>,
}

/// A raw posting: the typed fields plus the untouched source document.
#[derive(Debug, Clone)]
pub struct RawJob {
    pub fields: RawJobFields,
    pub raw: Value,
}

impl From<Value> for RawJob {
    /// Fields are read independently, so one mistyped field (e.g. a numeric title)
    /// leaves the rest intact. A non-object record yields empty fields.
    fn from(raw: Value) -> Self {
        let fields = serde_json::from_value(raw.clone()).unwrap_or_default();
        RawJob { fields, raw }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Canonical posting used by the rest of the service
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub apply_link: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub posted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub posted_at_raw: Option<String>,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub raw: Value,
}

/// Posting-age window applied after a search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum RecencyFilter {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "week")]
    Week,
    #[serde(rename = "month")]
    Month,
}

impl RecencyFilter {
    /// Unknown or missing values mean "no filter".
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("24h") => RecencyFilter::Day,
            Some("week") => RecencyFilter::Week,
            Some("month") => RecencyFilter::Month,
            _ => RecencyFilter::All,
        }
    }

    pub fn window_days(self) -> Option<i64> {
        match self {
            RecencyFilter::All => None,
            RecencyFilter::Day => Some(1),
            RecencyFilter::Week => Some(7),
            RecencyFilter::Month => Some(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_job_reads_nested_fields() {
        let raw = RawJob::from(json!({
            "job_id": "abc",
            "title": "Rust Engineer",
            "apply_options": [{"title": "LinkedIn", "link": "https://example.com/apply"}],
            "detected_extensions": {"posted_at": "3 days ago", "schedule_type": "Full-time"}
        }));
        assert_eq!(raw.fields.job_id.as_deref(), Some("abc"));
        let options = raw.fields.apply_options.unwrap();
        assert_eq!(options[0].link.as_deref(), Some("https://example.com/apply"));
        let ext = raw.fields.detected_extensions.unwrap();
        assert_eq!(ext.posted_at.as_deref(), Some("3 days ago"));
    }

    #[test]
    fn test_malformed_raw_job_keeps_raw_document() {
        let raw = RawJob::from(json!({"title": 42}));
        assert!(raw.fields.title.is_none());
        assert_eq!(raw.raw["title"], 42);
    }

    #[test]
    fn test_mistyped_field_leaves_other_fields_intact() {
        let raw = RawJob::from(json!({
            "job_id": "abc",
            "title": 42,
            "company_name": "Acme",
            "description": "Build Rust services",
            "location": "Berlin",
            "apply_options": [{"link": 7}],
            "related_links": [{"link": "https://related.example"}],
            "detected_extensions": {"posted_at": ["bad"], "schedule_type": "Full-time"}
        }));
        let fields = raw.fields;
        assert!(fields.title.is_none());
        assert_eq!(fields.job_id.as_deref(), Some("abc"));
        assert_eq!(fields.company_name.as_deref(), Some("Acme"));
        assert_eq!(fields.description.as_deref(), Some("Build Rust services"));
        assert_eq!(fields.location.as_deref(), Some("Berlin"));
        assert!(fields.apply_options.unwrap()[0].link.is_none());
        assert_eq!(
            fields.related_links.unwrap()[0].link.as_deref(),
            Some("https://related.example")
        );
        let ext = fields.detected_extensions.unwrap();
        assert!(ext.posted_at.is_none());
        assert_eq!(ext.schedule_type.as_deref(), Some("Full-time"));
    }

    #[test]
    fn test_non_object_raw_job_has_empty_fields() {
        let raw = RawJob::from(json!("not a record"));
        assert!(raw.fields.job_id.is_none());
        assert_eq!(raw.raw, json!("not a record"));
    }

    #[test]
    fn test_recency_filter_from_param() {
        assert_eq!(RecencyFilter::from_param(Some("24h")), RecencyFilter::Day);
        assert_eq!(RecencyFilter::from_param(Some("WEEK")), RecencyFilter::Week);
        assert_eq!(RecencyFilter::from_param(Some("month")), RecencyFilter::Month);
        assert_eq!(RecencyFilter::from_param(Some("decade")), RecencyFilter::All);
        assert_eq!(RecencyFilter::from_param(None), RecencyFilter::All);
    }

    #[test]
    fn test_job_posting_accepts_minimal_client_payload() {
        let job: JobPosting = serde_json::from_value(json!({
            "id": "job_0",
            "title": "Dev",
            "company": "Acme",
            "location": "Colombo",
            "postedAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        assert!(job.posted_at.is_some());
        assert!(job.description.is_empty());
    }

    #[test]
    fn test_job_posting_fills_missing_identity_fields() {
        let job: JobPosting = serde_json::from_value(json!({"title": "Dev"})).unwrap();
        assert_eq!(job.title, "Dev");
        assert!(job.id.is_empty());
        assert!(job.company.is_empty());
        assert!(job.location.is_empty());
    }
}
