//! Raw search records → canonical [`JobPosting`]s, plus the list filters applied
//! after a search.

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use once_cell::sync::Lazy;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;

use crate::models::job::{JobPosting, LinkRef, RawJob, RawJobFields, RecencyFilter};

pub const MAX_DESCRIPTION_CHARS: usize = 2000;
const UNTITLED: &str = "Untitled Position";
const UNKNOWN_COMPANY: &str = "Unknown Company";
const UNKNOWN_PROVIDER: &str = "Unknown";

/// Characters `encodeURIComponent` leaves alone.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static FIRST_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid regex"));
static SALARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:Rs\.?|LKR|USD)\s*\d[\d,]*(?:\s*-\s*\d[\d,]*)?").expect("valid regex")
});

pub fn normalize(raw_jobs: Vec<RawJob>, default_location: &str) -> Vec<JobPosting> {
    normalize_at(raw_jobs, default_location, Utc::now())
}

/// [`normalize`] with an explicit clock, used to resolve relative posting dates.
pub fn normalize_at(
    raw_jobs: Vec<RawJob>,
    default_location: &str,
    now: DateTime<Utc>,
) -> Vec<JobPosting> {
    raw_jobs
        .into_iter()
        .enumerate()
        .map(|(index, job)| normalize_one(index, job, default_location, now))
        .collect()
}

fn normalize_one(
    index: usize,
    job: RawJob,
    default_location: &str,
    now: DateTime<Utc>,
) -> JobPosting {
    let RawJob { fields, raw } = job;
    let extensions = fields.detected_extensions.clone().unwrap_or_default();

    let title = non_empty(fields.title.as_deref()).unwrap_or(UNTITLED).to_string();
    let company = non_empty(fields.company_name.as_deref())
        .unwrap_or(UNKNOWN_COMPANY)
        .to_string();
    let raw_description = fields.description.as_deref().unwrap_or_default();

    let apply_link = resolve_apply_link(&fields)
        .unwrap_or_else(|| fallback_apply_url(fields.job_id.as_deref(), &title, &company));

    JobPosting {
        id: fields
            .job_id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("job_{index}")),
        description: clean_description(raw_description),
        location: non_empty(fields.location.as_deref().map(str::trim))
            .unwrap_or(default_location)
            .to_string(),
        apply_link,
        provider: non_empty(fields.via.as_deref())
            .unwrap_or(UNKNOWN_PROVIDER)
            .to_string(),
        posted_at: parse_posting_date(extensions.posted_at.as_deref(), now),
        posted_at_raw: extensions.posted_at.clone(),
        schedule: extensions.schedule_type.clone(),
        salary: extract_salary(extensions.salary.as_deref(), raw_description),
        thumbnail: fields.thumbnail.clone(),
        title,
        company,
        raw,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Explicit link, first apply option, share URL, first related link.
/// `"#"` and empty strings don't count.
fn resolve_apply_link(fields: &RawJobFields) -> Option<String> {
    let first_link = |links: &Option<Vec<LinkRef>>| {
        links
            .as_ref()
            .and_then(|l| l.first())
            .and_then(|l| l.link.clone())
    };

    [
        fields.apply_link.clone(),
        first_link(&fields.apply_options),
        fields.share_url.clone(),
        first_link(&fields.related_links),
    ]
    .into_iter()
    .flatten()
    .find(|link| !link.is_empty() && link != "#")
}

/// Google Jobs deep link when the source gave an id, plain web search otherwise.
pub fn fallback_apply_url(job_id: Option<&str>, title: &str, company: &str) -> String {
    let encode = |s: &str| utf8_percent_encode(s, COMPONENT).to_string();

    match job_id.filter(|id| !id.is_empty()) {
        Some(id) => format!(
            "https://www.google.com/search?q={}&ibp=htl;jobs#fpstate=tldetail&htivrt=jobs&htiq={}&htidocid={}",
            encode(&format!("{title} {company}")),
            encode(title),
            id
        ),
        None => format!(
            "https://www.google.com/search?q={}",
            encode(&format!("{title} at {company}"))
        ),
    }
}

/// Relative ("3 days ago", "5 hrs") or absolute date. Months are 30 days.
pub fn parse_posting_date(value: Option<&str>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }

    let lower = value.to_lowercase();
    let quantity = || -> i64 {
        FIRST_NUMBER
            .find(&lower)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(1)
    };

    let ago = if lower.contains("hour") || lower.contains("hr") {
        Duration::try_hours(quantity())
    } else if lower.contains("day") {
        Duration::try_days(quantity())
    } else if lower.contains("week") {
        Duration::try_weeks(quantity())
    } else if lower.contains("month") {
        quantity().checked_mul(30).and_then(Duration::try_days)
    } else {
        return parse_absolute_date(value);
    };

    ago.and_then(|ago| now.checked_sub_signed(ago))
}

fn parse_absolute_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Collapses whitespace and caps the length, marking truncation with `...`.
pub fn clean_description(description: &str) -> String {
    let cleaned = WHITESPACE.replace_all(description, " ");
    let cleaned = cleaned.trim();

    match cleaned.char_indices().nth(MAX_DESCRIPTION_CHARS) {
        Some((idx, _)) => format!("{}...", &cleaned[..idx]),
        None => cleaned.to_string(),
    }
}

/// Structured salary if present, else the first currency amount in the text.
pub fn extract_salary(structured: Option<&str>, description: &str) -> Option<String> {
    if let Some(salary) = non_empty(structured) {
        return Some(salary.to_string());
    }
    SALARY.find(description).map(|m| m.as_str().to_string())
}

/// First occurrence wins per case-insensitive (title, company).
pub fn deduplicate(jobs: Vec<JobPosting>) -> Vec<JobPosting> {
    let mut seen = HashSet::new();
    jobs.into_iter()
        .filter(|job| seen.insert((job.title.to_lowercase(), job.company.to_lowercase())))
        .collect()
}

pub fn filter_by_recency(jobs: Vec<JobPosting>, filter: RecencyFilter) -> Vec<JobPosting> {
    filter_by_recency_at(jobs, filter, Utc::now())
}

/// Keeps jobs posted within the window. Undated jobs are always kept.
pub fn filter_by_recency_at(
    jobs: Vec<JobPosting>,
    filter: RecencyFilter,
    now: DateTime<Utc>,
) -> Vec<JobPosting> {
    let Some(days) = filter.window_days() else {
        return jobs;
    };
    let cutoff = now - Duration::days(days);

    jobs.into_iter()
        .filter(|job| job.posted_at.map_or(true, |posted| posted >= cutoff))
        .collect()
}

/// Keeps jobs whose title, description or company mentions any keyword.
pub fn filter_by_keywords(jobs: Vec<JobPosting>, keywords: &[String]) -> Vec<JobPosting> {
    if keywords.is_empty() {
        return jobs;
    }
    let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

    jobs.into_iter()
        .filter(|job| {
            let haystack =
                format!("{} {} {}", job.title, job.description, job.company).to_lowercase();
            keywords.iter().any(|k| haystack.contains(k.as_str()))
        })
        .collect()
}
