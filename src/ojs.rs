//! # OJS REST API
//!
//! Thin client over the two Open Journal Systems endpoints we depend on.
//!
//! ## Endpoints
//! - `GET /users/reviewers?searchPhrase=<q>`: fuzzy reviewer search, returns
//!   `{ items: [{ id, userName, fullName }] }`. The search is substring-based,
//!   so the exact username match happens on our side.
//! - `GET /submissions/{id}`: full submission record. We only read the first
//!   publication's localized title, `urlPublished`, `lastModified` and the
//!   `reviewAssignments` status codes.
//!
//! ## Auth
//! Token is attached either as a bearer header or as the `apiToken` query
//! parameter depending on [`AuthMode`]; both are accepted by OJS 3.x, which one
//! works depends on the install's server configuration.
use std::{collections::HashMap, future::Future};

use reqwest::{Client, RequestBuilder, StatusCode, header::ACCEPT};
use serde::Deserialize;
use tracing::error;

use crate::{
    config::{AuthMode, Config},
    error::AppError,
};

pub const TITLE_NOT_FOUND: &str = "title not found";
const PREFERRED_LOCALE: &str = "en_US";

#[derive(Deserialize)]
pub struct ReviewerSearchResponse {
    #[serde(default)]
    pub items: Vec<ReviewerRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewerRecord {
    pub id: i64,
    pub user_name: String,
    pub full_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    #[serde(default)]
    pub publications: Vec<Publication>,
    #[serde(default)]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub review_assignments: Vec<ReviewAssignment>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    #[serde(default)]
    pub title: HashMap<String, String>,
    #[serde(default)]
    pub url_published: Option<String>,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAssignment {
    pub status_id: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewerIdentity {
    pub id: String,
    pub full_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDetail {
    pub title: String,
    pub review_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_published: Option<String>,
}

pub struct SubmissionDetail {
    pub article: ArticleDetail,
    pub assignments: Vec<ReviewAssignment>,
}

pub trait ReviewerLookup {
    fn find(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<ReviewerIdentity>, AppError>> + Send;
}

pub trait ArticleLookup {
    fn fetch(
        &self,
        submission_id: &str,
    ) -> impl Future<Output = Result<SubmissionDetail, AppError>> + Send;
}

#[derive(Clone)]
pub struct OjsClient {
    http: Client,
    base_url: String,
    token: String,
    auth_mode: AuthMode,
}

impl OjsClient {
    pub fn new(config: &Config) -> Self {
        let http = Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .expect("HTTP client misconfigured!");

        Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
            auth_mode: config.auth_mode,
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let request = self
            .http
            .get(format!("{}/{path}", self.base_url))
            .header(ACCEPT, "application/json");

        match self.auth_mode {
            AuthMode::Header => request.bearer_auth(&self.token),
            AuthMode::Query => request.query(&[("apiToken", self.token.as_str())]),
        }
    }
}

impl ReviewerLookup for OjsClient {
    async fn find(&self, username: &str) -> Result<Option<ReviewerIdentity>, AppError> {
        let response = self
            .get("users/reviewers")
            .query(&[("searchPhrase", username)])
            .send()
            .await
            .map_err(|e| upstream("reviewer search", username, &e))?;

        #[cfg(feature = "verbose")]
        tracing::info!("Reviewer search for '{username}': {}", response.status());

        let status = response.status();
        if !status.is_success() {
            error!("Reviewer search for '{username}' returned {status}");
            return Err(AppError::Upstream(format!(
                "reviewer search for '{username}' returned {status}"
            )));
        }

        let payload: ReviewerSearchResponse = response
            .json()
            .await
            .map_err(|e| upstream("reviewer search payload", username, &e))?;

        Ok(match_reviewer(payload.items, username))
    }
}

impl ArticleLookup for OjsClient {
    async fn fetch(&self, submission_id: &str) -> Result<SubmissionDetail, AppError> {
        let response = self
            .get(&format!("submissions/{submission_id}"))
            .send()
            .await
            .map_err(|e| upstream("submission lookup", submission_id, &e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::SubmissionNotFound(submission_id.to_string()));
        }
        if !status.is_success() {
            error!("Submission {submission_id} lookup returned {status}");
            return Err(AppError::Upstream(format!(
                "submission {submission_id} lookup returned {status}"
            )));
        }

        let payload: SubmissionResponse = response
            .json()
            .await
            .map_err(|e| upstream("submission payload", submission_id, &e))?;

        Ok(SubmissionDetail {
            article: ArticleDetail {
                title: localized_title(payload.publications.first()),
                review_date: review_date(payload.last_modified.as_deref()),
                url_published: payload
                    .publications
                    .first()
                    .and_then(|p| p.url_published.clone())
                    .filter(|u| !u.is_empty()),
            },
            assignments: payload.review_assignments,
        })
    }
}

fn upstream(call: &str, id: &str, source: &reqwest::Error) -> AppError {
    error!("OJS {call} for '{id}' failed: {source}");
    AppError::Upstream(format!("{call} for '{id}' failed"))
}

/// The OJS search is fuzzy, so disambiguate with an exact case-insensitive
/// username match. "Jdoe" matches "jdoe" but never "jdoe2".
pub fn match_reviewer(
    candidates: Vec<ReviewerRecord>,
    username: &str,
) -> Option<ReviewerIdentity> {
    let wanted = username.to_lowercase();

    candidates
        .into_iter()
        .find(|c| c.user_name.to_lowercase() == wanted)
        .map(|c| ReviewerIdentity {
            id: c.id.to_string(),
            full_name: c.full_name,
        })
}

fn localized_title(publication: Option<&Publication>) -> String {
    let Some(publication) = publication else {
        return TITLE_NOT_FOUND.to_string();
    };

    publication
        .title
        .get(PREFERRED_LOCALE)
        .or_else(|| publication.title.values().next())
        .filter(|t| !t.is_empty())
        .cloned()
        .unwrap_or_else(|| TITLE_NOT_FOUND.to_string())
}

/// OJS reports `lastModified` as `YYYY-MM-DD HH:MM:SS`; keep the date portion.
fn review_date(last_modified: Option<&str>) -> String {
    last_modified
        .and_then(|stamp| stamp.split(' ').next())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, user_name: &str, full_name: &str) -> ReviewerRecord {
        ReviewerRecord {
            id,
            user_name: user_name.to_string(),
            full_name: full_name.to_string(),
        }
    }

    #[test]
    fn matching_is_exact_and_case_insensitive() {
        let candidates = vec![record(7, "jdoe2", "Jane Doe II"), record(3, "jdoe", "Jane Doe")];

        let matched = match_reviewer(candidates, "Jdoe").unwrap();
        assert_eq!(matched.id, "3");
        assert_eq!(matched.full_name, "Jane Doe");
    }

    #[test]
    fn near_miss_usernames_do_not_match() {
        let candidates = vec![record(7, "jdoe2", "Jane Doe II")];

        assert!(match_reviewer(candidates, "jdoe").is_none());
        assert!(match_reviewer(Vec::new(), "ghost").is_none());
    }

    #[test]
    fn title_prefers_en_us_then_any_locale() {
        let payload: SubmissionResponse = serde_json::from_value(serde_json::json!({
            "publications": [{
                "title": { "id_ID": "Judul", "en_US": "Coastal Winds" },
                "urlPublished": "https://journal.example.org/article/1144"
            }],
            "lastModified": "2024-05-01 13:45:09",
            "reviewAssignments": [{ "statusId": 9 }]
        }))
        .unwrap();

        assert_eq!(localized_title(payload.publications.first()), "Coastal Winds");
        assert_eq!(review_date(payload.last_modified.as_deref()), "2024-05-01");

        let other: SubmissionResponse = serde_json::from_value(serde_json::json!({
            "publications": [{ "title": { "id_ID": "Judul" } }]
        }))
        .unwrap();
        assert_eq!(localized_title(other.publications.first()), "Judul");
    }

    #[test]
    fn missing_pieces_fall_back_to_sentinels() {
        assert_eq!(localized_title(None), TITLE_NOT_FOUND);
        assert_eq!(review_date(None), "");

        let empty: SubmissionResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(empty.publications.is_empty());
        assert!(empty.review_assignments.is_empty());
        assert_eq!(localized_title(empty.publications.first()), TITLE_NOT_FOUND);
    }
}
