//! # Verification
//!
//! Reviewer lookup, submission lookup, then role classification. Short-circuits
//! on the first failure and never retries; the frontend retries if it wants to.
//!
//! Identity ("appears in the reviewer search") and role ("has a review
//! assignment on this submission") stay two independent checks. A user can pass
//! one and fail the other, and the error says which.
use serde::Serialize;

use crate::{
    error::AppError,
    ojs::{ArticleDetail, ArticleLookup, ReviewAssignment, ReviewerLookup},
};

/// OJS status code for a completed review assignment.
pub const STATUS_REVIEW_COMPLETE: i32 = 9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContributorRole {
    Completed,
    InProgress,
}

impl ContributorRole {
    pub fn label(self) -> &'static str {
        match self {
            ContributorRole::Completed => "Reviewer (Completed)",
            ContributorRole::InProgress => "Reviewer (In Progress)",
        }
    }
}

/// `None` means the submission never had a review assignment at all.
/// One completed assignment outweighs any number of in-progress ones.
pub fn classify(assignments: &[ReviewAssignment]) -> Option<ContributorRole> {
    if assignments.is_empty() {
        return None;
    }

    if assignments
        .iter()
        .any(|a| a.status_id == STATUS_REVIEW_COMPLETE)
    {
        Some(ContributorRole::Completed)
    } else {
        Some(ContributorRole::InProgress)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub contributor_name: String,
    pub contributor_role: String,
    pub article_detail: ArticleDetail,
}

pub struct VerificationService<R, A> {
    reviewers: R,
    articles: A,
}

impl<R: ReviewerLookup, A: ArticleLookup> VerificationService<R, A> {
    pub fn new(reviewers: R, articles: A) -> Self {
        Self {
            reviewers,
            articles,
        }
    }

    pub async fn verify(
        &self,
        username: &str,
        submission_id: &str,
    ) -> Result<VerificationResult, AppError> {
        let reviewer = self
            .reviewers
            .find(username)
            .await?
            .ok_or_else(|| AppError::ReviewerNotFound(username.to_string()))?;

        let submission = self.articles.fetch(submission_id).await?;

        let role = classify(&submission.assignments)
            .ok_or_else(|| AppError::NoAssignment(submission_id.to_string()))?;

        Ok(VerificationResult {
            contributor_name: reviewer.full_name,
            contributor_role: role.label().to_string(),
            article_detail: submission.article,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ojs::{ReviewerIdentity, SubmissionDetail};

    fn assignments(status_ids: &[i32]) -> Vec<ReviewAssignment> {
        status_ids
            .iter()
            .map(|&status_id| ReviewAssignment { status_id })
            .collect()
    }

    #[test]
    fn no_assignments_is_rejected() {
        assert_eq!(classify(&[]), None);
    }

    #[test]
    fn in_progress_without_a_completed_assignment() {
        assert_eq!(
            classify(&assignments(&[5])),
            Some(ContributorRole::InProgress)
        );
        assert_eq!(
            classify(&assignments(&[1, 4, 5])),
            Some(ContributorRole::InProgress)
        );
    }

    #[test]
    fn any_completed_assignment_wins() {
        assert_eq!(
            classify(&assignments(&[5, 9])),
            Some(ContributorRole::Completed)
        );
        assert_eq!(
            classify(&assignments(&[9, 5])),
            Some(ContributorRole::Completed)
        );
    }

    struct FakeReviewers {
        known: Option<ReviewerIdentity>,
    }

    impl ReviewerLookup for FakeReviewers {
        async fn find(&self, _username: &str) -> Result<Option<ReviewerIdentity>, AppError> {
            Ok(self.known.clone())
        }
    }

    struct FakeArticles {
        status_ids: Vec<i32>,
    }

    impl ArticleLookup for FakeArticles {
        async fn fetch(&self, _submission_id: &str) -> Result<SubmissionDetail, AppError> {
            Ok(SubmissionDetail {
                article: ArticleDetail {
                    title: "Coastal Winds".to_string(),
                    review_date: "2024-05-01".to_string(),
                    url_published: None,
                },
                assignments: assignments(&self.status_ids),
            })
        }
    }

    fn service(
        known: Option<ReviewerIdentity>,
        status_ids: &[i32],
    ) -> VerificationService<FakeReviewers, FakeArticles> {
        VerificationService::new(
            FakeReviewers { known },
            FakeArticles {
                status_ids: status_ids.to_vec(),
            },
        )
    }

    fn jane() -> ReviewerIdentity {
        ReviewerIdentity {
            id: "3".to_string(),
            full_name: "Jane Doe".to_string(),
        }
    }

    #[tokio::test]
    async fn unknown_reviewer_short_circuits() {
        let result = service(None, &[9]).verify("ghost", "1144").await;

        assert!(matches!(result, Err(AppError::ReviewerNotFound(u)) if u == "ghost"));
    }

    #[tokio::test]
    async fn submission_without_assignments_is_forbidden() {
        let result = service(Some(jane()), &[]).verify("jdoe", "1144").await;

        assert!(matches!(result, Err(AppError::NoAssignment(id)) if id == "1144"));
    }

    #[tokio::test]
    async fn successful_verification_assembles_the_result() {
        let result = service(Some(jane()), &[5, 9])
            .verify("jdoe", "1144")
            .await
            .unwrap();

        assert_eq!(result.contributor_name, "Jane Doe");
        assert_eq!(result.contributor_role, "Reviewer (Completed)");
        assert_eq!(result.article_detail.title, "Coastal Winds");
        assert_eq!(result.article_detail.review_date, "2024-05-01");
    }

    #[tokio::test]
    async fn verification_is_idempotent() {
        let svc = service(Some(jane()), &[5]);

        let first = svc.verify("jdoe", "1144").await.unwrap();
        let second = svc.verify("jdoe", "1144").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.contributor_role, "Reviewer (In Progress)");
    }
}
