//! Post review workflow.
//!
//! Everything here is pure: the functions inspect a post and an actor and
//! either describe the change to write or explain why the transition is not
//! allowed. Writing is left to [`crate::store::posts`], which applies every
//! [`StatusChange`] together with its [`Precondition`] so that two reviewers
//! racing on the same post cannot both win.

use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::post;
use crate::entities::PostStatus;

/// Owner-initiated actions that approved posts no longer accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerAction {
    Edit,
    Delete,
}

impl OwnerAction {
    fn past_participle(&self) -> &'static str {
        match self {
            OwnerAction::Edit => "edited",
            OwnerAction::Delete => "deleted",
        }
    }
}

impl fmt::Display for OwnerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerAction::Edit => write!(f, "update"),
            OwnerAction::Delete => write!(f, "delete"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Invalid status: {0}")]
    InvalidDecision(String),
    #[error("A rejection reason is required when rejecting a post")]
    MissingReason,
    #[error("Post has already been reviewed")]
    AlreadyReviewed,
    #[error("Approved posts cannot be {}", .0.past_participle())]
    Immutable(OwnerAction),
    #[error("You are not authorized to {0} this post")]
    NotOwner(OwnerAction),
    #[error("{0}")]
    InvalidContent(String),
}

/// Outcome requested by a reviewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject { reason: String },
}

impl ReviewDecision {
    /// Builds a decision from the wire values. Only `approved` and `rejected`
    /// are accepted, and a rejection must carry a non-blank reason. The reason
    /// is kept verbatim.
    pub fn parse(status: &str, reason: Option<&str>) -> Result<Self, TransitionError> {
        match status {
            "approved" => Ok(ReviewDecision::Approve),
            "rejected" => match reason {
                Some(reason) if !reason.trim().is_empty() => Ok(ReviewDecision::Reject {
                    reason: reason.to_string(),
                }),
                _ => Err(TransitionError::MissingReason),
            },
            other => Err(TransitionError::InvalidDecision(other.to_string())),
        }
    }

    pub fn status(&self) -> PostStatus {
        match self {
            ReviewDecision::Approve => PostStatus::Approved,
            ReviewDecision::Reject { .. } => PostStatus::Rejected,
        }
    }
}

/// Condition the stored row must still satisfy when the change is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    StatusIs(PostStatus),
    /// Owned by the given account and not in the given status.
    OwnedAndStatusIsNot { owner: Uuid, status: PostStatus },
}

#[cfg(test)]
impl Precondition {
    /// In-memory mirror of the store's filter.
    pub fn holds(&self, post: &post::Model) -> bool {
        match self {
            Precondition::StatusIs(status) => post.status == *status,
            Precondition::OwnedAndStatusIsNot { owner, status } => {
                post.created_by == *owner && post.status != *status
            }
        }
    }
}

/// New values for the workflow fields of a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub precondition: Precondition,
    pub status: PostStatus,
    pub approved_by: Option<Uuid>,
    pub rejection_reason: Option<String>,
}

#[cfg(test)]
impl StatusChange {
    /// Applies the change to an in-memory copy, as the store does to the row.
    pub fn apply(&self, mut post: post::Model, now: DateTime<Utc>) -> post::Model {
        post.status = self.status;
        post.approved_by = self.approved_by;
        post.rejection_reason = self.rejection_reason.clone();
        post.updated_at = now;
        post
    }
}

/// Listing content supplied by a business owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostContent {
    pub title: String,
    pub business_name: String,
    pub description: String,
    pub industry: String,
    pub location: String,
    pub investment_needed: i64,
}

impl PostContent {
    /// `title` and `business_name` are synonyms; whichever is given fills the
    /// other. At least one of them must be non-blank.
    pub fn new(
        title: Option<String>,
        business_name: Option<String>,
        description: Option<String>,
        industry: Option<String>,
        location: Option<String>,
        investment_needed: Option<i64>,
    ) -> Result<Self, TransitionError> {
        let title = title.filter(|t| !t.trim().is_empty());
        let business_name = business_name.filter(|b| !b.trim().is_empty());

        let (title, business_name) = match (title, business_name) {
            (Some(t), Some(b)) => (t, b),
            (Some(t), None) => (t.clone(), t),
            (None, Some(b)) => (b.clone(), b),
            (None, None) => {
                return Err(TransitionError::InvalidContent(
                    "A title or business name is required".to_string(),
                ))
            }
        };

        let investment_needed = investment_needed.unwrap_or(0);
        if investment_needed < 0 {
            return Err(TransitionError::InvalidContent(
                "investmentNeeded must not be negative".to_string(),
            ));
        }

        Ok(Self {
            title,
            business_name,
            description: description.unwrap_or_default(),
            industry: industry.unwrap_or_default(),
            location: location.unwrap_or_default(),
            investment_needed,
        })
    }
}

/// Creates a new listing. The status is always `pending` no matter what the
/// caller asked for.
pub fn submit(owner: Uuid, content: PostContent, now: DateTime<Utc>) -> post::Model {
    post::Model {
        id: Uuid::new_v4(),
        title: content.title,
        business_name: content.business_name,
        description: content.description,
        industry: content.industry,
        location: content.location,
        investment_needed: content.investment_needed,
        created_by: owner,
        status: PostStatus::Pending,
        rejection_reason: None,
        approved_by: None,
        created_at: now,
        updated_at: now,
    }
}

/// Reviews a pending post.
pub fn review(
    post: &post::Model,
    reviewer: Uuid,
    decision: ReviewDecision,
) -> Result<StatusChange, TransitionError> {
    if post.status != PostStatus::Pending {
        return Err(TransitionError::AlreadyReviewed);
    }

    let status = decision.status();
    let rejection_reason = match decision {
        ReviewDecision::Approve => None,
        ReviewDecision::Reject { reason } => Some(reason),
    };

    Ok(StatusChange {
        precondition: Precondition::StatusIs(PostStatus::Pending),
        status,
        approved_by: Some(reviewer),
        rejection_reason,
    })
}

/// Checks an owner edit. A successful edit sends the post back to `pending`
/// and forgets the previous review.
pub fn edit(post: &post::Model, editor: Uuid) -> Result<StatusChange, TransitionError> {
    let precondition = owner_precondition(post, editor, OwnerAction::Edit)?;
    Ok(StatusChange {
        precondition,
        status: PostStatus::Pending,
        approved_by: None,
        rejection_reason: None,
    })
}

/// Checks an owner delete. Ownership is checked before status.
pub fn delete(post: &post::Model, requester: Uuid) -> Result<Precondition, TransitionError> {
    owner_precondition(post, requester, OwnerAction::Delete)
}

fn owner_precondition(
    post: &post::Model,
    actor: Uuid,
    action: OwnerAction,
) -> Result<Precondition, TransitionError> {
    if post.created_by != actor {
        return Err(TransitionError::NotOwner(action));
    }
    if post.status == PostStatus::Approved {
        return Err(TransitionError::Immutable(action));
    }
    Ok(Precondition::OwnedAndStatusIsNot {
        owner: actor,
        status: PostStatus::Approved,
    })
}
