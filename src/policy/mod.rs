//! Approval policy decision engine.
//!
//! Everything in this module is a pure function over a [`PolicySnapshot`]
//! (or its parts). Fetching the snapshot and executing the resulting
//! [`Decision`]s is the job of [`crate::steward`].
use std::collections::BTreeSet;

use itertools::Itertools;

use crate::github::{Review, ReviewState};

mod plan;

pub use plan::{plan, Decision};

/// Label that lowers the number of required approvals.
pub const DOCUMENTATION_LABEL: &str = "documentation";
/// Label that makes a PR eligible for auto-approval, next to [`DOCUMENTATION_LABEL`].
pub const HOTFIX_LABEL: &str = "hotfix";

/// Labels for which the automation casts its own approving review.
const AUTO_APPROVAL_LABELS: [&str; 2] = [DOCUMENTATION_LABEL, HOTFIX_LABEL];

/// Approvals required when no label lowers the requirement.
pub const DEFAULT_REQUIRED_APPROVALS: u32 = 2;
const DOCUMENTATION_REQUIRED_APPROVALS: u32 = 1;

pub const REASON_SUFFICIENT_APPROVALS: &str = "sufficient approvals already present";
pub const REASON_BOT_ALREADY_APPROVED: &str = "bot already approved";

/// Type of the action that triggered the run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventType {
    Opened,
    Labeled,
    Unlabeled,
    Submitted,
    Edited,
    Dismissed,
    /// An action name we do not know how to handle.
    Unrecognized(String),
}

impl EventType {
    pub fn parse(action: &str) -> Self {
        match action {
            "opened" => Self::Opened,
            "labeled" => Self::Labeled,
            "unlabeled" => Self::Unlabeled,
            "submitted" => Self::Submitted,
            "edited" => Self::Edited,
            "dismissed" => Self::Dismissed,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

/// How approving reviews are counted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApprovalCounting {
    /// Every `APPROVED` review counts, even repeated approvals by the same reviewer.
    #[default]
    Raw,
    /// Only the latest approving or dismissing review of each reviewer is considered.
    LatestPerReviewer,
}

/// Everything the engine needs to know about a pull request for a single run.
#[derive(Clone, Debug)]
pub struct PolicySnapshot {
    pub event_type: EventType,
    pub actor_login: String,
    pub labels: BTreeSet<String>,
    pub reviews: Vec<Review>,
}

pub fn required_approvals(labels: &BTreeSet<String>) -> u32 {
    if labels.contains(DOCUMENTATION_LABEL) {
        DOCUMENTATION_REQUIRED_APPROVALS
    } else {
        DEFAULT_REQUIRED_APPROVALS
    }
}

/// Counts approving reviews at face value.
///
/// A reviewer that approved twice is counted twice, and approvals made before a later push are
/// not discounted. Use [`count_approvals_with`] to select a different counting mode.
pub fn count_approvals(reviews: &[Review]) -> u32 {
    reviews
        .iter()
        .filter(|review| review.state == ReviewState::Approved)
        .count() as u32
}

pub fn count_approvals_with(reviews: &[Review], counting: ApprovalCounting) -> u32 {
    match counting {
        ApprovalCounting::Raw => count_approvals(reviews),
        ApprovalCounting::LatestPerReviewer => {
            // Comments and pending reviews do not override an earlier verdict.
            let latest = reviews
                .iter()
                .filter(|review| {
                    matches!(
                        review.state,
                        ReviewState::Approved
                            | ReviewState::ChangesRequested
                            | ReviewState::Dismissed
                    )
                })
                .map(|review| (review.author_login.as_str(), review.state))
                .collect::<std::collections::HashMap<_, _>>();
            latest
                .values()
                .filter(|state| **state == ReviewState::Approved)
                .count() as u32
        }
    }
}

pub fn has_sufficient_approvals(required: u32, actual: u32) -> bool {
    actual >= required
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssignmentDecision {
    pub perform_assignment: bool,
}

/// Assignment happens exactly once, when the PR is opened.
pub fn decide_assignment(event_type: &EventType) -> AssignmentDecision {
    AssignmentDecision {
        perform_assignment: matches!(event_type, EventType::Opened),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutoApprovalDecision {
    pub should_approve: bool,
    /// Why the automation decided not to approve, or the review message when it approves.
    pub reason: Option<String>,
}

impl AutoApprovalDecision {
    fn skip(reason: Option<&str>) -> Self {
        Self {
            should_approve: false,
            reason: reason.map(ToString::to_string),
        }
    }
}

/// Decides whether the automation should submit an approving review.
///
/// Rules are evaluated in order and the first one that matches wins:
/// 1. enough approvals are present for any label set,
/// 2. no auto-approval label is present,
/// 3. `bot_identity` has already approved,
/// 4. otherwise approve.
pub fn decide_auto_approval(
    labels: &BTreeSet<String>,
    reviews: &[Review],
    bot_identity: &str,
) -> AutoApprovalDecision {
    if count_approvals(reviews) >= DEFAULT_REQUIRED_APPROVALS {
        return AutoApprovalDecision::skip(Some(REASON_SUFFICIENT_APPROVALS));
    }

    let matched: Vec<&str> = AUTO_APPROVAL_LABELS
        .into_iter()
        .filter(|label| labels.contains(*label))
        .collect();
    if matched.is_empty() {
        return AutoApprovalDecision::skip(None);
    }

    let already_approved = reviews.iter().any(|review| {
        review.author_login == bot_identity && review.state == ReviewState::Approved
    });
    if already_approved {
        return AutoApprovalDecision::skip(Some(REASON_BOT_ALREADY_APPROVED));
    }

    AutoApprovalDecision {
        should_approve: true,
        reason: Some(format!(
            "Auto-approved because the PR is labeled {}.",
            matched.iter().map(|label| format!("`{label}`")).join(", ")
        )),
    }
}
