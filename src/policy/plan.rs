use crate::policy::{
    count_approvals_with, decide_assignment, decide_auto_approval, has_sufficient_approvals,
    required_approvals, ApprovalCounting, EventType, PolicySnapshot,
};
use crate::utils::text::pluralize;

/// A single action that should be performed as a result of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Assign the given user to the PR.
    Assign { user: String },
    /// The PR does not have enough approvals, the run should fail.
    Block { required: u32, actual: u32 },
    /// Submit an approving review with the given message.
    Approve { message: String },
    /// Nothing to do, only log the reason.
    NoOp { reason: String },
}

/// Composes the policy engine into the ordered list of decisions for a single run.
///
/// An approval submitted by this run counts towards the approval gate.
pub fn plan(
    snapshot: &PolicySnapshot,
    automation_login: &str,
    counting: ApprovalCounting,
) -> Vec<Decision> {
    if let EventType::Unrecognized(name) = &snapshot.event_type {
        return vec![Decision::NoOp {
            reason: format!("unrecognized event type `{name}`"),
        }];
    }

    let mut decisions = vec![];
    if decide_assignment(&snapshot.event_type).perform_assignment {
        decisions.push(Decision::Assign {
            user: snapshot.actor_login.clone(),
        });
    }

    let auto_approval =
        decide_auto_approval(&snapshot.labels, &snapshot.reviews, automation_login);
    let mut actual = count_approvals_with(&snapshot.reviews, counting);
    match (auto_approval.should_approve, auto_approval.reason) {
        (true, reason) => {
            decisions.push(Decision::Approve {
                message: reason.unwrap_or_default(),
            });
            actual += 1;
        }
        (false, Some(reason)) => decisions.push(Decision::NoOp { reason }),
        (false, None) => {}
    }

    let required = required_approvals(&snapshot.labels);
    if has_sufficient_approvals(required, actual) {
        decisions.push(Decision::NoOp {
            reason: format!(
                "{actual} of {required} required {} present",
                pluralize("approval", required as usize)
            ),
        });
    } else {
        decisions.push(Decision::Block { required, actual });
    }
    decisions
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::github::{Review, ReviewState};
    use crate::policy::{plan, ApprovalCounting, Decision, EventType, PolicySnapshot};

    const BOT: &str = "github-actions[bot]";

    fn snapshot(
        event_type: EventType,
        labels: &[&str],
        reviews: &[(&str, ReviewState)],
    ) -> PolicySnapshot {
        PolicySnapshot {
            event_type,
            actor_login: "author".to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect::<BTreeSet<_>>(),
            reviews: reviews
                .iter()
                .map(|(author, state)| Review {
                    author_login: author.to_string(),
                    state: *state,
                })
                .collect(),
        }
    }

    fn run(snapshot: &PolicySnapshot) -> Vec<Decision> {
        plan(snapshot, BOT, ApprovalCounting::Raw)
    }

    #[test]
    fn opened_without_labels() {
        insta::assert_debug_snapshot!(run(&snapshot(EventType::Opened, &[], &[])), @r###"
        [
            Assign {
                user: "author",
            },
            Block {
                required: 2,
                actual: 0,
            },
        ]
        "###);
    }

    #[test]
    fn opened_hotfix_is_approved_but_still_blocked() {
        insta::assert_debug_snapshot!(run(&snapshot(EventType::Opened, &["hotfix"], &[])), @r###"
        [
            Assign {
                user: "author",
            },
            Approve {
                message: "Auto-approved because the PR is labeled `hotfix`.",
            },
            Block {
                required: 2,
                actual: 1,
            },
        ]
        "###);
    }

    #[test]
    fn labeled_documentation_is_approved_and_passes() {
        let decisions = run(&snapshot(EventType::Labeled, &["documentation"], &[]));
        insta::assert_debug_snapshot!(decisions, @r###"
        [
            Approve {
                message: "Auto-approved because the PR is labeled `documentation`.",
            },
            NoOp {
                reason: "1 of 1 required approval present",
            },
        ]
        "###);
    }

    #[test]
    fn submitted_with_bot_approval() {
        let decisions = run(&snapshot(
            EventType::Submitted,
            &["hotfix"],
            &[(BOT, ReviewState::Approved), ("alice", ReviewState::Approved)],
        ));
        insta::assert_debug_snapshot!(decisions, @r###"
        [
            NoOp {
                reason: "sufficient approvals already present",
            },
            NoOp {
                reason: "2 of 2 required approvals present",
            },
        ]
        "###);
    }

    #[test]
    fn repeated_trigger_does_not_approve_twice() {
        let decisions = run(&snapshot(
            EventType::Edited,
            &["hotfix"],
            &[(BOT, ReviewState::Approved)],
        ));
        assert_eq!(
            decisions,
            vec![
                Decision::NoOp {
                    reason: "bot already approved".to_string()
                },
                Decision::Block {
                    required: 2,
                    actual: 1
                }
            ]
        );
    }

    #[test]
    fn unrecognized_event_does_nothing() {
        let decisions = run(&snapshot(
            EventType::Unrecognized("synchronize".to_string()),
            &["hotfix"],
            &[],
        ));
        assert_eq!(
            decisions,
            vec![Decision::NoOp {
                reason: "unrecognized event type `synchronize`".to_string()
            }]
        );
    }

    #[test]
    fn latest_per_reviewer_counting_applies_to_gate() {
        let snapshot = snapshot(
            EventType::Submitted,
            &[],
            &[("alice", ReviewState::Approved), ("alice", ReviewState::Approved)],
        );
        assert_eq!(
            plan(&snapshot, BOT, ApprovalCounting::LatestPerReviewer).last(),
            Some(&Decision::Block {
                required: 2,
                actual: 1
            })
        );
        assert_eq!(
            plan(&snapshot, BOT, ApprovalCounting::Raw).last(),
            Some(&Decision::NoOp {
                reason: "2 of 2 required approvals present".to_string()
            })
        );
    }
}
