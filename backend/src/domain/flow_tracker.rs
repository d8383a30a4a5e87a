//! Phase gates over participant flow status.
//!
//! A gate passes only when at least one active participant exists and every
//! active participant satisfies the condition. Pending and declined invitees
//! never count.

use std::collections::BTreeSet;

use super::{FlowStatus, InviteStatus, Participant, UserId};

/// Accepted participants only.
pub fn active(participants: &[Participant]) -> impl Iterator<Item = &Participant> {
    participants.iter().filter(|p| p.is_active())
}

/// Ids of every accepted participant.
pub fn active_ids(participants: &[Participant]) -> Vec<UserId> {
    active(participants).map(|p| p.user_id.clone()).collect()
}

/// Whether every active participant is at `required`.
///
/// # Examples
///
/// ```rust
/// use backend::domain::{FlowStatus, has_everyone_reached};
///
/// assert!(!has_everyone_reached(&[], FlowStatus::SubmittedConfirmTime));
/// ```
pub fn has_everyone_reached(participants: &[Participant], required: FlowStatus) -> bool {
    let mut members = active(participants).peekable();
    members.peek().is_some() && members.all(|p| p.flow == required)
}

/// Whether the number of distinct active voters equals the number of active
/// participants.
pub fn has_everyone_voted<'a>(
    participants: &[Participant],
    voters: impl IntoIterator<Item = &'a UserId>,
) -> bool {
    let active: BTreeSet<&UserId> = active(participants).map(|p| &p.user_id).collect();
    if active.is_empty() {
        return false;
    }
    let voted = voters
        .into_iter()
        .filter(|voter| active.contains(voter))
        .collect::<BTreeSet<_>>();
    voted.len() == active.len()
}

/// Whether no invitation is still awaiting a response.
pub fn invites_settled(participants: &[Participant]) -> bool {
    participants
        .iter()
        .all(|p| p.invite != InviteStatus::Pending)
}

/// Whether the creator is the only accepted participant left.
pub fn only_creator_remains(participants: &[Participant], creator: &UserId) -> bool {
    let remaining = active_ids(participants);
    remaining.is_empty() || remaining.as_slice() == std::slice::from_ref(creator)
}
