//! State machine for one sponsorship slot.
//!
//! Each (offer, token, parameter) triple owns a `CurrentProposal` row whose
//! pending/accepted/rejected pointers move in two phases: a submission
//! demotes the previous pending proposal and installs the new one as
//! `CURRENT_PENDING`; a validation outcome moves the pending proposal into
//! the accepted or rejected slot, demoting whatever held that slot before.
//! Demotion is one-way: a proposal never returns to a `CURRENT_*` bucket.

use crate::domain::models::{AdProposal, AdProposalStatus, CurrentProposal};

/// Result of one slot transition: the updated slot row plus every proposal
/// whose status changed.
#[derive(Debug)]
pub struct SlotTransition {
    pub slot: CurrentProposal,
    pub proposals: Vec<AdProposal>,
}

/// A new proposal arrives for the slot. Any prior pending proposal is
/// demoted to `PREV_PENDING`; the new one takes the pending pointer.
pub fn apply_submission(
    mut slot: CurrentProposal,
    prior_pending: Option<AdProposal>,
    mut submitted: AdProposal,
    timestamp: u64,
) -> SlotTransition {
    let mut proposals = Vec::new();

    if let Some(mut prior) = prior_pending {
        prior.status = prior.status.demoted();
        prior.last_update_timestamp = timestamp;
        proposals.push(prior);
    }

    submitted.status = AdProposalStatus::CurrentPending;
    submitted.last_update_timestamp = timestamp;
    slot.pending_proposal = Some(submitted.id.clone());
    proposals.push(submitted);

    SlotTransition { slot, proposals }
}

/// A validator settles the pending proposal. Acceptance moves it into the
/// accepted slot (demoting the previous occupant); rejection records it in
/// the rejected slot without clearing accepted history. Either way the
/// pending pointer is cleared.
pub fn apply_validation(
    mut slot: CurrentProposal,
    mut pending: AdProposal,
    prior_occupant: Option<AdProposal>,
    validated: bool,
    reason: Option<String>,
    timestamp: u64,
) -> SlotTransition {
    let mut proposals = Vec::new();

    if let Some(mut prior) = prior_occupant {
        prior.status = prior.status.demoted();
        prior.last_update_timestamp = timestamp;
        proposals.push(prior);
    }

    if validated {
        pending.status = AdProposalStatus::CurrentAccepted;
        slot.accepted_proposal = Some(pending.id.clone());
    } else {
        pending.status = AdProposalStatus::CurrentRejected;
        pending.reject_reason = reason;
        slot.rejected_proposal = Some(pending.id.clone());
    }
    pending.last_update_timestamp = timestamp;
    slot.pending_proposal = None;
    proposals.push(pending);

    SlotTransition { slot, proposals }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot() -> CurrentProposal {
        CurrentProposal {
            id: "1-1-imageURL".into(),
            ad_offer: "1".into(),
            token: "0xaa-1".into(),
            ad_parameter: "imageURL".into(),
            pending_proposal: None,
            accepted_proposal: None,
            rejected_proposal: None,
        }
    }

    fn proposal(id: &str, status: AdProposalStatus) -> AdProposal {
        AdProposal {
            id: id.to_string(),
            ad_offer: "1".into(),
            token: "0xaa-1".into(),
            ad_parameter: "imageURL".into(),
            status,
            data: "ipfs://data".into(),
            reject_reason: None,
            creation_timestamp: 1000,
            last_update_timestamp: 1000,
        }
    }

    #[test]
    fn submission_installs_pending() {
        let t = apply_submission(
            slot(),
            None,
            proposal("5", AdProposalStatus::CurrentPending),
            1000,
        );
        assert_eq!(t.slot.pending_proposal.as_deref(), Some("5"));
        assert_eq!(t.proposals.len(), 1);
        assert_eq!(t.proposals[0].status, AdProposalStatus::CurrentPending);
    }

    #[test]
    fn new_submission_demotes_prior_pending() {
        let t = apply_submission(
            slot(),
            Some(proposal("5", AdProposalStatus::CurrentPending)),
            proposal("6", AdProposalStatus::CurrentPending),
            1100,
        );
        assert_eq!(t.slot.pending_proposal.as_deref(), Some("6"));
        let prior = t.proposals.iter().find(|p| p.id == "5").unwrap();
        assert_eq!(prior.status, AdProposalStatus::PrevPending);
    }

    #[test]
    fn acceptance_fills_accepted_and_clears_pending() {
        let mut s = slot();
        s.pending_proposal = Some("5".into());
        let t = apply_validation(
            s,
            proposal("5", AdProposalStatus::CurrentPending),
            None,
            true,
            None,
            1100,
        );
        assert_eq!(t.slot.accepted_proposal.as_deref(), Some("5"));
        assert_eq!(t.slot.pending_proposal, None);
        assert_eq!(t.proposals[0].status, AdProposalStatus::CurrentAccepted);
    }

    #[test]
    fn acceptance_demotes_previous_occupant() {
        let mut s = slot();
        s.pending_proposal = Some("6".into());
        s.accepted_proposal = Some("5".into());
        let t = apply_validation(
            s,
            proposal("6", AdProposalStatus::CurrentPending),
            Some(proposal("5", AdProposalStatus::CurrentAccepted)),
            true,
            None,
            1200,
        );
        assert_eq!(t.slot.accepted_proposal.as_deref(), Some("6"));
        let prior = t.proposals.iter().find(|p| p.id == "5").unwrap();
        assert_eq!(prior.status, AdProposalStatus::PrevAccepted);
    }

    #[test]
    fn rejection_keeps_accepted_history() {
        let mut s = slot();
        s.pending_proposal = Some("6".into());
        s.accepted_proposal = Some("5".into());
        let t = apply_validation(
            s,
            proposal("6", AdProposalStatus::CurrentPending),
            None,
            false,
            Some("off brand".into()),
            1200,
        );
        assert_eq!(t.slot.rejected_proposal.as_deref(), Some("6"));
        // Rejection does not clear the accepted slot
        assert_eq!(t.slot.accepted_proposal.as_deref(), Some("5"));
        assert_eq!(t.slot.pending_proposal, None);
        let rejected = &t.proposals[0];
        assert_eq!(rejected.status, AdProposalStatus::CurrentRejected);
        assert_eq!(rejected.reject_reason.as_deref(), Some("off brand"));
    }

    #[test]
    fn demotion_never_regresses() {
        // Once demoted, a proposal fed back through a transition keeps its
        // PREV_* bucket rather than re-entering CURRENT_*
        let demoted = proposal("5", AdProposalStatus::PrevAccepted);
        let t = apply_validation(
            slot(),
            proposal("6", AdProposalStatus::CurrentPending),
            Some(demoted),
            true,
            None,
            1300,
        );
        let prior = t.proposals.iter().find(|p| p.id == "5").unwrap();
        assert_eq!(prior.status, AdProposalStatus::PrevAccepted);
    }
}
