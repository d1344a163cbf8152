//! Reducers for the sponsorship admin contract: offer lifecycle, admin and
//! validator rosters, ad parameters, the two-phase proposal flow, and the
//! protocol-fee / ownership events shared by all protocol contracts.

use alloy_primitives::{Address, U256};

use crate::application::ingest::reducers::fetch;
use crate::domain::errors::ReduceError;
use crate::domain::models::common::{current_proposal_id, offer_parameter_link_id, token_entity_id};
use crate::domain::models::{
    AdOffer, AdOfferParameterLink, AdParameter, AdProposal, AdProposalStatus, ChainEvent,
    CurrentProposal, EntityRecord, EventPayload, FeeParamsForContract,
};
use crate::domain::services::{proposal_state, RevenueAggregator};
use crate::infrastructure::store::EntityStore;
use crate::utils::logging;

pub fn reduce(
    store: &EntityStore,
    event: &ChainEvent,
    aggregator: &RevenueAggregator,
) -> Result<Vec<EntityRecord>, ReduceError> {
    let ts = event.provenance.block_timestamp;
    match &event.payload {
        EventPayload::UpdateOffer {
            offer_id,
            disable,
            name,
            offer_metadata,
            nft_contract,
        } => Ok(update_offer(
            store, event, offer_id, *disable, name, offer_metadata, nft_contract,
        )),
        EventPayload::UpdateOfferAdParameter {
            offer_id,
            ad_parameter,
            enable,
        } => Ok(update_offer_ad_parameter(offer_id, ad_parameter, *enable)),
        EventPayload::UpdateOfferAdmin {
            offer_id,
            admin,
            enable,
        } => Ok(update_roster(store, offer_id, admin, *enable, Roster::Admins)),
        EventPayload::UpdateOfferValidator {
            offer_id,
            validator,
            enable,
        } => Ok(update_roster(
            store,
            offer_id,
            validator,
            *enable,
            Roster::Validators,
        )),
        EventPayload::UpdateAdProposal {
            offer_id,
            token_id,
            proposal_id,
            ad_parameter,
            data,
        } => Ok(update_ad_proposal(
            store, ts, offer_id, token_id, proposal_id, ad_parameter, data,
        )),
        EventPayload::UpdateAdValidation {
            offer_id,
            token_id,
            proposal_id,
            ad_parameter,
            validated,
            reason,
        } => Ok(update_ad_validation(
            store, ts, offer_id, token_id, proposal_id, ad_parameter, *validated, reason,
        )),
        EventPayload::CallWithProtocolFee { currency, fee, .. } => {
            Ok(call_with_protocol_fee(store, event, aggregator, currency, fee))
        }
        EventPayload::FeeUpdate {
            fee_recipient,
            fee_bps,
        } => Ok(vec![EntityRecord::FeeParamsForContract(
            FeeParamsForContract {
                id: event.provenance.emitter,
                fee_recipient: *fee_recipient,
                fee_bps: *fee_bps,
                last_update_timestamp: ts,
            },
        )]),
        EventPayload::OwnershipTransferred { new_owner, .. } => {
            Ok(ownership_transferred(store, event, new_owner))
        }
        other => Err(ReduceError::UnhandledEventKind {
            kind: other.kind_name().to_string(),
        }),
    }
}

/// Creates the offer on first sight, updates it afterwards. The backing NFT
/// contract gets a stub row if the factory event has not arrived.
fn update_offer(
    store: &EntityStore,
    event: &ChainEvent,
    offer_id: &U256,
    disable: bool,
    name: &str,
    offer_metadata: &str,
    nft_contract: &Address,
) -> Vec<EntityRecord> {
    let mut upserts = Vec::new();
    if let Some(stub) = fetch::ensure_nft_contract(store, nft_contract, event.provenance.block_timestamp) {
        upserts.push(stub);
    }

    let id = offer_id.to_string();
    let offer = match fetch::ad_offer(store, &id) {
        Some(mut offer) => {
            offer.disable = disable;
            offer.name = name.to_string();
            offer.metadata_url = offer_metadata.to_string();
            offer.nft_contract = *nft_contract;
            offer
        }
        None => AdOffer {
            id,
            origin: event.provenance.emitter,
            disable,
            name: name.to_string(),
            metadata_url: offer_metadata.to_string(),
            nft_contract: *nft_contract,
            initial_creator: event.provenance.tx_sender,
            creation_timestamp: event.provenance.block_timestamp,
            last_update_timestamp: event.provenance.block_timestamp,
            admins: vec![event.provenance.tx_sender],
            validators: vec![],
        },
    };
    upserts.push(EntityRecord::AdOffer(offer));
    upserts
}

/// Upserts the parameter definition and toggles the (offer, parameter) link.
/// Disabling keeps the row; history stays queryable.
fn update_offer_ad_parameter(
    offer_id: &U256,
    ad_parameter: &str,
    enable: bool,
) -> Vec<EntityRecord> {
    vec![
        EntityRecord::AdParameter(AdParameter::from_id(ad_parameter)),
        EntityRecord::AdOfferParameterLink(AdOfferParameterLink {
            id: offer_parameter_link_id(offer_id, ad_parameter),
            enable,
            ad_offer: offer_id.to_string(),
            ad_parameter: ad_parameter.to_string(),
        }),
    ]
}

enum Roster {
    Admins,
    Validators,
}

fn update_roster(
    store: &EntityStore,
    offer_id: &U256,
    account: &Address,
    enable: bool,
    roster: Roster,
) -> Vec<EntityRecord> {
    let Some(mut offer) = fetch::ad_offer(store, &offer_id.to_string()) else {
        logging::log_warning(&format!(
            "Roster update for unknown offer {}; recording event only",
            offer_id
        ));
        return vec![];
    };
    let list = match roster {
        Roster::Admins => &mut offer.admins,
        Roster::Validators => &mut offer.validators,
    };
    if enable {
        if !list.contains(account) {
            list.push(*account);
        }
    } else {
        list.retain(|a| a != account);
    }
    vec![EntityRecord::AdOffer(offer)]
}

/// NFT contract backing a proposal's offer. The zero address when the offer
/// has not been seen; submission and validation must derive the same key.
fn proposal_token_contract(store: &EntityStore, offer_id: &U256) -> Address {
    fetch::ad_offer(store, &offer_id.to_string())
        .map(|o| o.nft_contract)
        .unwrap_or(Address::ZERO)
}

/// Phase one of the proposal flow: a submission demotes any pending proposal
/// for the slot and installs the new one as `CURRENT_PENDING`. A submission
/// against an offer the store has never seen still creates the slot, the
/// proposal and the token; the `adOffer` reference stays dangling until the
/// offer arrives.
fn update_ad_proposal(
    store: &EntityStore,
    ts: u64,
    offer_id: &U256,
    token_id: &U256,
    proposal_id: &U256,
    ad_parameter: &str,
    data: &str,
) -> Vec<EntityRecord> {
    let contract = proposal_token_contract(store, offer_id);
    if contract == Address::ZERO {
        logging::log_warning(&format!(
            "Proposal {} submitted against unseen offer {}; offer reference left dangling",
            proposal_id, offer_id
        ));
    }

    let mut upserts = Vec::new();
    let token = fetch::token_or_new(store, &contract, token_id, ts);
    let token_entity = token.id.clone();
    upserts.push(EntityRecord::Token(token));

    let slot_id = current_proposal_id(offer_id, token_id, ad_parameter);
    let slot = fetch::current_proposal(store, &slot_id).unwrap_or(CurrentProposal {
        id: slot_id,
        ad_offer: offer_id.to_string(),
        token: token_entity.clone(),
        ad_parameter: ad_parameter.to_string(),
        pending_proposal: None,
        accepted_proposal: None,
        rejected_proposal: None,
    });

    let prior_pending = slot
        .pending_proposal
        .as_deref()
        .and_then(|id| fetch::ad_proposal(store, id));

    let submitted = AdProposal {
        id: proposal_id.to_string(),
        ad_offer: offer_id.to_string(),
        token: token_entity,
        ad_parameter: ad_parameter.to_string(),
        status: AdProposalStatus::CurrentPending,
        data: data.to_string(),
        reject_reason: None,
        creation_timestamp: ts,
        last_update_timestamp: ts,
    };

    let transition = proposal_state::apply_submission(slot, prior_pending, submitted, ts);
    upserts.push(EntityRecord::CurrentProposal(transition.slot));
    upserts.extend(transition.proposals.into_iter().map(EntityRecord::AdProposal));
    upserts
}

/// Phase two: the validation outcome settles the pending proposal into the
/// accepted or rejected slot, demoting the slot's previous occupant.
#[allow(clippy::too_many_arguments)]
fn update_ad_validation(
    store: &EntityStore,
    ts: u64,
    offer_id: &U256,
    token_id: &U256,
    proposal_id: &U256,
    ad_parameter: &str,
    validated: bool,
    reason: &str,
) -> Vec<EntityRecord> {
    let Some(proposal) = fetch::ad_proposal(store, &proposal_id.to_string()) else {
        logging::log_warning(&format!(
            "Validation for unknown proposal {}; recording event only",
            proposal_id
        ));
        return vec![];
    };

    let slot_id = current_proposal_id(offer_id, token_id, ad_parameter);
    let slot = fetch::current_proposal(store, &slot_id).unwrap_or(CurrentProposal {
        id: slot_id,
        ad_offer: offer_id.to_string(),
        token: token_entity_id(&proposal_token_contract(store, offer_id), token_id),
        ad_parameter: ad_parameter.to_string(),
        pending_proposal: None,
        accepted_proposal: None,
        rejected_proposal: None,
    });

    // The slot's previous occupant of the outcome bucket gets demoted
    let prior_occupant = if validated {
        slot.accepted_proposal.as_deref()
    } else {
        slot.rejected_proposal.as_deref()
    }
    .filter(|id| *id != proposal.id)
    .and_then(|id| fetch::ad_proposal(store, id));

    let reason = if reason.is_empty() {
        None
    } else {
        Some(reason.to_string())
    };
    let transition =
        proposal_state::apply_validation(slot, proposal, prior_occupant, validated, reason, ts);

    let mut upserts = vec![EntityRecord::CurrentProposal(transition.slot)];
    upserts.extend(transition.proposals.into_iter().map(EntityRecord::AdProposal));
    upserts
}

/// Protocol fee capture: groups the fee under its revenue transaction and
/// folds it into the epoch bucket. Redelivered fees are skipped by the
/// aggregator, never double-counted.
fn call_with_protocol_fee(
    store: &EntityStore,
    event: &ChainEvent,
    aggregator: &RevenueAggregator,
    currency: &Address,
    fee: &U256,
) -> Vec<EntityRecord> {
    let ts = event.provenance.block_timestamp;
    let mut upserts = vec![fetch::revenue_transaction(
        event.provenance.revenue_transaction_id(),
        ts,
    )];
    if let Some(bucket) = aggregator.apply_fee(store, *currency, *fee, &event.provenance.record_id(), ts) {
        upserts.push(EntityRecord::EpochCurrencyRevenue(bucket));
    }
    upserts
}

/// Ownership handover on an NFT contract; other emitters only get the
/// provenance record.
fn ownership_transferred(
    store: &EntityStore,
    event: &ChainEvent,
    new_owner: &Address,
) -> Vec<EntityRecord> {
    match fetch::nft_contract(store, &event.provenance.emitter) {
        Some(mut contract) => {
            contract.owner = Some(*new_owner);
            vec![EntityRecord::NftContract(contract)]
        }
        None => vec![],
    }
}
