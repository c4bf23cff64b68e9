use super::{RegularCard, Transaction, TransactionRequest, Verdict, WorldRegion};

use std::str::FromStr;

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use rand::RngExt;

use crate::config::TransactionPolicy;
use crate::types::{Amount, CardNumber};

fn create_card(allowed_limit: Amount, manual_processing_limit: Amount) -> Result<RegularCard> {
    Ok(RegularCard {
        number: CardNumber::from_str("4000008449433403")?,
        allowed_limit,
        manual_processing_limit
    })
}

fn timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2022, 1, 22).unwrap().and_hms_opt(16, 2, 0).unwrap()
}

#[test]
fn test_verdict_ordering_matches_strictness() {
    assert!(Verdict::Allowed < Verdict::ManualProcessing);
    assert!(Verdict::ManualProcessing < Verdict::Prohibited);
}

#[test]
fn test_new_card_starts_at_policy_defaults() -> Result<()> {
    let policy = TransactionPolicy::default();
    let card = RegularCard::new(CardNumber::from_str("4000008449433403")?, &policy);

    assert_eq!(card.allowed_limit, 200);
    assert_eq!(card.manual_processing_limit, 1500);

    Ok(())
}

#[test]
fn test_evaluated_transaction_carries_request_fields() -> Result<()> {
    let request = TransactionRequest {
        amount: 150,
        ip: "192.168.1.4".to_string(),
        card_number: CardNumber::from_str("4000008449433403")?,
        region: WorldRegion::Ssa,
        timestamp: timestamp()
    };

    let transaction = Transaction::evaluated(request, Verdict::Allowed, "none".to_string());

    assert_eq!(transaction.id, None);
    assert_eq!(transaction.amount, 150);
    assert_eq!(transaction.verdict, Verdict::Allowed);
    assert_eq!(transaction.explanation, "none");
    assert_eq!(transaction.feedback, None);

    Ok(())
}

#[test]
fn test_stricter_feedback_on_allowed_verdict_tightens_allowed_limit() -> Result<()> {
    let policy = TransactionPolicy::default();
    let mut card = create_card(200, 1500)?;

    card.register_feedback(Verdict::Allowed, Verdict::ManualProcessing, &policy)?;

    assert_eq!(card.allowed_limit, 160);
    assert_eq!(card.manual_processing_limit, 1500);

    Ok(())
}

#[test]
fn test_prohibited_feedback_on_allowed_verdict_tightens_both_limits() -> Result<()> {
    let policy = TransactionPolicy::default();
    let mut card = create_card(200, 1500)?;

    card.register_feedback(Verdict::Allowed, Verdict::Prohibited, &policy)?;

    assert_eq!(card.allowed_limit, 160);
    assert_eq!(card.manual_processing_limit, 1200);

    Ok(())
}

#[test]
fn test_prohibited_feedback_on_manual_verdict_tightens_manual_limit() -> Result<()> {
    let policy = TransactionPolicy::default();
    let mut card = create_card(200, 1500)?;

    card.register_feedback(Verdict::ManualProcessing, Verdict::Prohibited, &policy)?;

    assert_eq!(card.allowed_limit, 200);
    assert_eq!(card.manual_processing_limit, 1200);

    Ok(())
}

#[test]
fn test_allowed_feedback_on_manual_verdict_loosens_allowed_limit() -> Result<()> {
    let policy = TransactionPolicy::default();
    let mut card = create_card(200, 1500)?;

    card.register_feedback(Verdict::ManualProcessing, Verdict::Allowed, &policy)?;

    assert_eq!(card.allowed_limit, 360);
    assert_eq!(card.manual_processing_limit, 1500);

    Ok(())
}

#[test]
fn test_allowed_feedback_on_prohibited_verdict_loosens_both_limits() -> Result<()> {
    let policy = TransactionPolicy::default();
    let mut card = create_card(200, 1500)?;

    card.register_feedback(Verdict::Prohibited, Verdict::Allowed, &policy)?;

    assert_eq!(card.allowed_limit, 360);
    assert_eq!(card.manual_processing_limit, 2700);

    Ok(())
}

#[test]
fn test_manual_feedback_on_prohibited_verdict_loosens_manual_limit() -> Result<()> {
    let policy = TransactionPolicy::default();
    let mut card = create_card(200, 1500)?;

    card.register_feedback(Verdict::Prohibited, Verdict::ManualProcessing, &policy)?;

    assert_eq!(card.allowed_limit, 200);
    assert_eq!(card.manual_processing_limit, 2700);

    Ok(())
}

#[test]
fn test_adjustment_rounds_the_delta_up() -> Result<()> {
    let policy = TransactionPolicy::default();

    // ceil(3 * 0.2) = 1
    let mut tightened = create_card(3, 1500)?;
    tightened.register_feedback(Verdict::Allowed, Verdict::ManualProcessing, &policy)?;
    assert_eq!(tightened.allowed_limit, 2);

    // ceil(3 * 0.8) = 3
    let mut loosened = create_card(3, 1500)?;
    loosened.register_feedback(Verdict::ManualProcessing, Verdict::Allowed, &policy)?;
    assert_eq!(loosened.allowed_limit, 6);

    Ok(())
}

#[test]
fn test_clamp_restores_limit_ordering_after_adjustment() -> Result<()> {
    let policy = TransactionPolicy::default();
    let mut card = create_card(100, 101)?;

    card.register_feedback(Verdict::ManualProcessing, Verdict::Allowed, &policy)?;

    assert_eq!(card.allowed_limit, 180);
    assert_eq!(card.manual_processing_limit, 181);

    Ok(())
}

#[test]
fn test_random_feedback_sequences_preserve_limit_invariant() -> Result<()> {
    let transitions = [
        (Verdict::Allowed, Verdict::ManualProcessing),
        (Verdict::Allowed, Verdict::Prohibited),
        (Verdict::ManualProcessing, Verdict::Prohibited),
        (Verdict::ManualProcessing, Verdict::Allowed),
        (Verdict::Prohibited, Verdict::Allowed),
        (Verdict::Prohibited, Verdict::ManualProcessing),
    ];

    let policy = TransactionPolicy::default();
    let mut rng = rand::rng();
    let mut card = create_card(200, 1500)?;

    for _ in 0..250 {
        // Keep the random walk inside u64 range
        if card.manual_processing_limit > 1_000_000_000 {
            card = create_card(200, 1500)?;
        }

        let (verdict, feedback) = transitions[rng.random_range(0..transitions.len())];
        card.register_feedback(verdict, feedback, &policy)?;

        assert!(card.manual_processing_limit > card.allowed_limit);
    }

    Ok(())
}
