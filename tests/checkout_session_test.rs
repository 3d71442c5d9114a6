use anyhow::Result;
use order_checkout::domain::model::SubmissionReceipt;
use order_checkout::{
    CheckoutConfig, CheckoutError, CheckoutSession, Field, FieldEdit, FormState, PaymentMethod,
    SimulatedGateway,
};
use serde_json::json;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn fast_gateway() -> SimulatedGateway {
    SimulatedGateway::new(Duration::from_millis(1))
}

fn fill_card_order(session: &mut CheckoutSession<Vec<order_checkout::Product>>) {
    session.apply(FieldEdit::ToggleProduct("p1".to_string()));
    session.apply(FieldEdit::Quantity {
        product_id: "p1".to_string(),
        value: json!("2"),
    });
    session.apply(FieldEdit::Address("Almaty, Abay st. 10".to_string()));
    session.apply(FieldEdit::PaymentMethod(PaymentMethod::Card));
    session.apply(FieldEdit::CardNumber("4242424242424242".to_string()));
    session.apply(FieldEdit::CardExpiry("09/25".to_string()));
    session.apply(FieldEdit::CardCvv("123".to_string()));
}

#[test]
fn test_errors_recomputed_after_each_edit() {
    let mut session = CheckoutSession::from_config(&CheckoutConfig::default());
    assert!(session.errors().contains(Field::PaymentMethod));

    session.apply(FieldEdit::PaymentMethod(PaymentMethod::Card));
    assert!(!session.errors().contains(Field::PaymentMethod));
    assert!(session.errors().contains(Field::CardNumber));

    session.apply(FieldEdit::PaymentMethod(PaymentMethod::Cash));
    assert!(!session.errors().contains(Field::CardNumber));

    session.apply(FieldEdit::ToggleProduct("p3".to_string()));
    assert!(session.errors().contains(Field::Quantities));

    session.apply(FieldEdit::ToggleProduct("p3".to_string()));
    assert!(!session.errors().contains(Field::Quantities));
}

#[tokio::test]
async fn test_invalid_form_blocks_submission() {
    let mut session = CheckoutSession::from_config(&CheckoutConfig::default());
    session.apply(FieldEdit::PaymentMethod(PaymentMethod::Card));
    session.apply(FieldEdit::CardNumber("4242424299909242".to_string()));

    let err = session.submit(&fast_gateway()).await.unwrap_err();
    match err {
        CheckoutError::SubmissionBlocked { errors } => {
            assert!(errors.contains(Field::CardNumber));
            assert!(errors.contains(Field::Address));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // State is kept so the user can correct it.
    assert_eq!(session.state().card_number, "4242424299909242");
}

#[tokio::test]
async fn test_valid_submission_resets_form() -> Result<()> {
    let mut session = CheckoutSession::from_config(&CheckoutConfig::default());
    fill_card_order(&mut session);
    assert!(session.errors().is_valid());
    assert_eq!(session.preview().number, "4242 4242 4242 4242");

    let receipt: SubmissionReceipt = session.submit(&fast_gateway()).await?;
    assert_eq!(receipt.item_count, 1);

    assert_eq!(session.state(), &FormState::default());
    assert_eq!(session.preview().number, "#### #### #### ####");
    Ok(())
}

#[test]
fn test_submission_with_blocking_runtime() -> Result<()> {
    let mut session = CheckoutSession::from_config(&CheckoutConfig::default());
    session.load(FormState::from_value(json!({
        "paymentMethod": "online",
        "address": "Astana",
        "selectedProducts": ["p2", "p3"],
        "quantities": { "p2": 1, "p3": "4" }
    }))?);

    let receipt = tokio_test::block_on(session.submit(&fast_gateway()))?;
    assert_eq!(receipt.item_count, 2);
    Ok(())
}

#[test]
fn test_session_built_from_config_file() -> Result<()> {
    let mut temp_file = NamedTempFile::new()?;
    temp_file.write_all(
        br#"
[catalog]
products = [{ id = "tv", name = "Television" }]

[preview]
number = "0000 0000 0000 0000"

[messages]
address_required = "Address, please"
"#,
    )?;

    let config = CheckoutConfig::from_file(temp_file.path())?;
    let mut session = CheckoutSession::from_config(&config);

    assert_eq!(session.preview().number, "0000 0000 0000 0000");
    assert_eq!(session.errors().get(Field::Address), Some("Address, please"));

    session.apply(FieldEdit::ToggleProduct("tv".to_string()));
    assert_eq!(session.quantity_inputs()[0].name, Some("Television"));
    Ok(())
}

#[test]
fn test_malformed_quantities_rejected_at_boundary() {
    let err = FormState::from_json(r#"{ "quantities": "p1=2" }"#).unwrap_err();
    assert!(matches!(err, CheckoutError::ContractViolation { .. }));
}
