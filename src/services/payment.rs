//! Payment gateway seam.
//!
//! The wizard only needs a charge that either yields a receipt or declines.
//! The trait keeps the real processor swappable; the stub implementation
//! validates card shape locally and issues synthetic tokens.

use futures::future::BoxFuture;
use thiserror::Error;
use uuid::Uuid;

use crate::state::draft::PaymentReceipt;

/// Card details submitted at the payment step.
#[derive(Debug, Clone)]
pub struct CardDetails {
    /// Primary account number, digits only after normalization.
    pub number: String,
    /// Expiry month, 1 through 12.
    pub expiry_month: u8,
    /// Four-digit expiry year.
    pub expiry_year: u16,
    /// Card verification code.
    pub cvc: String,
    /// Name as printed on the card.
    pub cardholder: String,
}

/// Why a charge did not produce a receipt.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaymentError {
    /// The card details are malformed and were never sent for processing.
    #[error("invalid card details: {0}")]
    InvalidCard(String),
    /// The processor refused the charge.
    #[error("payment declined: {0}")]
    Declined(String),
}

/// A payment processor able to charge a card for a session.
pub trait PaymentGateway: Send + Sync {
    /// Charge `amount_pence` against the given card.
    fn charge(
        &self,
        card: CardDetails,
        amount_pence: u32,
    ) -> BoxFuture<'static, Result<PaymentReceipt, PaymentError>>;
}

/// Offline gateway used until a real processor is wired in. Accepts any
/// well-formed card and mints a synthetic receipt token.
#[derive(Debug, Clone, Default)]
pub struct StubGateway;

impl StubGateway {
    fn validate(card: &CardDetails) -> Result<String, PaymentError> {
        let digits: String = card.number.chars().filter(|c| !c.is_whitespace()).collect();
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(PaymentError::InvalidCard(
                "card number must contain digits only".into(),
            ));
        }
        if !(12..=19).contains(&digits.len()) {
            return Err(PaymentError::InvalidCard(
                "card number must be 12 to 19 digits".into(),
            ));
        }
        if !(3..=4).contains(&card.cvc.len()) || !card.cvc.chars().all(|c| c.is_ascii_digit()) {
            return Err(PaymentError::InvalidCard("security code must be 3 or 4 digits".into()));
        }
        if !(1..=12).contains(&card.expiry_month) {
            return Err(PaymentError::InvalidCard("expiry month out of range".into()));
        }
        if card.cardholder.trim().is_empty() {
            return Err(PaymentError::InvalidCard("cardholder name is required".into()));
        }
        Ok(digits)
    }
}

impl PaymentGateway for StubGateway {
    fn charge(
        &self,
        card: CardDetails,
        amount_pence: u32,
    ) -> BoxFuture<'static, Result<PaymentReceipt, PaymentError>> {
        Box::pin(async move {
            let digits = Self::validate(&card)?;
            let last4 = digits
                .get(digits.len() - 4..)
                .unwrap_or(digits.as_str())
                .to_string();
            Ok(PaymentReceipt {
                token: format!("pay_{}", Uuid::new_v4()),
                card_last4: last4,
                amount_pence,
            })
        })
    }
}
