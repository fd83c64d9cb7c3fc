//! Payout domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tandem_shared::types::UserId;

use super::phone::normalize_cameroon_mobile;

/// Supported mobile-money payout rails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PayoutService {
    /// MTN Mobile Money
    Mtn,
    /// Orange Money
    Orange,
}

impl PayoutService {
    /// Provider code for this rail.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mtn => "MTN",
            Self::Orange => "ORANGE",
        }
    }

    /// Validates a receiver for this rail and returns its canonical form.
    #[must_use]
    pub fn normalize_receiver(self, raw: &str) -> Option<String> {
        match self {
            Self::Mtn | Self::Orange => normalize_cameroon_mobile(raw),
        }
    }
}

impl std::fmt::Display for PayoutService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PayoutService {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MTN" => Ok(Self::Mtn),
            "ORANGE" => Ok(Self::Orange),
            _ => Err(format!("Unknown payout service: {s}")),
        }
    }
}

/// Where a payout is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutDestination {
    /// Payout rail.
    pub service: PayoutService,
    /// Receiver phone number.
    pub receiver: String,
}

impl PayoutDestination {
    /// Creates a destination without validating it.
    #[must_use]
    pub fn new(service: PayoutService, receiver: impl Into<String>) -> Self {
        Self {
            service,
            receiver: receiver.into(),
        }
    }

    /// Returns the destination with its receiver in canonical form, or `None`
    /// if the receiver is not valid for the rail.
    #[must_use]
    pub fn normalized(&self) -> Option<Self> {
        self.service
            .normalize_receiver(&self.receiver)
            .map(|receiver| Self::new(self.service, receiver))
    }
}

/// A validated, authorized payout handed to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutInstruction {
    /// Amount to send.
    pub amount: Decimal,
    /// Validated destination.
    pub destination: PayoutDestination,
    /// User the payout is made for, used as customer correlation data.
    pub customer_id: UserId,
}

/// What the gateway reported for a payout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutReceipt {
    /// The provider accepted and processed the operation.
    pub operation_success: bool,
    /// The funds transfer completed.
    pub transaction_success: bool,
    /// Provider transaction reference, when one was issued.
    pub reference: Option<String>,
    /// Provider message, when one was returned.
    pub message: Option<String>,
    /// Raw provider response.
    pub raw: serde_json::Value,
}
