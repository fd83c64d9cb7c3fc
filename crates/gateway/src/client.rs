//! MeSomb deposit client.
//!
//! A payout to a user's wallet is a MeSomb *deposit*: the merchant account
//! deposits money on the receiver's mobile-money account.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tandem_core::payout::{PayoutError, PayoutGateway, PayoutInstruction, PayoutReceipt};
use tandem_shared::PayoutConfig;
use tandem_shared::types::Money;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::signature::RequestSigner;

const DEPOSIT_PATH: &str = "/en/api/v1.1/payment/deposit/";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const PRODUCT_CATEGORY: &str = "withdrawal";

#[derive(Debug, Serialize)]
struct DepositRequest<'a> {
    receiver: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    service: &'a str,
    country: &'a str,
    currency: String,
    customer: Customer<'a>,
    products: [Product<'a>; 1],
    location: Location<'a>,
}

#[derive(Debug, Serialize)]
struct Customer<'a> {
    id: String,
    phone: &'a str,
}

#[derive(Debug, Serialize)]
struct Product<'a> {
    name: &'a str,
    category: &'a str,
    quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
}

#[derive(Debug, Serialize)]
struct Location<'a> {
    town: &'a str,
    region: &'a str,
    country: &'a str,
}

#[derive(Debug, Deserialize)]
struct DepositResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    transaction: Option<TransactionBody>,
    #[serde(default)]
    reference: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransactionBody {
    #[serde(default)]
    pk: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Payout gateway backed by the MeSomb API.
#[derive(Clone)]
pub struct MesombClient {
    client: Client,
    deposit_url: Url,
    signer: RequestSigner,
    config: PayoutConfig,
}

impl std::fmt::Debug for MesombClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MesombClient")
            .field("deposit_url", &self.deposit_url.as_str())
            .field("application_key", &self.config.application_key)
            .finish_non_exhaustive()
    }
}

impl MesombClient {
    /// Builds a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `PayoutError::Transport` if the base URL is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: PayoutConfig) -> Result<Self, PayoutError> {
        let deposit_url = Url::parse(&config.base_url)
            .and_then(|base| base.join(DEPOSIT_PATH))
            .map_err(|e| PayoutError::Transport(format!("Invalid payout base URL: {e}")))?;

        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| PayoutError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            deposit_url,
            signer: RequestSigner::new(config.access_key.clone(), config.secret_key.clone()),
            config,
        })
    }

    /// The endpoint deposits are posted to.
    #[must_use]
    pub const fn deposit_url(&self) -> &Url {
        &self.deposit_url
    }

    fn body(&self, instruction: &PayoutInstruction) -> Result<String, PayoutError> {
        let money = Money::new(instruction.amount, self.config.currency);
        let receiver = instruction.destination.receiver.as_str();

        let request = DepositRequest {
            receiver,
            amount: money.amount,
            service: instruction.destination.service.as_str(),
            country: &self.config.country,
            currency: money.currency.to_string(),
            customer: Customer {
                id: instruction.customer_id.to_string(),
                phone: receiver,
            },
            products: [Product {
                name: &self.config.product_name,
                category: PRODUCT_CATEGORY,
                quantity: 1,
                amount: money.amount,
            }],
            location: Location {
                town: &self.config.town,
                region: &self.config.region,
                country: &self.config.country,
            },
        };

        serde_json::to_string(&request).map_err(|e| PayoutError::Transport(e.to_string()))
    }
}

impl PayoutGateway for MesombClient {
    async fn execute_payout(
        &self,
        instruction: &PayoutInstruction,
    ) -> Result<PayoutReceipt, PayoutError> {
        let body = self.body(instruction)?;
        let signed = self.signer.sign_now("POST", &self.deposit_url, &body)?;
        let trx_id = Uuid::now_v7().to_string();

        debug!(
            customer_id = %instruction.customer_id,
            service = %instruction.destination.service,
            trx_id = %trx_id,
            "Sending MeSomb deposit"
        );

        let response = self
            .client
            .post(self.deposit_url.clone())
            .header("Content-Type", "application/json")
            .header("Accept-Language", "en")
            .header("X-MeSomb-Application", &self.config.application_key)
            .header("X-MeSomb-OperationMode", "synchronous")
            .header("X-MeSomb-TrxID", &trx_id)
            .header("X-MeSomb-Date", &signed.timestamp)
            .header("X-MeSomb-Nonce", &signed.nonce)
            .header("Authorization", &signed.authorization)
            .body(body)
            .send()
            .await
            .map_err(|e| send_error(&e))?;

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            // A rejection stays a rejection even without its explanation.
            Err(_) if !status.is_success() => String::new(),
            Err(e) => {
                return Err(PayoutError::UnreadableResponse {
                    status: status.as_u16(),
                    reason: e.to_string(),
                });
            }
        };

        if !status.is_success() {
            let message = error_message(status, &text);
            warn!(status = status.as_u16(), message = %message, "MeSomb rejected deposit");
            return Err(PayoutError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        parse_receipt(status, &text).inspect_err(|e| {
            warn!(trx_id = %trx_id, error = %e, "MeSomb accepted deposit with unreadable body");
        })
    }
}

/// Only failures before the connection was established prove MeSomb never saw
/// the request.
fn send_error(err: &reqwest::Error) -> PayoutError {
    if err.is_connect() || err.is_builder() {
        PayoutError::Transport(err.to_string())
    } else {
        PayoutError::Interrupted(err.to_string())
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|e| e.detail.or(e.message))
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("Unknown error").to_string()
            } else {
                body.trim().to_string()
            }
        })
}

fn parse_receipt(status: StatusCode, text: &str) -> Result<PayoutReceipt, PayoutError> {
    let unreadable = |e: serde_json::Error| PayoutError::UnreadableResponse {
        status: status.as_u16(),
        reason: e.to_string(),
    };
    let raw: serde_json::Value = serde_json::from_str(text).map_err(unreadable)?;
    let parsed: DepositResponse = serde_json::from_value(raw.clone()).map_err(unreadable)?;

    let transaction_success = parsed.success
        && parsed
            .transaction
            .as_ref()
            .and_then(|t| t.status.as_deref())
            == Some("SUCCESS");

    let reference = parsed
        .transaction
        .and_then(|t| t.pk)
        .or(parsed.reference);

    Ok(PayoutReceipt {
        operation_success: parsed.success,
        transaction_success,
        reference,
        message: parsed.message,
        raw,
    })
}
