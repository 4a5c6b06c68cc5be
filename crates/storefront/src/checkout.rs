//! Checkout Flow.
//!
//! A submission moves `Idle -> Processing -> Success`. Payment is simulated:
//! after a fixed delay the order is accepted, the cart cleared and a local
//! receipt returned. Status changes are published on a watch channel so a
//! view can follow the flow while the submission is in progress.

use std::time::Duration;

use chrono::{DateTime, Utc};
use lumina_core::{CartLine, CheckoutStatus, Price};
use thiserror::Error;
use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

use crate::gateway::RemoteGateway;
use crate::shop::ShopState;

/// Delay of the simulated payment processor.
pub const DEFAULT_PROCESSING_DELAY: Duration = Duration::from_millis(2000);

/// Errors that can occur when submitting an order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("your cart is empty")]
    EmptyCart,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("an order is already being processed")]
    AlreadyProcessing,
}

/// Shipping form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShippingDetails {
    pub address: String,
    pub city: String,
    pub postal_code: String,
}

impl ShippingDetails {
    /// Check that every field is filled in.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::MissingField`] naming the first blank field.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        for (field, value) in [
            ("address", &self.address),
            ("city", &self.city),
            ("postal code", &self.postal_code),
        ] {
            if value.trim().is_empty() {
                return Err(CheckoutError::MissingField(field));
            }
        }
        Ok(())
    }
}

/// Local record of an accepted order.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutReceipt {
    pub reference: Uuid,
    pub total: Price,
    pub item_count: u32,
    pub lines: Vec<CartLine>,
    pub placed_at: DateTime<Utc>,
}

/// The checkout state machine.
#[derive(Debug)]
pub struct Checkout {
    status: watch::Sender<CheckoutStatus>,
    delay: Duration,
}

impl Default for Checkout {
    fn default() -> Self {
        Self::new(DEFAULT_PROCESSING_DELAY)
    }
}

impl Checkout {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        let (status, _) = watch::channel(CheckoutStatus::Idle);
        Self { status, delay }
    }

    #[must_use]
    pub fn status(&self) -> CheckoutStatus {
        *self.status.borrow()
    }

    /// Follow status changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CheckoutStatus> {
        self.status.subscribe()
    }

    /// Return to `Idle` for a new order. Ignored while processing.
    pub fn reset(&self) {
        self.status.send_if_modified(|status| {
            if matches!(*status, CheckoutStatus::Idle | CheckoutStatus::Processing) {
                return false;
            }
            *status = CheckoutStatus::Idle;
            true
        });
    }

    /// Place an order for the current cart.
    ///
    /// A finished flow is reset first. The request is rejected without leaving
    /// `Idle` when the cart is empty or shipping details are incomplete.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::AlreadyProcessing`], [`CheckoutError::EmptyCart`] or
    /// [`CheckoutError::MissingField`].
    pub async fn submit<G: RemoteGateway>(
        &self,
        shop: &mut ShopState<G>,
        shipping: &ShippingDetails,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        if !self.status().accepts_submission() {
            return Err(CheckoutError::AlreadyProcessing);
        }
        self.reset();

        if shop.cart().is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        shipping.validate()?;

        self.status.send_replace(CheckoutStatus::Processing);
        let receipt = CheckoutReceipt {
            reference: Uuid::new_v4(),
            total: shop.cart_total(),
            item_count: shop.item_count(),
            lines: shop.cart().to_vec(),
            placed_at: Utc::now(),
        };
        info!(
            reference = %receipt.reference,
            total = %receipt.total,
            items = receipt.item_count,
            "Processing order"
        );

        tokio::time::sleep(self.delay).await;

        shop.clear_cart();
        self.status.send_replace(CheckoutStatus::Success);
        info!(reference = %receipt.reference, "Order placed");
        Ok(receipt)
    }
}
