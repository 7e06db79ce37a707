//! Order lifecycle transitions applied to STAC items.
//!
//! Allowed within one run:
//!
//! ```text
//! Orderable/Pending -> Ordered -> Succeeded
//!                         |
//! (any non-terminal) -----+----> Failed
//! ```
//!
//! Succeeded, Failed and Canceled are terminal; transitions out of them
//! are rejected.

use chrono::Utc;
use thiserror::Error;

use super::catalog::ORDER_EXTENSION_URL;
use super::types::{OrderStatus, StacItem};

/// A transition the state machine does not allow.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatusError {
    #[error("invalid order status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}

impl StacItem {
    /// Appends the order-extension schema URL if not already present.
    pub fn ensure_order_extension(&mut self) {
        if !self
            .stac_extensions
            .iter()
            .any(|url| url == ORDER_EXTENSION_URL)
        {
            self.stac_extensions.push(ORDER_EXTENSION_URL.to_string());
        }
    }

    /// Records a successful submission: status becomes Ordered and the
    /// vendor order id is stored.
    pub fn mark_ordered(&mut self, order_id: impl Into<String>) -> Result<(), StatusError> {
        match self.status() {
            OrderStatus::Orderable | OrderStatus::Pending => {
                self.ensure_order_extension();
                self.properties.order_status = OrderStatus::Ordered;
                self.properties.order_id = Some(order_id.into());
                self.properties.failure_reason = None;
                self.properties.updated = Some(Utc::now());
                Ok(())
            }
            from => Err(StatusError::InvalidTransition {
                from,
                to: OrderStatus::Ordered,
            }),
        }
    }

    /// Records delivery: status becomes Succeeded and the publish
    /// timestamp is set. The order id must already be recorded.
    pub fn mark_succeeded(&mut self, order_id: impl Into<String>) -> Result<(), StatusError> {
        match self.status() {
            OrderStatus::Ordered | OrderStatus::Shipping => {
                self.ensure_order_extension();
                let now = Utc::now();
                self.properties.order_status = OrderStatus::Succeeded;
                self.properties.order_id = Some(order_id.into());
                self.properties.failure_reason = None;
                self.properties.updated = Some(now);
                self.properties.published = Some(now);
                Ok(())
            }
            from => Err(StatusError::InvalidTransition {
                from,
                to: OrderStatus::Succeeded,
            }),
        }
    }

    /// Records a failure from any non-terminal state. An order id already
    /// recorded on the item is kept when `order_id` is None, so failures
    /// after submission stay traceable to the vendor order.
    pub fn mark_failed(
        &mut self,
        reason: impl Into<String>,
        order_id: Option<String>,
    ) -> Result<(), StatusError> {
        let from = self.status();
        if from.is_terminal() {
            return Err(StatusError::InvalidTransition {
                from,
                to: OrderStatus::Failed,
            });
        }
        self.ensure_order_extension();
        self.properties.order_status = OrderStatus::Failed;
        if order_id.is_some() {
            self.properties.order_id = order_id;
        }
        self.properties.failure_reason = Some(reason.into());
        self.properties.updated = Some(Utc::now());
        Ok(())
    }
}
