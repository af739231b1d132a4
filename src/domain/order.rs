use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: BigDecimal,
}

/// A delivery order as held by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub is_open: bool,
    pub delivery_time: Option<DateTime<Utc>>,
    pub delivery_address: String,
    pub products: Vec<Product>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields of an order about to be created. The store assigns
/// the identifier and both timestamps.
#[derive(Debug, Clone, Default)]
pub struct NewOrder {
    pub is_open: bool,
    pub delivery_time: Option<DateTime<Utc>>,
    pub delivery_address: String,
    pub products: Vec<Product>,
}

/// Fields to replace on an existing order. `None` leaves the stored value as is.
#[derive(Debug, Clone, Default)]
pub struct OrderChanges {
    pub is_open: Option<bool>,
    /// `Some(None)` unschedules the delivery.
    pub delivery_time: Option<Option<DateTime<Utc>>>,
    pub delivery_address: Option<String>,
    pub products: Option<Vec<Product>>,
}

impl Order {
    pub(crate) fn from_new(id: Uuid, new: NewOrder, now: DateTime<Utc>) -> Self {
        Self {
            id,
            is_open: new.is_open,
            delivery_time: new.delivery_time,
            delivery_address: new.delivery_address,
            products: new.products,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies `changes`, then stamps `updated_at`. The stamp never moves
    /// backwards even if the wall clock does.
    pub(crate) fn apply(&mut self, changes: OrderChanges, now: DateTime<Utc>) {
        if let Some(is_open) = changes.is_open {
            self.is_open = is_open;
        }
        if let Some(delivery_time) = changes.delivery_time {
            self.delivery_time = delivery_time;
        }
        if let Some(address) = changes.delivery_address {
            self.delivery_address = address;
        }
        if let Some(products) = changes.products {
            self.products = products;
        }
        self.updated_at = now.max(self.updated_at);
    }
}
