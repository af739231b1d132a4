use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderChanges};
use crate::domain::ports::OrderRepository;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl<T> From<PoisonError<T>> for DomainError {
    fn from(_: PoisonError<T>) -> Self {
        DomainError::Internal("order store lock poisoned".to_string())
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

/// Orders kept in process memory behind a single lock.
///
/// Every operation holds the lock for its whole duration, so operations are
/// serialized with respect to each other. Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: Mutex<HashMap<Uuid, Order>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, Order>>, DomainError> {
        Ok(self.orders.lock()?)
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn list(&self) -> Result<Vec<Order>, DomainError> {
        let orders = self.lock()?;
        let mut items: Vec<Order> = orders.values().cloned().collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.lock()?.get(&id).cloned())
    }

    fn create(&self, order: NewOrder) -> Result<Uuid, DomainError> {
        let mut orders = self.lock()?;

        // Ids are never reused.
        let mut id = Uuid::new_v4();
        while orders.contains_key(&id) {
            id = Uuid::new_v4();
        }

        orders.insert(id, Order::from_new(id, order, Utc::now()));
        log::debug!("Stored order {} ({} held)", id, orders.len());
        Ok(id)
    }

    fn update(&self, id: Uuid, changes: OrderChanges) -> Result<Option<Order>, DomainError> {
        let mut orders = self.lock()?;

        let Some(order) = orders.get_mut(&id) else {
            log::debug!("Update skipped, order {} not held", id);
            return Ok(None);
        };

        order.apply(changes, Utc::now());
        Ok(Some(order.clone()))
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let removed = self.lock()?.remove(&id).is_some();
        log::debug!("Delete order {}: removed={}", id, removed);
        Ok(removed)
    }
}
