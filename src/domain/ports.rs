use std::sync::Arc;

use uuid::Uuid;

use super::errors::DomainError;
use super::order::{NewOrder, Order, OrderChanges};

pub trait OrderRepository: Send + Sync + 'static {
    fn list(&self) -> Result<Vec<Order>, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    fn create(&self, order: NewOrder) -> Result<Uuid, DomainError>;
    /// Returns `None` when no order has this id; nothing is changed then.
    fn update(&self, id: Uuid, changes: OrderChanges) -> Result<Option<Order>, DomainError>;
    /// Returns whether an order was removed.
    fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}

impl<T: OrderRepository + ?Sized> OrderRepository for Arc<T> {
    fn list(&self) -> Result<Vec<Order>, DomainError> {
        (**self).list()
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        (**self).find_by_id(id)
    }

    fn create(&self, order: NewOrder) -> Result<Uuid, DomainError> {
        (**self).create(order)
    }

    fn update(&self, id: Uuid, changes: OrderChanges) -> Result<Option<Order>, DomainError> {
        (**self).update(id, changes)
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        (**self).delete(id)
    }
}
