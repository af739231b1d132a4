use std::sync::Arc;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderChanges, Product};
use crate::domain::ports::OrderRepository;

/// Service type shared with the HTTP layer; the repository is picked at startup.
pub type AppOrderService = OrderService<Arc<dyn OrderRepository>>;

pub struct OrderService<R> {
    repo: R,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_orders(&self) -> Result<Vec<Order>, DomainError> {
        self.repo.list()
    }

    pub fn get_order(&self, id: Uuid) -> Result<Order, DomainError> {
        self.repo.find_by_id(id)?.ok_or(DomainError::NotFound)
    }

    pub fn create_order(&self, order: NewOrder) -> Result<Uuid, DomainError> {
        validate_products(&order.products)?;
        self.repo.create(order)
    }

    pub fn update_order(
        &self,
        id: Uuid,
        changes: OrderChanges,
    ) -> Result<Option<Order>, DomainError> {
        if let Some(products) = &changes.products {
            validate_products(products)?;
        }
        self.repo.update(id, changes)
    }

    pub fn delete_order(&self, id: Uuid) -> Result<bool, DomainError> {
        self.repo.delete(id)
    }
}

fn validate_products(products: &[Product]) -> Result<(), DomainError> {
    let zero = BigDecimal::from(0);
    match products.iter().find(|p| p.price < zero) {
        Some(p) => Err(DomainError::InvalidInput(format!(
            "price of '{}' must not be negative, got {}",
            p.name, p.price
        ))),
        None => Ok(()),
    }
}
