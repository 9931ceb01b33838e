use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use twinapi_core::{Customer, CustomerId, DomainError, DomainResult};

/// Keyed customer storage.
///
/// Handlers depend on this trait only, so a durable backend can replace the
/// in-memory one without changing any handler contract. Name validity is not
/// checked here.
pub trait CustomerStore: Send + Sync {
    fn get(&self, id: CustomerId) -> Option<Customer>;
    /// Customers in insertion order, skipping `offset` and yielding at most `limit`.
    fn list(&self, offset: usize, limit: usize) -> Vec<Customer>;
    /// Store a new customer under the next free identity.
    fn insert(&self, name: String) -> Customer;
    fn update(&self, id: CustomerId, name: String) -> DomainResult<Customer>;
    fn delete(&self, id: CustomerId) -> DomainResult<Customer>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S> CustomerStore for Arc<S>
where
    S: CustomerStore + ?Sized,
{
    fn get(&self, id: CustomerId) -> Option<Customer> {
        (**self).get(id)
    }

    fn list(&self, offset: usize, limit: usize) -> Vec<Customer> {
        (**self).list(offset, limit)
    }

    fn insert(&self, name: String) -> Customer {
        (**self).insert(name)
    }

    fn update(&self, id: CustomerId, name: String) -> DomainResult<Customer> {
        (**self).update(id, name)
    }

    fn delete(&self, id: CustomerId) -> DomainResult<Customer> {
        (**self).delete(id)
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}

#[derive(Debug)]
struct State {
    // Identities are allocated in increasing order, so key order is insertion order.
    rows: BTreeMap<CustomerId, Customer>,
    last_id: CustomerId,
}

/// Process-lifetime store backed by an ordered map.
#[derive(Debug)]
pub struct InMemoryCustomerStore {
    inner: RwLock<State>,
}

impl InMemoryCustomerStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(State {
                rows: BTreeMap::new(),
                last_id: CustomerId::new(0),
            }),
        }
    }
}

impl Default for InMemoryCustomerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomerStore for InMemoryCustomerStore {
    fn get(&self, id: CustomerId) -> Option<Customer> {
        let state = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        state.rows.get(&id).cloned()
    }

    fn list(&self, offset: usize, limit: usize) -> Vec<Customer> {
        let state = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        state.rows.values().skip(offset).take(limit).cloned().collect()
    }

    fn insert(&self, name: String) -> Customer {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let id = state.last_id.next();
        state.last_id = id;

        let customer = Customer::new(id, name);
        state.rows.insert(id, customer.clone());
        customer
    }

    fn update(&self, id: CustomerId, name: String) -> DomainResult<Customer> {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let customer = state.rows.get_mut(&id).ok_or_else(DomainError::not_found)?;
        customer.rename(name);
        Ok(customer.clone())
    }

    fn delete(&self, id: CustomerId) -> DomainResult<Customer> {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        state.rows.remove(&id).ok_or_else(DomainError::not_found)
    }

    fn len(&self) -> usize {
        let state = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        state.rows.len()
    }
}
