//! The customer entity.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::id::CustomerId;

/// A customer: store-assigned identity plus a mutable name.
///
/// The "name is never blank" invariant is owned by the request validators, not
/// by this type, so a store can hold whatever it is given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
}

impl Customer {
    pub fn new(id: CustomerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> CustomerId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_shape_is_id_and_name() {
        let customer = Customer::new(CustomerId::new(1), "Ada");
        let value = serde_json::to_value(&customer).unwrap();
        assert_eq!(value, serde_json::json!({ "id": 1, "name": "Ada" }));
    }

    #[test]
    fn rename_keeps_identity() {
        let mut customer = Customer::new(CustomerId::new(9), "old");
        customer.rename("new");
        assert_eq!(customer.id(), CustomerId::new(9));
        assert_eq!(customer.name, "new");
    }
}
