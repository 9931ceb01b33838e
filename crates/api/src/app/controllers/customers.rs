use std::sync::Arc;

use twinapi_core::CustomerId;
use twinapi_infra::CustomerStore;

use crate::app::dto::{
    CreateCustomerRequest, PageQuery, UpdateCustomerRequest, DEFAULT_PAGE, DEFAULT_PAGE_SIZE,
};
use crate::binding::Parameter;
use crate::mvc::{ActionDescriptor, ActionResult, Controller};

/// Customers as controller actions mounted under `/controller/customers`.
pub struct CustomersController {
    store: Arc<dyn CustomerStore>,
}

impl CustomersController {
    pub fn new(store: Arc<dyn CustomerStore>) -> Self {
        Self { store }
    }

    /// Retrieve customers by page.
    pub fn get_all(&self, page: i64, page_size: i64) -> ActionResult {
        let page = PageQuery::new(page, page_size);
        ActionResult::ok(&self.store.list(page.offset(), page.limit()))
    }

    /// Retrieve customer by ID.
    pub fn get(&self, id: CustomerId) -> ActionResult {
        match self.store.get(id) {
            Some(customer) => ActionResult::ok(&customer),
            None => ActionResult::NotFound,
        }
    }

    /// Creates a new customer.
    pub fn post(&self, request: CreateCustomerRequest) -> ActionResult {
        let customer = self.store.insert(request.name);
        tracing::info!(customer_id = %customer.id, "customer created");
        ActionResult::created(format!("{}/{}", Self::ROUTE, customer.id), &customer)
    }

    /// Updates a customer by ID.
    pub fn put(&self, id: CustomerId, request: UpdateCustomerRequest) -> ActionResult {
        match self.store.update(id, request.name) {
            Ok(_) => {
                tracing::info!(customer_id = %id, "customer updated");
                ActionResult::NoContent
            }
            Err(_) => ActionResult::NotFound,
        }
    }

    /// Deletes a customer by ID.
    pub fn delete(&self, id: CustomerId) -> ActionResult {
        match self.store.delete(id) {
            Ok(_) => {
                tracing::info!(customer_id = %id, "customer deleted");
                ActionResult::NoContent
            }
            Err(_) => ActionResult::NotFound,
        }
    }
}

impl Controller for CustomersController {
    const ROUTE: &'static str = "/controller/customers";

    fn actions() -> Vec<ActionDescriptor<Self>> {
        vec![
            ActionDescriptor::<Self>::get("", "get_all", |c, args| {
                Ok(c.get_all(args.take("page")?, args.take("pageSize")?))
            })
            .param(Parameter::query::<i64>("page", DEFAULT_PAGE))
            .param(Parameter::query::<i64>("pageSize", DEFAULT_PAGE_SIZE)),
            ActionDescriptor::<Self>::get("/:id", "get", |c, args| Ok(c.get(args.take("id")?)))
                .param(Parameter::path::<CustomerId>("id")),
            ActionDescriptor::<Self>::post("", "post", |c, args| Ok(c.post(args.take("request")?)))
                .param(Parameter::json_body::<CreateCustomerRequest>("request").validated()),
            ActionDescriptor::<Self>::put("/:id", "put", |c, args| {
                Ok(c.put(args.take("id")?, args.take("request")?))
            })
            .param(Parameter::path::<CustomerId>("id"))
            .param(Parameter::json_body::<UpdateCustomerRequest>("request").validated()),
            ActionDescriptor::<Self>::delete("/:id", "delete", |c, args| {
                Ok(c.delete(args.take("id")?))
            })
            .param(Parameter::path::<CustomerId>("id")),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twinapi_infra::InMemoryCustomerStore;

    fn controller() -> CustomersController {
        CustomersController::new(Arc::new(InMemoryCustomerStore::new()))
    }

    #[test]
    fn actions_declare_validated_payloads() {
        let actions = CustomersController::actions();
        let validated: Vec<_> = actions
            .iter()
            .filter(|a| a.parameters().iter().any(|p| p.descriptor().is_validated()))
            .map(|a| a.name())
            .collect();
        assert_eq!(validated, ["post", "put"]);
    }

    #[test]
    fn post_then_get_round_trips_name() {
        let c = controller();
        let created = c.post(CreateCustomerRequest { name: "Test".into() });
        let ActionResult::Created { location, body } = created else {
            panic!("Expected Created");
        };
        assert_eq!(location, "/controller/customers/1");
        assert_eq!(body["name"], "Test");

        match c.get(CustomerId::new(1)) {
            ActionResult::Ok(body) => assert_eq!(body["id"], 1),
            other => panic!("Expected Ok, got {other:?}"),
        }
    }

    #[test]
    fn missing_customer_is_not_found_for_every_action() {
        let c = controller();
        let id = CustomerId::new(999);
        assert_eq!(c.get(id), ActionResult::NotFound);
        assert_eq!(
            c.put(id, UpdateCustomerRequest { name: "meow".into() }),
            ActionResult::NotFound
        );
        assert_eq!(c.delete(id), ActionResult::NotFound);
    }

    #[test]
    fn get_all_pages_in_insertion_order() {
        let c = controller();
        c.post(CreateCustomerRequest { name: "first".into() });
        c.post(CreateCustomerRequest { name: "second".into() });

        match c.get_all(2, 1) {
            ActionResult::Ok(body) => {
                assert_eq!(body, serde_json::json!([{ "id": 2, "name": "second" }]));
            }
            other => panic!("Expected Ok, got {other:?}"),
        }
    }
}
