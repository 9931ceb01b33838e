//! Invocation context handed to pre-handler hooks.
//!
//! Handlers declare their parameters explicitly (name, type, whether the
//! argument must be validated). Both dispatch styles bind those parameters and
//! present them to hooks as an [`InvocationContext`] before the handler body
//! runs.

use std::any::{Any, TypeId};

/// Static description of one handler parameter.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ArgumentDescriptor {
    name: &'static str,
    type_id: TypeId,
    type_name: &'static str,
    validate: bool,
}

impl ArgumentDescriptor {
    pub fn of<T: 'static>(name: &'static str) -> Self {
        Self {
            name,
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            validate: false,
        }
    }

    /// Flag the argument for validation before the handler runs.
    pub fn validated(mut self) -> Self {
        self.validate = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is_validated(&self) -> bool {
        self.validate
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

/// Registration-time view of a handler: its route and declared parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDescriptor {
    route: String,
    parameters: Vec<ArgumentDescriptor>,
}

impl EndpointDescriptor {
    pub fn new(route: impl Into<String>, parameters: Vec<ArgumentDescriptor>) -> Self {
        Self {
            route: route.into(),
            parameters,
        }
    }

    /// `"<METHOD> <path>"`, used in logs.
    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn parameters(&self) -> &[ArgumentDescriptor] {
        &self.parameters
    }
}

/// A declared parameter together with the value bound for this request.
#[derive(Clone, Copy)]
pub struct BoundArgument<'a> {
    pub descriptor: ArgumentDescriptor,
    pub value: &'a (dyn Any + Send + Sync),
}

impl<'a> BoundArgument<'a> {
    pub fn downcast<T: 'static>(&self) -> Option<&'a T> {
        self.value.downcast_ref::<T>()
    }
}

/// Everything a hook may inspect immediately before a handler runs.
pub struct InvocationContext<'a> {
    route: &'a str,
    arguments: Vec<BoundArgument<'a>>,
}

impl<'a> InvocationContext<'a> {
    pub fn new(route: &'a str) -> Self {
        Self {
            route,
            arguments: Vec::new(),
        }
    }

    pub fn push(&mut self, descriptor: ArgumentDescriptor, value: &'a (dyn Any + Send + Sync)) {
        self.arguments.push(BoundArgument { descriptor, value });
    }

    pub fn with(mut self, descriptor: ArgumentDescriptor, value: &'a (dyn Any + Send + Sync)) -> Self {
        self.push(descriptor, value);
        self
    }

    pub fn route(&self) -> &str {
        self.route
    }

    pub fn arguments(&self) -> &[BoundArgument<'a>] {
        &self.arguments
    }

    pub fn argument(&self, name: &str) -> Option<&BoundArgument<'a>> {
        self.arguments.iter().find(|a| a.descriptor.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptors_carry_type_and_flag() {
        let plain = ArgumentDescriptor::of::<i64>("id");
        assert!(plain.is::<i64>());
        assert!(!plain.is_validated());
        assert_eq!(plain.name(), "id");

        let flagged = ArgumentDescriptor::of::<String>("name").validated();
        assert!(flagged.is_validated());
        assert!(flagged.type_name().contains("String"));
    }

    #[test]
    fn invocation_exposes_bound_values_by_name() {
        let id = 7_i64;
        let name = "Ada".to_string();
        let ctx = InvocationContext::new("PUT /things/:id")
            .with(ArgumentDescriptor::of::<i64>("id"), &id)
            .with(ArgumentDescriptor::of::<String>("name"), &name);

        assert_eq!(ctx.route(), "PUT /things/:id");
        assert_eq!(ctx.arguments().len(), 2);
        assert_eq!(ctx.argument("id").unwrap().downcast::<i64>(), Some(&7));
        assert!(ctx.argument("name").unwrap().downcast::<i64>().is_none());
        assert!(ctx.argument("missing").is_none());
    }
}
