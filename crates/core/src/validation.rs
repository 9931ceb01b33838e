//! Request-shape validation primitives.
//!
//! A [`Validator<T>`] is a stateless rule over one request shape `T`. Validators
//! are collected once at startup into a [`ValidatorRegistry`] keyed by the
//! shape's `TypeId`, and consulted per request through the type-erased
//! [`ErasedValidator`] interface.

use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;

/// Field-level validation messages, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for a single failing field.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when nothing was recorded, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(value: validator::ValidationErrors) -> Self {
        let mut errors = FieldErrors::new();
        for (field, field_errors) in value.field_errors() {
            let field = field.to_string();
            for error in field_errors.iter() {
                let message = match &error.message {
                    Some(message) => format!("'{field}' {message}"),
                    None => format!("'{field}' is invalid ({}).", error.code),
                };
                errors.add(field.clone(), message);
            }
        }
        errors
    }
}

/// A stateless rule over a request shape.
pub trait Validator<T>: Send + Sync {
    fn validate(&self, value: &T) -> Result<(), FieldErrors>;
}

impl<T, F> Validator<T> for F
where
    F: Fn(&T) -> Result<(), FieldErrors> + Send + Sync,
{
    fn validate(&self, value: &T) -> Result<(), FieldErrors> {
        self(value)
    }
}

/// Adapts a `#[derive(validator::Validate)]` shape into a [`Validator`].
pub struct DeriveValidator<T>(PhantomData<fn(&T)>);

impl<T> DeriveValidator<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for DeriveValidator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: validator::Validate> Validator<T> for DeriveValidator<T> {
    fn validate(&self, value: &T) -> Result<(), FieldErrors> {
        value.validate().map_err(FieldErrors::from)
    }
}

/// Rule shared by request shapes whose text field may not be blank.
///
/// Whitespace-only input counts as blank.
pub fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("not_empty")
            .with_message(Cow::Borrowed("must not be empty.")));
    }
    Ok(())
}

/// Type-erased view of a [`Validator`], as stored in the registry.
pub trait ErasedValidator: Send + Sync {
    /// Type name of the shape this validator accepts (diagnostics only).
    fn shape(&self) -> &'static str;

    /// Validate `value`, or `None` if `value` is not this validator's shape.
    fn validate_any(&self, value: &dyn Any) -> Option<Result<(), FieldErrors>>;
}

struct Typed<T, V> {
    inner: V,
    _shape: PhantomData<fn(&T)>,
}

impl<T, V> ErasedValidator for Typed<T, V>
where
    T: 'static,
    V: Validator<T>,
{
    fn shape(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn validate_any(&self, value: &dyn Any) -> Option<Result<(), FieldErrors>> {
        value.downcast_ref::<T>().map(|v| self.inner.validate(v))
    }
}

/// Process-wide map from request shape to its validator.
#[derive(Default, Clone)]
pub struct ValidatorRegistry {
    by_type: HashMap<TypeId, Arc<dyn ErasedValidator>>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `validator` for shape `T`, replacing any previous one.
    pub fn register<T, V>(&mut self, validator: V) -> &mut Self
    where
        T: 'static,
        V: Validator<T> + 'static,
    {
        let erased: Arc<dyn ErasedValidator> = Arc::new(Typed {
            inner: validator,
            _shape: PhantomData::<fn(&T)>,
        });
        tracing::debug!(shape = erased.shape(), "validator registered");
        self.by_type.insert(TypeId::of::<T>(), erased);
        self
    }

    /// Register the derive-based validator of shape `T`.
    pub fn register_derived<T>(&mut self) -> &mut Self
    where
        T: validator::Validate + 'static,
    {
        self.register::<T, _>(DeriveValidator::<T>::new())
    }

    pub fn validator_for(&self, type_id: TypeId) -> Option<Arc<dyn ErasedValidator>> {
        self.by_type.get(&type_id).cloned()
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.by_type.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

impl core::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set()
            .entries(self.by_type.values().map(|v| v.shape()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Debug, Validate)]
    struct Rename {
        #[validate(custom(function = "not_blank"))]
        name: String,
    }

    struct Unregistered;

    #[test]
    fn derived_validator_reports_blank_field() {
        let validator = DeriveValidator::<Rename>::new();
        assert!(validator.validate(&Rename { name: "Ada".into() }).is_ok());

        let errors = validator
            .validate(&Rename { name: "   ".into() })
            .unwrap_err();
        assert_eq!(errors.get("name").unwrap(), ["'name' must not be empty."]);
    }

    #[test]
    fn closures_are_validators() {
        let rule = |value: &String| {
            if value.len() > 3 {
                Err(FieldErrors::single("value", "too long"))
            } else {
                Ok(())
            }
        };
        assert!(Validator::validate(&rule, &"abc".to_string()).is_ok());
        assert!(Validator::validate(&rule, &"abcd".to_string()).is_err());
    }

    #[test]
    fn registry_resolves_by_shape() {
        let mut registry = ValidatorRegistry::new();
        registry.register_derived::<Rename>();

        assert!(registry.contains::<Rename>());
        assert!(!registry.contains::<Unregistered>());
        assert!(registry.validator_for(TypeId::of::<Unregistered>()).is_none());

        let validator = registry.validator_for(TypeId::of::<Rename>()).unwrap();
        let blank = Rename { name: String::new() };
        assert!(matches!(validator.validate_any(&blank), Some(Err(_))));
    }

    #[test]
    fn erased_validator_ignores_other_shapes() {
        let mut registry = ValidatorRegistry::new();
        registry.register_derived::<Rename>();

        let validator = registry.validator_for(TypeId::of::<Rename>()).unwrap();
        assert!(validator.validate_any(&42_u8).is_none());
    }

    #[test]
    fn field_errors_collect_in_field_order() {
        let mut errors = FieldErrors::new();
        errors.add("zeta", "z");
        errors.add("alpha", "a1");
        errors.add("alpha", "a2");

        assert_eq!(errors.fields().collect::<Vec<_>>(), ["alpha", "zeta"]);
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            serde_json::json!({ "alpha": ["a1", "a2"], "zeta": ["z"] })
        );
        assert!(FieldErrors::new().into_result().is_ok());
    }
}
