//! Compiled DMN types
//!
//! Item definitions compile into [`DmnType`] values shared via `Arc`:
//! either a built-in FEEL type, possibly constrained to enumerated allowed
//! values, or a composite assembled from named fields. Types are immutable
//! once built, so every node referencing one holds the same allocation.

use std::sync::Arc;

use decima_feel::{BuiltInType, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum DmnType {
    Feel(FeelTypeDef),
    Composite(CompositeTypeDef),
}

/// A built-in type, optionally narrowed to a value enumeration.
#[derive(Debug, Clone, PartialEq)]
pub struct FeelTypeDef {
    pub name: Option<String>,
    pub id: Option<String>,
    pub base: BuiltInType,
    /// Enumerated legal values; empty means unconstrained
    pub allowed_values: Vec<Value>,
}

/// A record type with ordered named fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeTypeDef {
    pub name: Option<String>,
    pub id: Option<String>,
    /// Declaration order is preserved
    pub fields: Vec<(String, Arc<DmnType>)>,
}

impl DmnType {
    /// A built-in type carrying the referencing element's name and id.
    pub fn feel(name: Option<&str>, id: Option<&str>, base: BuiltInType) -> DmnType {
        DmnType::Feel(FeelTypeDef {
            name: name.map(str::to_string),
            id: id.map(str::to_string),
            base,
            allowed_values: Vec::new(),
        })
    }

    /// The placeholder for undeclared type references.
    pub fn unknown(name: Option<&str>, id: Option<&str>) -> DmnType {
        DmnType::feel(name, id, BuiltInType::Unknown)
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            DmnType::Feel(t) => t.name.as_deref(),
            DmnType::Composite(t) => t.name.as_deref(),
        }
    }

    /// The built-in base kind, or `None` for composites.
    pub fn base(&self) -> Option<BuiltInType> {
        match self {
            DmnType::Feel(t) => Some(t.base),
            DmnType::Composite(_) => None,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, DmnType::Composite(_))
    }
}

impl CompositeTypeDef {
    pub fn new(name: Option<&str>, id: Option<&str>) -> Self {
        CompositeTypeDef {
            name: name.map(str::to_string),
            id: id.map(str::to_string),
            fields: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Arc<DmnType>> {
        self.fields
            .iter()
            .find(|(field_name, _)| field_name == name)
            .map(|(_, field_type)| field_type)
    }

    /// Insert or overwrite a field. Returns true when an existing field of
    /// the same name was replaced.
    pub fn set_field(&mut self, name: String, field_type: Arc<DmnType>) -> bool {
        if let Some(slot) = self
            .fields
            .iter_mut()
            .find(|(field_name, _)| *field_name == name)
        {
            slot.1 = field_type;
            true
        } else {
            self.fields.push((name, field_type));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feel_type_base() {
        let t = DmnType::feel(Some("Age"), Some("age-type"), BuiltInType::Number);
        assert_eq!(t.base(), Some(BuiltInType::Number));
        assert_eq!(t.name(), Some("Age"));
        assert!(!t.is_composite());
    }

    #[test]
    fn test_set_field_last_wins() {
        let mut composite = CompositeTypeDef::new(Some("tPerson"), None);
        let number = Arc::new(DmnType::feel(None, None, BuiltInType::Number));
        let string = Arc::new(DmnType::feel(None, None, BuiltInType::String));

        assert!(!composite.set_field("age".to_string(), Arc::clone(&number)));
        assert!(composite.set_field("age".to_string(), Arc::clone(&string)));
        assert_eq!(composite.fields.len(), 1);
        assert_eq!(
            composite.field("age").and_then(|t| t.base()),
            Some(BuiltInType::String)
        );
    }

    #[test]
    fn test_field_order_preserved() {
        let mut composite = CompositeTypeDef::new(None, None);
        let t = Arc::new(DmnType::unknown(None, None));
        composite.set_field("z".to_string(), Arc::clone(&t));
        composite.set_field("a".to_string(), Arc::clone(&t));
        let names: Vec<&str> = composite.fields.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["z", "a"]);
    }
}
