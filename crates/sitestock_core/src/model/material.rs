use crate::db::schema::DEFAULT_MATERIAL_UNIT;
use serde::{Deserialize, Serialize};

/// A material tracked for a project.
///
/// `quantity` and `price` are free-form text ("3 bags", "12.50/m") and are
/// never parsed by core. Missing fields deserialize to their defaults, so
/// records written before `unit` existed read back as `"pcs"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Material {
    pub id: String,
    pub name: String,
    pub quantity: String,
    pub unit: String,
    pub price: String,
    pub description: String,
    pub is_purchased: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Material {
    /// Creates an unsaved, unpurchased material with an empty description.
    pub fn new(
        name: impl Into<String>,
        quantity: impl Into<String>,
        unit: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
            unit: unit.into(),
            price: price.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            quantity: String::new(),
            unit: DEFAULT_MATERIAL_UNIT.to_string(),
            price: String::new(),
            description: String::new(),
            is_purchased: false,
            created_at: 0,
        }
    }
}
