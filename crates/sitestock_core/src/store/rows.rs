//! Storage row shapes, one field per column.

/// One row of `projects`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image_uri: Option<String>,
    pub created_at: i64,
}

/// One row of `materials`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialRow {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub quantity: String,
    pub price: String,
    pub description: String,
    pub is_purchased: bool,
    pub created_at: i64,
    pub unit: String,
}
