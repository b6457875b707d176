use serde::{Deserialize, Serialize};

/// A construction project owning a list of materials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Local URI or resource handle for the cover image.
    pub image_uri: Option<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Project {
    /// Creates an unsaved project; id and timestamp are assigned on insert.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            description: description.into(),
            image_uri: None,
            created_at: 0,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_image_uri(mut self, image_uri: impl Into<String>) -> Self {
        self.image_uri = Some(image_uri.into());
        self
    }
}
