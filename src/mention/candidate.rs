//! Users returned by the network search endpoint

use serde::{Deserialize, Serialize};

/// A user eligible for mention insertion.
///
/// Owned by the remote service; the engine only keeps the current
/// suggestion set around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkUser {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub profession: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl NetworkUser {
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            user_name: None,
            profile_image: None,
            profession: String::new(),
            city: None,
            region: None,
        }
    }

    /// "First Last"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Canonical mention text inserted into a body, e.g. `@John Doe`
    pub fn mention_string(&self) -> String {
        format!("@{}", self.full_name())
    }

    /// "City, Region", whichever parts are known
    pub fn location(&self) -> Option<String> {
        match (self.city.as_deref(), self.region.as_deref()) {
            (Some(city), Some(region)) => Some(format!("{city}, {region}")),
            (Some(one), None) | (None, Some(one)) => Some(one.to_string()),
            (None, None) => None,
        }
    }

    /// One-line description used next to a suggestion
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(handle) = &self.user_name {
            parts.push(format!("@{handle}"));
        }
        if !self.profession.is_empty() {
            parts.push(self.profession.clone());
        }
        if let Some(location) = self.location() {
            parts.push(location);
        }
        parts.join(" · ")
    }
}
