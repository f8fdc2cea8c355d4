use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{visibility_facet, Entity, EntityId, EntityKind};
use crate::validation::{Rule, Validate, ValidationErrors, Validator};
use crate::views::Filterable;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gallery: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_year: Option<i32>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Project {
    const KIND: EntityKind = EntityKind::Projects;

    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    fn is_visible(&self) -> bool {
        self.is_active
    }
}

impl Filterable for Project {
    const FACETS: &'static [&'static str] = &["category", "status"];

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.location.as_str(), self.category.as_str()]
    }

    fn facet(&self, key: &str) -> Option<String> {
        match key {
            "category" => Some(self.category.clone()),
            "status" => Some(visibility_facet(self.is_active)),
            _ => None,
        }
    }
}

impl Validate for Project {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check("title", &self.title, &[Rule::Required, Rule::MaxLength(200)])
            .check("category", &self.category, &[Rule::Required])
            .check_optional("image", self.image.as_deref(), &[Rule::Url]);
        v.finish()
    }
}
