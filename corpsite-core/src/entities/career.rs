use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{visibility_facet, Entity, EntityId, EntityKind};
use crate::validation::{Rule, Validate, ValidationErrors, Validator};
use crate::views::Filterable;

/// Job opening
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Career {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub title: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub location: String,
    /// full-time, part-time, contract, internship
    #[serde(default)]
    pub employment_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<String>,
    /// Application deadline as sent by the backend (ISO date)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Career {
    const KIND: EntityKind = EntityKind::Careers;

    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    fn is_visible(&self) -> bool {
        self.is_active
    }
}

impl Filterable for Career {
    const FACETS: &'static [&'static str] = &["department", "employmentType", "status"];

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.department.as_str(), self.location.as_str()]
    }

    fn facet(&self, key: &str) -> Option<String> {
        match key {
            "department" => Some(self.department.clone()),
            "employmentType" => Some(self.employment_type.clone()),
            "status" => Some(visibility_facet(self.is_active)),
            _ => None,
        }
    }
}

impl Validate for Career {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check("title", &self.title, &[Rule::Required])
            .check("department", &self.department, &[Rule::Required])
            .check("location", &self.location, &[Rule::Required]);
        v.finish()
    }
}
