use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{visibility_facet, Entity, EntityId, EntityKind};
use crate::validation::{Rule, Validate, ValidationErrors, Validator};
use crate::views::Filterable;

/// Group subsidiary or affiliate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Company {
    const KIND: EntityKind = EntityKind::Companies;

    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    fn is_visible(&self) -> bool {
        self.is_active
    }
}

impl Filterable for Company {
    const FACETS: &'static [&'static str] = &["sector", "status"];

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.sector.as_str(), self.description.as_str()]
    }

    fn facet(&self, key: &str) -> Option<String> {
        match key {
            "sector" => Some(self.sector.clone()),
            "status" => Some(visibility_facet(self.is_active)),
            _ => None,
        }
    }
}

impl Validate for Company {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check("name", &self.name, &[Rule::Required])
            .check("sector", &self.sector, &[Rule::Required])
            .check_optional("website", self.website.as_deref(), &[Rule::Url]);
        v.finish()
    }
}
