use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{visibility_facet, Entity, EntityId, EntityKind};
use crate::validation::{Rule, Validate, ValidationErrors, Validator};
use crate::views::Filterable;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partnership {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// strategic, technology, government, ...
    #[serde(default)]
    pub partner_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Partnership {
    const KIND: EntityKind = EntityKind::Partnerships;

    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    fn is_visible(&self) -> bool {
        self.is_active
    }
}

impl Filterable for Partnership {
    const FACETS: &'static [&'static str] = &["partnerType", "status"];

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.description.as_str()]
    }

    fn facet(&self, key: &str) -> Option<String> {
        match key {
            "partnerType" => Some(self.partner_type.clone()),
            "status" => Some(visibility_facet(self.is_active)),
            _ => None,
        }
    }
}

impl Validate for Partnership {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check("name", &self.name, &[Rule::Required])
            .check_optional("website", self.website.as_deref(), &[Rule::Url])
            .check_optional("logo", self.logo.as_deref(), &[Rule::Url]);
        v.finish()
    }
}
