use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{visibility_facet, Entity, EntityId, EntityKind};
use crate::validation::{Rule, Validate, ValidationErrors, Validator};
use crate::views::Filterable;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Award {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Organisation that granted the award
    #[serde(default)]
    pub awarding_body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Award {
    const KIND: EntityKind = EntityKind::Awards;

    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    fn is_visible(&self) -> bool {
        self.is_active
    }
}

impl Filterable for Award {
    const FACETS: &'static [&'static str] = &["category", "year", "status"];

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.awarding_body.as_str(), self.category.as_str()]
    }

    fn facet(&self, key: &str) -> Option<String> {
        match key {
            "category" => Some(self.category.clone()),
            "year" => self.year.map(|y| y.to_string()),
            "status" => Some(visibility_facet(self.is_active)),
            _ => None,
        }
    }
}

impl Validate for Award {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check("title", &self.title, &[Rule::Required])
            .check("awardingBody", &self.awarding_body, &[Rule::Required]);
        if self.year.is_some_and(|year| !(1900..=2100).contains(&year)) {
            v.fail("year", "must be between 1900 and 2100");
        }
        v.finish()
    }
}
