use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{visibility_facet, Entity, EntityId, EntityKind};
use crate::validation::{Rule, Validate, ValidationErrors, Validator};
use crate::views::Filterable;

/// Press release or media mention
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Press {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub content: String,
    /// news, announcement, media coverage, ...
    #[serde(default)]
    pub category: String,
    /// Publication that ran the story, for media coverage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Press {
    const KIND: EntityKind = EntityKind::Press;

    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    fn is_visible(&self) -> bool {
        self.is_published
    }
}

impl Filterable for Press {
    const FACETS: &'static [&'static str] = &["category", "status"];

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.summary.as_str()];
        if let Some(source) = &self.source {
            fields.push(source);
        }
        fields
    }

    fn facet(&self, key: &str) -> Option<String> {
        match key {
            "category" => Some(self.category.clone()),
            "status" => Some(visibility_facet(self.is_published)),
            _ => None,
        }
    }
}

impl Validate for Press {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check("title", &self.title, &[Rule::Required])
            .check("content", &self.content, &[Rule::Required])
            .check_optional("image", self.image.as_deref(), &[Rule::Url]);
        v.finish()
    }
}
