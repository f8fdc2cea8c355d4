//! CMS record types
//!
//! Six entity kinds share one contract: an identifier, an endpoint, and a
//! visibility flag the backend uses to build the public list. Everything else
//! is display data; attributes this client does not model are kept in each
//! record's `extra` map so updates never drop them.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::validation::Validate;
use crate::views::Filterable;

mod award;
mod career;
mod company;
mod partnership;
mod press;
mod project;

pub use award::Award;
pub use career::Career;
pub use company::Company;
pub use partnership::Partnership;
pub use press::Press;
pub use project::Project;

/// Record identifier; backends hand out either numbers or strings
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Int(i64),
    Text(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Int(id) => write!(f, "{id}"),
            EntityId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        EntityId::Int(id)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        id.parse().unwrap_or_else(|_| EntityId::Text(id.to_string()))
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        EntityId::from(id.as_str())
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    /// Integers stay integers so `1` and `"1"` address the same record
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.trim()
            .parse::<i64>()
            .map(EntityId::Int)
            .unwrap_or_else(|_| EntityId::Text(s.trim().to_string())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Projects,
    Partnerships,
    Awards,
    Careers,
    Press,
    Companies,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown entity kind '{0}'")]
pub struct UnknownEntityKind(pub String);

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Projects,
        EntityKind::Partnerships,
        EntityKind::Awards,
        EntityKind::Careers,
        EntityKind::Press,
        EntityKind::Companies,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            EntityKind::Projects => "projects",
            EntityKind::Partnerships => "partnerships",
            EntityKind::Awards => "awards",
            EntityKind::Careers => "careers",
            EntityKind::Press => "press",
            EntityKind::Companies => "companies",
        }
    }

    pub fn singular(&self) -> &'static str {
        match self {
            EntityKind::Projects => "project",
            EntityKind::Partnerships => "partnership",
            EntityKind::Awards => "award",
            EntityKind::Careers => "career",
            EntityKind::Press => "press",
            EntityKind::Companies => "company",
        }
    }

    /// Collection endpoint, relative to the API base URL
    pub fn endpoint(&self) -> String {
        format!("/{}", self.slug())
    }

    /// Field the backend flips to publish or hide a record
    pub fn visibility_field(&self) -> &'static str {
        match self {
            EntityKind::Press => "isPublished",
            _ => "isActive",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for EntityKind {
    type Err = UnknownEntityKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == wanted || kind.singular() == wanted)
            .ok_or_else(|| UnknownEntityKind(s.to_string()))
    }
}

/// Contract shared by every record type the store can hold
///
/// Every kind is listable ([`Filterable`]) and editable through a form
/// ([`Validate`]), so both come with the contract.
pub trait Entity:
    Filterable + Validate + Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: EntityKind;

    /// `None` only for records not yet saved
    fn id(&self) -> Option<&EntityId>;

    /// Whether the record shows up on the public site
    fn is_visible(&self) -> bool;

    fn collection_endpoint() -> String {
        Self::KIND.endpoint()
    }

    fn public_endpoint() -> String {
        format!("{}/public", Self::KIND.endpoint())
    }

    fn item_endpoint(id: &EntityId) -> String {
        format!("{}/{}", Self::KIND.endpoint(), id)
    }
}

/// Lower-cased `active`/`inactive` facet value for visibility filters
pub(crate) fn visibility_facet(visible: bool) -> String {
    if visible { "active" } else { "inactive" }.to_string()
}
