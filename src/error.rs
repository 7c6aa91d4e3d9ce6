//! Error types
//!
//! Only `ContentLoadError` is fatal. Everything else is raised by a single
//! input event and recovered locally: the event is dropped and the simulation
//! carries on untouched.

use thiserror::Error;

use crate::game::ScreenId;
use crate::sim::CustomerId;
use crate::upgrades::PurchaseError;

/// Catalog loading failed; no round can start without catalogs
#[derive(Debug, Error)]
pub enum ContentLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed {what} content: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{what} catalog is empty")]
    Empty { what: &'static str },
    #[error("duplicate {what} id `{id}`")]
    DuplicateId { what: &'static str, id: String },
    #[error("{what} entry has a blank `{field}`")]
    BlankField {
        what: &'static str,
        field: &'static str,
    },
    #[error("recipe `{0}` has no ingredients")]
    EmptyRecipe(String),
    #[error("customer `{id}` has non-positive patience {patience}")]
    InvalidPatience { id: String, patience: f32 },
    #[error("customer `{id}` has tip range {min}..{max}")]
    InvalidTipRange { id: String, min: u32, max: u32 },
    #[error("no regular (non-chaos) recipes to order")]
    NoRegularRecipes,
}

/// What an input referred to that does not exist
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Missing {
    Customer(CustomerId),
    Archetype(String),
    Ingredient(String),
    Recipe(String),
}

impl std::fmt::Display for Missing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Missing::Customer(id) => write!(f, "customer {id}"),
            Missing::Archetype(id) => write!(f, "customer archetype `{id}`"),
            Missing::Ingredient(id) => write!(f, "ingredient `{id}`"),
            Missing::Recipe(id) => write!(f, "recipe `{id}`"),
        }
    }
}

/// Recoverable, per-input errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("{0} not found")]
    NotFound(Missing),
    #[error("customer {0} can't be selected right now")]
    NotSelectable(CustomerId),
    #[error("no transition from {from:?} to {to:?}")]
    InvalidTransition { from: ScreenId, to: ScreenId },
    #[error("input has no meaning on the {screen:?} screen")]
    InputIgnored { screen: ScreenId },
    #[error(transparent)]
    Purchase(#[from] PurchaseError),
}
