//! Recipe and customer catalogs
//!
//! Content is loaded once at startup through a `ContentProvider` and is
//! immutable for the rest of the run. Definitions are handed out as `Arc`s so
//! live customers can hold their archetype and order without copying.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ContentLoadError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of a recipe (e.g. `stardust_latte`)
    RecipeId
);
string_id!(
    /// Identifier of an ingredient (e.g. `beans`)
    IngredientId
);
string_id!(
    /// Identifier of a customer archetype
    ArchetypeId
);

/// Recipe tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeTag {
    /// Served cold; spoils at the station, faster in a hot shop
    Ice,
    /// Resolves a chaos event; never ordered by customers
    Chaos,
}

/// A drink recipe: a multiset of ingredients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDefinition {
    pub id: RecipeId,
    pub name: String,
    pub ingredients: Vec<IngredientId>,
    #[serde(default)]
    pub tags: Vec<RecipeTag>,
}

impl RecipeDefinition {
    pub fn has_tag(&self, tag: RecipeTag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn is_chaos(&self) -> bool {
        self.has_tag(RecipeTag::Chaos)
    }

    pub fn is_ice(&self) -> bool {
        self.has_tag(RecipeTag::Ice)
    }
}

/// Behavioural modifier attached to a customer archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuirkKind {
    #[default]
    None,
    /// Heats the shop while waiting; ice drinks spoil faster
    FireElemental,
    /// Invisible until the bell is rung
    #[serde(alias = "invisible")]
    Ghost,
}

/// Tip paid for a perfect drink, scaled between `min` and `max` by remaining patience
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct TipRange {
    pub min: u32,
    pub max: u32,
}

impl Default for TipRange {
    fn default() -> Self {
        Self { min: 2, max: 8 }
    }
}

impl From<[u32; 2]> for TipRange {
    fn from([min, max]: [u32; 2]) -> Self {
        Self { min, max }
    }
}

impl From<TipRange> for [u32; 2] {
    fn from(range: TipRange) -> Self {
        [range.min, range.max]
    }
}

/// A kind of customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerArchetype {
    pub id: ArchetypeId,
    pub name: String,
    /// `null` in content means no quirk
    #[serde(default, deserialize_with = "quirk_or_none")]
    pub quirk: QuirkKind,
    /// Base patience in seconds
    pub patience: f32,
    #[serde(default)]
    pub dialogue: Vec<String>,
    #[serde(default)]
    pub tip: TipRange,
}

fn quirk_or_none<'de, D>(deserializer: D) -> Result<QuirkKind, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<QuirkKind>::deserialize(deserializer)?.unwrap_or_default())
}

/// Source of catalog content
pub trait ContentProvider {
    fn load_recipes(&self) -> Result<Vec<RecipeDefinition>, ContentLoadError>;
    fn load_customer_archetypes(&self) -> Result<Vec<CustomerArchetype>, ContentLoadError>;
}

const BUILTIN_RECIPES: &str = include_str!("../content/recipes.json");
const BUILTIN_CUSTOMERS: &str = include_str!("../content/customers.json");

/// JSON content (`recipes.json` + `customers.json`)
#[derive(Debug, Clone)]
pub struct JsonContent {
    recipes: String,
    customers: String,
}

impl JsonContent {
    pub fn new(recipes: impl Into<String>, customers: impl Into<String>) -> Self {
        Self {
            recipes: recipes.into(),
            customers: customers.into(),
        }
    }

    /// Content shipped with the game
    pub fn builtin() -> Self {
        Self::new(BUILTIN_RECIPES, BUILTIN_CUSTOMERS)
    }

    /// Read `recipes.json` and `customers.json` from a directory
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, ContentLoadError> {
        let dir = dir.as_ref();
        let read = |name: &str| {
            let path = dir.join(name);
            std::fs::read_to_string(&path).map_err(|source| ContentLoadError::Io {
                path: path.display().to_string(),
                source,
            })
        };
        Ok(Self::new(read("recipes.json")?, read("customers.json")?))
    }
}

impl ContentProvider for JsonContent {
    fn load_recipes(&self) -> Result<Vec<RecipeDefinition>, ContentLoadError> {
        serde_json::from_str(&self.recipes).map_err(|source| ContentLoadError::Parse {
            what: "recipe",
            source,
        })
    }

    fn load_customer_archetypes(&self) -> Result<Vec<CustomerArchetype>, ContentLoadError> {
        serde_json::from_str(&self.customers).map_err(|source| ContentLoadError::Parse {
            what: "customer",
            source,
        })
    }
}

/// Validated, immutable content for a run
#[derive(Debug, Clone)]
pub struct Catalog {
    recipes: Vec<Arc<RecipeDefinition>>,
    archetypes: Vec<Arc<CustomerArchetype>>,
    recipe_index: HashMap<RecipeId, usize>,
    archetype_index: HashMap<ArchetypeId, usize>,
    ingredients: BTreeSet<IngredientId>,
}

impl Catalog {
    /// Load and validate content. Any failure here is fatal for the run.
    pub fn load(provider: &dyn ContentProvider) -> Result<Self, ContentLoadError> {
        let recipes = provider.load_recipes()?;
        let archetypes = provider.load_customer_archetypes()?;
        Self::from_parts(recipes, archetypes)
    }

    /// The builtin catalog
    pub fn builtin() -> Result<Self, ContentLoadError> {
        Self::load(&JsonContent::builtin())
    }

    pub fn from_parts(
        recipes: Vec<RecipeDefinition>,
        archetypes: Vec<CustomerArchetype>,
    ) -> Result<Self, ContentLoadError> {
        if recipes.is_empty() {
            return Err(ContentLoadError::Empty { what: "recipe" });
        }
        if archetypes.is_empty() {
            return Err(ContentLoadError::Empty { what: "customer" });
        }

        let mut recipe_index = HashMap::with_capacity(recipes.len());
        let mut ingredients = BTreeSet::new();
        for (i, recipe) in recipes.iter().enumerate() {
            if recipe.id.as_str().trim().is_empty() {
                return Err(ContentLoadError::BlankField {
                    what: "recipe",
                    field: "id",
                });
            }
            if recipe.ingredients.is_empty() {
                return Err(ContentLoadError::EmptyRecipe(recipe.id.to_string()));
            }
            if recipe.ingredients.iter().any(|ing| ing.as_str().trim().is_empty()) {
                return Err(ContentLoadError::BlankField {
                    what: "recipe",
                    field: "ingredients",
                });
            }
            if recipe_index.insert(recipe.id.clone(), i).is_some() {
                return Err(ContentLoadError::DuplicateId {
                    what: "recipe",
                    id: recipe.id.to_string(),
                });
            }
            ingredients.extend(recipe.ingredients.iter().cloned());
        }
        if recipes.iter().all(RecipeDefinition::is_chaos) {
            return Err(ContentLoadError::NoRegularRecipes);
        }

        let mut archetype_index = HashMap::with_capacity(archetypes.len());
        for (i, archetype) in archetypes.iter().enumerate() {
            if archetype.id.as_str().trim().is_empty() {
                return Err(ContentLoadError::BlankField {
                    what: "customer",
                    field: "id",
                });
            }
            if archetype.patience.is_nan() || archetype.patience <= 0.0 {
                return Err(ContentLoadError::InvalidPatience {
                    id: archetype.id.to_string(),
                    patience: archetype.patience,
                });
            }
            if archetype.tip.min > archetype.tip.max {
                return Err(ContentLoadError::InvalidTipRange {
                    id: archetype.id.to_string(),
                    min: archetype.tip.min,
                    max: archetype.tip.max,
                });
            }
            if archetype_index.insert(archetype.id.clone(), i).is_some() {
                return Err(ContentLoadError::DuplicateId {
                    what: "customer",
                    id: archetype.id.to_string(),
                });
            }
        }

        log::info!(
            "Catalog loaded: {} recipes, {} customer archetypes, {} ingredients",
            recipes.len(),
            archetypes.len(),
            ingredients.len()
        );

        Ok(Self {
            recipes: recipes.into_iter().map(Arc::new).collect(),
            archetypes: archetypes.into_iter().map(Arc::new).collect(),
            recipe_index,
            archetype_index,
            ingredients,
        })
    }

    /// All recipes in content order
    pub fn recipes(&self) -> &[Arc<RecipeDefinition>] {
        &self.recipes
    }

    /// All archetypes in content order
    pub fn archetypes(&self) -> &[Arc<CustomerArchetype>] {
        &self.archetypes
    }

    pub fn recipe(&self, id: &RecipeId) -> Option<&Arc<RecipeDefinition>> {
        self.recipe_index.get(id).map(|&i| &self.recipes[i])
    }

    pub fn archetype(&self, id: &ArchetypeId) -> Option<&Arc<CustomerArchetype>> {
        self.archetype_index.get(id).map(|&i| &self.archetypes[i])
    }

    /// Recipes customers may order (everything not tagged `chaos`)
    pub fn regular_recipes(&self) -> impl Iterator<Item = &Arc<RecipeDefinition>> {
        self.recipes.iter().filter(|r| !r.is_chaos())
    }

    /// First recipe tagged `chaos`, if any
    pub fn chaos_recipe(&self) -> Option<&Arc<RecipeDefinition>> {
        self.recipes.iter().find(|r| r.is_chaos())
    }

    /// Every ingredient used by at least one recipe
    pub fn ingredients(&self) -> &BTreeSet<IngredientId> {
        &self.ingredients
    }

    pub fn has_ingredient(&self, id: &IngredientId) -> bool {
        self.ingredients.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = Catalog::builtin().expect("builtin content is valid");
        assert!(catalog.regular_recipes().count() > 0);
        let chaos = catalog.chaos_recipe().expect("builtin has a banishing recipe");
        assert_eq!(
            chaos.ingredients,
            vec![
                IngredientId::from("beans"),
                IngredientId::from("moonlight"),
                IngredientId::from("sigil")
            ]
        );
        assert!(catalog.archetypes().iter().any(|a| a.quirk == QuirkKind::Ghost));
        assert!(
            catalog
                .archetypes()
                .iter()
                .any(|a| a.quirk == QuirkKind::FireElemental)
        );
    }

    #[test]
    fn test_quirk_parsing() {
        let json = r#"[
            {"id": "a", "name": "A", "patience": 10, "quirk": null},
            {"id": "b", "name": "B", "patience": 10, "quirk": "invisible"},
            {"id": "c", "name": "C", "patience": 10, "quirk": "fire_elemental", "tip": [1, 4]},
            {"id": "d", "name": "D", "patience": 10}
        ]"#;
        let content = JsonContent::new(r#"[]"#, json);
        let archetypes = content.load_customer_archetypes().unwrap();
        assert_eq!(archetypes[0].quirk, QuirkKind::None);
        assert_eq!(archetypes[1].quirk, QuirkKind::Ghost);
        assert_eq!(archetypes[2].quirk, QuirkKind::FireElemental);
        assert_eq!(archetypes[2].tip, TipRange { min: 1, max: 4 });
        assert_eq!(archetypes[3].quirk, QuirkKind::None);
        assert_eq!(archetypes[3].tip, TipRange::default());
    }

    #[test]
    fn test_missing_field_is_load_error() {
        let content = JsonContent::new(
            r#"[{"id": "latte", "name": "Latte"}]"#,
            r#"[{"id": "a", "name": "A", "patience": 10}]"#,
        );
        let err = Catalog::load(&content).unwrap_err();
        assert!(matches!(err, ContentLoadError::Parse { what: "recipe", .. }));
    }

    #[test]
    fn test_unknown_quirk_is_load_error() {
        let content = JsonContent::new(
            r#"[{"id": "latte", "name": "Latte", "ingredients": ["milk"]}]"#,
            r#"[{"id": "a", "name": "A", "patience": 10, "quirk": "werewolf"}]"#,
        );
        assert!(matches!(
            Catalog::load(&content),
            Err(ContentLoadError::Parse { what: "customer", .. })
        ));
    }

    #[test]
    fn test_validation_rejects_bad_content() {
        let latte = RecipeDefinition {
            id: "latte".into(),
            name: "Latte".into(),
            ingredients: vec!["beans".into(), "milk".into()],
            tags: vec![],
        };
        let regular = CustomerArchetype {
            id: "regular".into(),
            name: "Regular".into(),
            quirk: QuirkKind::None,
            patience: 20.0,
            dialogue: vec![],
            tip: TipRange::default(),
        };

        let dup = Catalog::from_parts(vec![latte.clone(), latte.clone()], vec![regular.clone()]);
        assert!(matches!(dup, Err(ContentLoadError::DuplicateId { .. })));

        let mut empty = latte.clone();
        empty.ingredients.clear();
        assert!(matches!(
            Catalog::from_parts(vec![empty], vec![regular.clone()]),
            Err(ContentLoadError::EmptyRecipe(_))
        ));

        let mut impatient = regular.clone();
        impatient.patience = 0.0;
        assert!(matches!(
            Catalog::from_parts(vec![latte.clone()], vec![impatient]),
            Err(ContentLoadError::InvalidPatience { .. })
        ));

        let mut only_chaos = latte.clone();
        only_chaos.tags.push(RecipeTag::Chaos);
        assert!(matches!(
            Catalog::from_parts(vec![only_chaos], vec![regular.clone()]),
            Err(ContentLoadError::NoRegularRecipes)
        ));

        assert!(matches!(
            Catalog::from_parts(vec![latte], vec![]),
            Err(ContentLoadError::Empty { what: "customer" })
        ));
    }

    #[test]
    fn test_lookup_and_ingredients() {
        let catalog = Catalog::builtin().unwrap();
        let latte = catalog.recipe(&"stardust_latte".into()).unwrap();
        assert_eq!(latte.name, "Stardust Latte");
        assert!(catalog.has_ingredient(&"stardust".into()));
        assert!(!catalog.has_ingredient(&"ketchup".into()));
        assert!(catalog.recipe(&"nope".into()).is_none());
    }
}
