use crate::constants::INGREDIENT_SLOTS;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

/// Anything the catalog aggregator can merge and sort.
///
/// The aggregator never looks past these two accessors.
pub trait CatalogItem {
    /// Unique key used for deduplication
    fn id(&self) -> &str;

    /// Name used for ordering
    fn display_name(&self) -> &str;
}

/// Fields consulted by the query filter, in match order.
pub trait Searchable {
    fn search_fields(&self) -> Vec<Option<&str>>;
}

/// One slice of the remote catalog, queried by leading character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartitionKey(pub char);

impl PartitionKey {
    pub fn as_char(&self) -> char {
        self.0
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<char> for PartitionKey {
    fn from(c: char) -> Self {
        PartitionKey(c)
    }
}

/// A drink record from TheCocktailDB.
///
/// Only the fields this crate reads are typed; everything else (ingredient and
/// measure slots, tags, translations) is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drink {
    #[serde(rename = "idDrink", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "strDrink")]
    pub name: String,
    #[serde(rename = "strCategory", default)]
    pub category: Option<String>,
    #[serde(rename = "strAlcoholic", default)]
    pub alcoholic: Option<String>,
    #[serde(rename = "strGlass", default)]
    pub glass: Option<String>,
    #[serde(rename = "strInstructions", default)]
    pub instructions: Option<String>,
    #[serde(rename = "strDrinkThumb", default)]
    pub thumbnail: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Drink {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: None,
            alcoholic: None,
            glass: None,
            instructions: None,
            thumbnail: None,
            extra: Map::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_alcoholic(mut self, alcoholic: impl Into<String>) -> Self {
        self.alcoholic = Some(alcoholic.into());
        self
    }

    fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Ingredient lines as "measure ingredient", or just the ingredient when no
    /// measure is given. Empty slots are skipped.
    pub fn ingredients(&self) -> Vec<String> {
        (1..=INGREDIENT_SLOTS)
            .filter_map(|i| {
                let ingredient = self.extra_str(&format!("strIngredient{}", i))?;
                match self.extra_str(&format!("strMeasure{}", i)) {
                    Some(measure) => Some(format!("{} {}", measure, ingredient)),
                    None => Some(ingredient.to_string()),
                }
            })
            .collect()
    }
}

impl CatalogItem for Drink {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl Searchable for Drink {
    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![
            Some(self.name.as_str()),
            self.category.as_deref(),
            self.alcoholic.as_deref(),
        ]
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number id, got {}",
            other
        ))),
    }
}

/// Response body shared by the search and random endpoints.
///
/// The API sends `"drinks": null` when nothing matches. Records are kept raw
/// so one bad entry does not sink the rest of the batch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DrinksEnvelope {
    #[serde(default)]
    pub drinks: Option<Vec<Value>>,
}

impl DrinksEnvelope {
    /// Parsed drinks; records that do not parse are skipped with a warning.
    pub fn into_drinks(self) -> Vec<Drink> {
        self.drinks
            .unwrap_or_default()
            .into_iter()
            .filter_map(|raw| match serde_json::from_value::<Drink>(raw) {
                Ok(drink) => Some(drink),
                Err(e) => {
                    warn!(error = %e, "Skipping malformed drink record");
                    None
                }
            })
            .collect()
    }
}
