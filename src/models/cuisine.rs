use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SURPRISE_ID: &str = "surprise";

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Cuisine {
    Arabic,
    Indian,
    Italian,
    Chinese,
    Japanese,
    Mexican,
    Thai,
    American,
    Mediterranean,
}

impl Cuisine {
    /// Catalog order, which is also the order cuisine tags are inferred in.
    pub const ALL: [Cuisine; 9] = [
        Cuisine::Arabic,
        Cuisine::Indian,
        Cuisine::Italian,
        Cuisine::Chinese,
        Cuisine::Japanese,
        Cuisine::Mexican,
        Cuisine::Thai,
        Cuisine::American,
        Cuisine::Mediterranean,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Cuisine::Arabic => "arabic",
            Cuisine::Indian => "indian",
            Cuisine::Italian => "italian",
            Cuisine::Chinese => "chinese",
            Cuisine::Japanese => "japanese",
            Cuisine::Mexican => "mexican",
            Cuisine::Thai => "thai",
            Cuisine::American => "american",
            Cuisine::Mediterranean => "mediterranean",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Cuisine::Arabic => "Arabic",
            Cuisine::Indian => "Indian",
            Cuisine::Italian => "Italian",
            Cuisine::Chinese => "Chinese",
            Cuisine::Japanese => "Japanese",
            Cuisine::Mexican => "Mexican",
            Cuisine::Thai => "Thai",
            Cuisine::American => "American",
            Cuisine::Mediterranean => "Mediterranean",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Cuisine::Arabic => "🥙",
            Cuisine::Indian => "🍛",
            Cuisine::Italian => "🍝",
            Cuisine::Chinese => "🥡",
            Cuisine::Japanese => "🍣",
            Cuisine::Mexican => "🌮",
            Cuisine::Thai => "🍲",
            Cuisine::American => "🍔",
            Cuisine::Mediterranean => "🥗",
        }
    }

    /// Search terms sent to the nearby search and matched against place names.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Cuisine::Arabic => &["Arabic", "Lebanese", "Mediterranean"],
            Cuisine::Indian => &["Indian", "Curry"],
            Cuisine::Italian => &["Italian", "Pizza"],
            Cuisine::Chinese => &["Chinese", "Asian"],
            Cuisine::Japanese => &["Japanese", "Sushi"],
            Cuisine::Mexican => &["Mexican", "Tacos"],
            Cuisine::Thai => &["Thai", "Spicy"],
            Cuisine::American => &["American", "Burgers"],
            Cuisine::Mediterranean => &["Mediterranean", "Grill"],
        }
    }
}

impl fmt::Display for Cuisine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("unknown cuisine: {0}")]
pub struct UnknownCuisine(pub String);

impl FromStr for Cuisine {
    type Err = UnknownCuisine;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Cuisine::ALL
            .into_iter()
            .find(|cuisine| cuisine.id() == wanted)
            .ok_or_else(|| UnknownCuisine(s.to_string()))
    }
}

/// Secondary keyword table consulted when neither place types nor the catalog
/// keywords produced a cuisine tag. Order matters, first hit wins.
pub const PLACE_TYPE_CUISINES: [(&str, &str); 10] = [
    ("cafe", "Cafe"),
    ("pizza", "Italian"),
    ("sushi", "Japanese"),
    ("curry", "Indian"),
    ("kebab", "Mediterranean"),
    ("burger", "American"),
    ("steak", "American"),
    ("seafood", "Seafood"),
    ("vegetarian", "Vegetarian"),
    ("vegan", "Vegan"),
];

/// What the user asked for on the cuisine step.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CuisinePreference {
    Selected(Vec<Cuisine>),
    Surprise,
}

impl Default for CuisinePreference {
    fn default() -> Self {
        CuisinePreference::Selected(Vec::new())
    }
}

impl CuisinePreference {
    pub fn is_empty(&self) -> bool {
        match self {
            CuisinePreference::Selected(cuisines) => cuisines.is_empty(),
            CuisinePreference::Surprise => false,
        }
    }

    /// Adds the cuisine, or removes it when it is already selected.
    /// A toggle while "surprise" is active starts a fresh selection.
    pub fn toggle(&mut self, cuisine: Cuisine) {
        match self {
            CuisinePreference::Surprise => {
                *self = CuisinePreference::Selected(vec![cuisine]);
            }
            CuisinePreference::Selected(cuisines) => {
                if let Some(position) = cuisines.iter().position(|c| *c == cuisine) {
                    cuisines.remove(position);
                } else {
                    cuisines.push(cuisine);
                }
            }
        }
    }

    /// Identifiers as the front end knows them, "surprise" included.
    pub fn ids(&self) -> Vec<String> {
        match self {
            CuisinePreference::Surprise => vec![SURPRISE_ID.to_string()],
            CuisinePreference::Selected(cuisines) => {
                cuisines.iter().map(|c| c.id().to_string()).collect()
            }
        }
    }

    /// Parses identifiers coming from a request. Any "surprise" entry wins over
    /// the rest of the list.
    pub fn from_ids<S: AsRef<str>>(ids: &[S]) -> Result<Self, UnknownCuisine> {
        if ids.iter().any(|id| id.as_ref().trim().eq_ignore_ascii_case(SURPRISE_ID)) {
            return Ok(CuisinePreference::Surprise);
        }

        let mut preference = CuisinePreference::default();
        for id in ids {
            if id.as_ref().trim().is_empty() {
                continue;
            }
            let cuisine: Cuisine = id.as_ref().parse()?;
            if let CuisinePreference::Selected(cuisines) = &mut preference {
                if !cuisines.contains(&cuisine) {
                    cuisines.push(cuisine);
                }
            }
        }
        Ok(preference)
    }
}
