use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The fixed set of life categories. Declaration order is the display order
/// for pickers, legends and summary tie-breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKey {
    Deep,
    Study,
    Gym,
    Social,
    Rest,
}

impl CategoryKey {
    pub const ALL: [CategoryKey; 5] = [
        CategoryKey::Deep,
        CategoryKey::Study,
        CategoryKey::Gym,
        CategoryKey::Social,
        CategoryKey::Rest,
    ];

    pub fn id(self) -> &'static str {
        match self {
            CategoryKey::Deep => "deep",
            CategoryKey::Study => "study",
            CategoryKey::Gym => "gym",
            CategoryKey::Social => "social",
            CategoryKey::Rest => "rest",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CategoryKey::Deep => "Deep Work",
            CategoryKey::Study => "Study",
            CategoryKey::Gym => "Gym",
            CategoryKey::Social => "Social",
            CategoryKey::Rest => "Rest",
        }
    }
}

impl Display for CategoryKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for CategoryKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        CategoryKey::ALL
            .into_iter()
            .find(|key| key.id() == trimmed)
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryKey,
    pub label: &'static str,
}

pub fn list_categories() -> [Category; 5] {
    CategoryKey::ALL.map(|key| Category {
        id: key,
        label: label_for(key),
    })
}

pub fn label_for(key: CategoryKey) -> &'static str {
    key.label()
}

/// Label lookup for ids that arrive as text (CLI flags, stored rows).
pub fn label_for_id(id: &str) -> Result<&'static str, ValidationError> {
    id.parse::<CategoryKey>().map(label_for)
}

#[cfg(test)]
mod tests {
    use super::{CategoryKey, label_for_id, list_categories};
    use crate::error::ValidationError;

    #[test]
    fn lists_categories_in_fixed_order() {
        let ids = list_categories()
            .iter()
            .map(|category| category.id.id())
            .collect::<Vec<_>>();
        assert_eq!(ids, ["deep", "study", "gym", "social", "rest"]);
        assert_eq!(list_categories()[0].label, "Deep Work");
    }

    #[test]
    fn parses_known_ids_and_rejects_the_rest() {
        assert_eq!("gym".parse::<CategoryKey>(), Ok(CategoryKey::Gym));
        assert_eq!(" rest ".parse::<CategoryKey>(), Ok(CategoryKey::Rest));
        assert_eq!(
            "".parse::<CategoryKey>(),
            Err(ValidationError::UnknownCategory(String::new()))
        );
        assert_eq!(
            label_for_id("Deep Work"),
            Err(ValidationError::UnknownCategory("Deep Work".to_string()))
        );
        assert_eq!(label_for_id("social"), Ok("Social"));
    }

    #[test]
    fn serializes_as_lowercase_id() {
        let json = serde_json::to_string(&CategoryKey::Deep).expect("encode");
        assert_eq!(json, "\"deep\"");
        let key: CategoryKey = serde_json::from_str("\"study\"").expect("decode");
        assert_eq!(key, CategoryKey::Study);
    }
}
