//! User record model: the wire shape received from the API and the internal
//! shape consumed by the table, plus typed attribute access for the
//! filter/sort transform.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Geographic point as delivered by the API.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApiLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// Preference block as delivered by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiPreferences {
    pub pet: String,
    pub fruit: String,
}

/// One user record as received from the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUser {
    #[serde(rename = "_id")]
    pub id: String,
    /// Full name, "first last".
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub eye_color: String,
    pub location: ApiLocation,
    pub preferences: ApiPreferences,
}

/// The internal record shape. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub eye_color: String,
    /// Rendered "latitude, longitude" pair.
    pub location: String,
    pub gender: String,
    pub pet_preference: String,
    pub fruit_preference: String,
}

impl From<ApiUser> for User {
    fn from(api: ApiUser) -> Self {
        let (first_name, last_name) = match api.name.split_once(' ') {
            Some((first, last)) => (first.to_owned(), last.to_owned()),
            None => (api.name, String::new()),
        };
        Self {
            id: api.id,
            first_name,
            last_name,
            age: api.age,
            eye_color: api.eye_color,
            location: format!("{}, {}", api.location.latitude, api.location.longitude),
            gender: api.gender,
            pet_preference: api.preferences.pet,
            fruit_preference: api.preferences.fruit,
        }
    }
}

/// Attribute keys of [`User`], used as filter keys and as the sort
/// criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserField {
    Id,
    FirstName,
    LastName,
    Age,
    EyeColor,
    Location,
    Gender,
    PetPreference,
    FruitPreference,
}

/// A field's runtime value: textual fields compare lexicographically,
/// numeric fields numerically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(f64),
}

impl FieldValue<'_> {
    /// Membership test against a filter allow-list. Numeric values match
    /// when a permitted string parses to the same number.
    pub fn matches_any(&self, permitted: &BTreeSet<String>) -> bool {
        match self {
            Self::Text(value) => permitted.contains(*value),
            Self::Number(value) => permitted
                .iter()
                .any(|p| p.parse::<f64>().is_ok_and(|parsed| parsed == *value)),
        }
    }
}

impl User {
    pub fn field(&self, key: UserField) -> FieldValue<'_> {
        match key {
            UserField::Id => FieldValue::Text(&self.id),
            UserField::FirstName => FieldValue::Text(&self.first_name),
            UserField::LastName => FieldValue::Text(&self.last_name),
            UserField::Age => FieldValue::Number(f64::from(self.age)),
            UserField::EyeColor => FieldValue::Text(&self.eye_color),
            UserField::Location => FieldValue::Text(&self.location),
            UserField::Gender => FieldValue::Text(&self.gender),
            UserField::PetPreference => FieldValue::Text(&self.pet_preference),
            UserField::FruitPreference => FieldValue::Text(&self.fruit_preference),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_deserializes() {
        let body = r#"{
            "_id": "5e0a92ae8f63766ca023e68c",
            "name": "Ada Lovelace",
            "age": 36,
            "gender": "female",
            "eyeColor": "brown",
            "location": { "latitude": 51.5, "longitude": -0.12 },
            "preferences": { "pet": "cat", "fruit": "apple" }
        }"#;

        let api: ApiUser = serde_json::from_str(body).expect("valid wire record");
        assert_eq!(api.id, "5e0a92ae8f63766ca023e68c");
        assert_eq!(api.eye_color, "brown");
        assert_eq!(api.preferences.fruit, "apple");
    }

    #[test]
    fn adapter_splits_name_and_renders_location() {
        let api = ApiUser {
            id: "1".to_owned(),
            name: "Ada Lovelace".to_owned(),
            age: 36,
            gender: "female".to_owned(),
            eye_color: "brown".to_owned(),
            location: ApiLocation {
                latitude: 51.5,
                longitude: -0.12,
            },
            preferences: ApiPreferences {
                pet: "cat".to_owned(),
                fruit: "apple".to_owned(),
            },
        };

        let user = User::from(api);
        assert_eq!(user.first_name, "Ada");
        assert_eq!(user.last_name, "Lovelace");
        assert_eq!(user.location, "51.5, -0.12");
        assert_eq!(user.pet_preference, "cat");
    }

    #[test]
    fn adapter_handles_single_word_name() {
        let api = ApiUser {
            id: "2".to_owned(),
            name: "Plato".to_owned(),
            age: 80,
            gender: "male".to_owned(),
            eye_color: "grey".to_owned(),
            location: ApiLocation {
                latitude: 0.0,
                longitude: 0.0,
            },
            preferences: ApiPreferences {
                pet: "owl".to_owned(),
                fruit: "fig".to_owned(),
            },
        };

        let user = User::from(api);
        assert_eq!(user.first_name, "Plato");
        assert_eq!(user.last_name, "");
    }

    #[test]
    fn numeric_field_matches_parsed_values() {
        let permitted: BTreeSet<String> = ["36".to_owned(), "40".to_owned()].into();
        assert!(FieldValue::Number(36.0).matches_any(&permitted));
        assert!(!FieldValue::Number(20.0).matches_any(&permitted));
        // Non-numeric permitted strings never match a numeric field.
        let junk: BTreeSet<String> = ["old".to_owned()].into();
        assert!(!FieldValue::Number(36.0).matches_any(&junk));
    }
}
