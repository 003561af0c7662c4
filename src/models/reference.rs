//! Static municipality / school lists used by the sign-up pickers
//!
//! `cities.json` is an array of names (or `{ "name": ... }` objects),
//! `schools.json` an array of `{ "name", "city" }` objects.

use crate::error::{AppResult, ConfigError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CityRepr")]
pub struct City {
    pub name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CityRepr {
    Name(String),
    Object { name: String },
}

impl From<CityRepr> for City {
    fn from(repr: CityRepr) -> Self {
        match repr {
            CityRepr::Name(name) | CityRepr::Object { name } => City { name },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct School {
    pub name: String,
    #[serde(alias = "municipality", alias = "grad")]
    pub city: String,
}

/// Both lists, loaded once at startup
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub cities: Vec<City>,
    pub schools: Vec<School>,
}

impl ReferenceData {
    /// Loads `cities.json` and `schools.json` from `dir`
    pub async fn load(dir: &Path) -> AppResult<Self> {
        let cities: Vec<City> = load_json(&dir.join("cities.json")).await?;
        let schools: Vec<School> = load_json(&dir.join("schools.json")).await?;
        tracing::info!(
            "Loaded {} cities and {} schools from {}",
            cities.len(),
            schools.len(),
            dir.display()
        );
        Ok(Self { cities, schools })
    }

    pub fn has_city(&self, name: &str) -> bool {
        self.cities.iter().any(|c| c.name == name)
    }

    /// Schools located in `city`, sorted by name
    pub fn schools_in(&self, city: &str) -> Vec<&School> {
        let mut schools: Vec<&School> = self.schools.iter().filter(|s| s.city == city).collect();
        schools.sort_by(|a, b| a.name.cmp(&b.name));
        schools
    }
}

async fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> AppResult<T> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::ReferenceData {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
    serde_json::from_str(&content).map_err(|e| {
        ConfigError::ReferenceData {
            path: path.display().to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loads_both_city_shapes_and_filters_schools() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("cities.json"),
            r#"["Beograd", {"name": "Novi Sad"}]"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("schools.json"),
            r#"[
                {"name": "Zemunska gimnazija", "city": "Beograd"},
                {"name": "Gimnazija Jovan Jovanovic Zmaj", "municipality": "Novi Sad"},
                {"name": "Deveta gimnazija", "city": "Beograd"}
            ]"#,
        )
        .unwrap();

        let data = ReferenceData::load(dir.path()).await.unwrap();

        assert!(data.has_city("Novi Sad"));
        let names: Vec<&str> = data.schools_in("Beograd").iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Deveta gimnazija", "Zemunska gimnazija"]);
    }

    #[tokio::test]
    async fn missing_file_is_reported_with_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = ReferenceData::load(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("cities.json"));
    }
}
