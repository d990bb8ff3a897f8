use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::QuizError;

/// One country as stored in the reference file.
#[derive(Debug, Clone, Deserialize)]
pub struct CountryRecord {
    pub name: String,
    pub capital: String,
    pub continent: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub flag: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReferenceFile {
    continents: Vec<String>,
    countries: Vec<CountryRecord>,
}

/// Immutable country/capital tables, loaded once at startup.
#[derive(Debug)]
pub struct ReferenceData {
    continents: Vec<String>,
    countries: Vec<CountryRecord>,
    by_country: HashMap<String, usize>,
    by_capital: HashMap<String, usize>,
    aliases: HashMap<String, String>,
}

/// Case- and spelling-insensitive lookup key.
pub fn fold_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .replace('ё', "е")
}

impl ReferenceData {
    /// Reads and validates the reference file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read reference data from {}", path.display()))?;
        let data = Self::from_json_str(&raw)?;
        Ok(data)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, QuizError> {
        let file: ReferenceFile = serde_json::from_str(raw)
            .map_err(|e| QuizError::DataIntegrity(format!("malformed reference file: {e}")))?;
        Self::build(file.continents, file.countries)
    }

    fn build(continents: Vec<String>, countries: Vec<CountryRecord>) -> Result<Self, QuizError> {
        let mut by_country = HashMap::new();
        let mut by_capital = HashMap::new();
        let continent_keys: Vec<String> = continents.iter().map(|c| fold_key(c)).collect();

        for (idx, country) in countries.iter().enumerate() {
            if !continent_keys.contains(&fold_key(&country.continent)) {
                return Err(QuizError::DataIntegrity(format!(
                    "{} references unknown continent {}",
                    country.name, country.continent
                )));
            }
            if by_country.insert(fold_key(&country.name), idx).is_some() {
                return Err(QuizError::DataIntegrity(format!(
                    "duplicate country {}",
                    country.name
                )));
            }
            if by_capital.insert(fold_key(&country.capital), idx).is_some() {
                return Err(QuizError::DataIntegrity(format!(
                    "capital {} is shared by several countries",
                    country.capital
                )));
            }
        }

        // Canonical names win over aliases; the first alias claim wins among aliases.
        let mut aliases = HashMap::new();
        for country in &countries {
            for alias in &country.aliases {
                let key = fold_key(alias);
                if by_country.contains_key(&key) || by_capital.contains_key(&key) {
                    continue;
                }
                if aliases.contains_key(&key) {
                    tracing::warn!("Alias '{}' claimed twice, keeping the first owner", alias);
                    continue;
                }
                aliases.insert(key, country.name.clone());
            }
        }

        Ok(Self {
            continents,
            countries,
            by_country,
            by_capital,
            aliases,
        })
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    /// Declared continents, in file order.
    pub fn continents(&self) -> &[String] {
        &self.continents
    }

    /// Canonical spelling of a continent name, if declared.
    pub fn continent(&self, name: &str) -> Option<&str> {
        let key = fold_key(name);
        self.continents
            .iter()
            .find(|c| fold_key(c) == key)
            .map(String::as_str)
    }

    fn filtered(&self, continent: Option<&str>) -> impl Iterator<Item = &CountryRecord> {
        let key = continent.map(fold_key);
        self.countries
            .iter()
            .filter(move |c| key.as_ref().map_or(true, |k| fold_key(&c.continent) == *k))
    }

    pub fn list_countries(&self, continent: Option<&str>) -> Vec<String> {
        self.filtered(continent).map(|c| c.name.clone()).collect()
    }

    pub fn list_capitals(&self, continent: Option<&str>) -> Vec<String> {
        self.filtered(continent).map(|c| c.capital.clone()).collect()
    }

    /// Full record for a country given by any known spelling.
    pub fn entry(&self, country: &str) -> Option<&CountryRecord> {
        let key = fold_key(country);
        let key = match self.aliases.get(&key) {
            Some(canonical) => fold_key(canonical),
            None => key,
        };
        self.by_country.get(&key).map(|&idx| &self.countries[idx])
    }

    pub fn capital_of(&self, country: &str) -> Option<&str> {
        self.entry(country).map(|c| c.capital.as_str())
    }

    pub fn country_of(&self, capital: &str) -> Option<&str> {
        self.by_capital
            .get(&fold_key(capital))
            .map(|&idx| self.countries[idx].name.as_str())
    }

    pub fn flag_of(&self, country: &str) -> Option<&str> {
        self.entry(country).and_then(|c| c.flag.as_deref())
    }

    pub fn image_of(&self, country: &str) -> Option<&str> {
        self.entry(country).and_then(|c| c.image.as_deref())
    }

    /// Canonical country or capital name for any known spelling or alias.
    pub fn normalize(&self, name: &str) -> Option<&str> {
        let key = fold_key(name);
        if let Some(&idx) = self.by_country.get(&key) {
            return Some(self.countries[idx].name.as_str());
        }
        if let Some(&idx) = self.by_capital.get(&key) {
            return Some(self.countries[idx].capital.as_str());
        }
        let canonical = self.aliases.get(&key)?;
        self.by_country
            .get(&fold_key(canonical))
            .map(|&idx| self.countries[idx].name.as_str())
    }
}
