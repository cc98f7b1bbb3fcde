//! Taxonomic classification and per-creature identification.

use pond_core::{CreatureId, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Genus and species, normalized on construction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Classification {
    genus: String,
    species: String,
}

impl Classification {
    pub fn new(genus: &str, species: &str) -> Result<Self> {
        let genus = genus.trim();
        let species = species.trim();
        if genus.is_empty() {
            return Err(Error::InvalidArgument("genus must not be blank".to_string()));
        }
        if species.is_empty() {
            return Err(Error::InvalidArgument("species must not be blank".to_string()));
        }

        Ok(Self {
            genus: capitalize(genus),
            species: species.to_lowercase(),
        })
    }

    pub fn genus(&self) -> &str {
        &self.genus
    }

    pub fn species(&self) -> &str {
        &self.species
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.genus, self.species)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Who a creature is: its classification, identifier and generation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identification {
    classification: Classification,
    identifier: CreatureId,
    generation: u32,
}

impl Identification {
    pub fn new(classification: Classification, identifier: CreatureId, generation: u32) -> Self {
        Self {
            classification,
            identifier,
            generation,
        }
    }

    /// Identification for a child: same classification, next generation.
    pub fn offspring(&self, identifier: CreatureId) -> Self {
        Self {
            classification: self.classification.clone(),
            identifier,
            generation: self.generation + 1,
        }
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    pub fn identifier(&self) -> CreatureId {
        self.identifier
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}
