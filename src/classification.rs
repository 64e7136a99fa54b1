use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use strum::Display;
use utoipa::ToSchema;

/// Best-effort nature bucket for a catalog item, inferred from its
/// free-text designation. Purely a read-side label with no correctness
/// contract; nothing in the consistency engine depends on it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemNature {
    Equipment,
    Service,
    Supplies,
    Works,
    Other,
}

/// Replaceable labeling heuristic. Implementations must be stateless and
/// infallible; swap the default out at construction when a better
/// classifier exists.
pub trait DesignationClassifier: Send + Sync {
    fn classify(&self, designation: &str) -> ItemNature;
}

static KEYWORD_TABLE: Lazy<Vec<(ItemNature, Vec<&'static str>)>> = Lazy::new(|| {
    vec![
        (
            ItemNature::Equipment,
            vec![
                "equipment",
                "ordinateur",
                "imprimante",
                "machine",
                "materiel",
                "vehicule",
            ],
        ),
        (
            ItemNature::Service,
            vec!["service", "maintenance", "formation", "assistance", "audit"],
        ),
        (
            ItemNature::Supplies,
            vec!["fourniture", "papier", "consommable", "supplies", "cartouche"],
        ),
        (
            ItemNature::Works,
            vec!["travaux", "construction", "renovation", "amenagement"],
        ),
    ]
});

/// Default classifier: first case-insensitive keyword hit wins, in table
/// order. Unknown designations fall through to Other.
#[derive(Debug, Default, Clone)]
pub struct KeywordClassifier;

impl DesignationClassifier for KeywordClassifier {
    fn classify(&self, designation: &str) -> ItemNature {
        let needle = designation.to_lowercase();
        for (nature, keywords) in KEYWORD_TABLE.iter() {
            if keywords.iter().any(|kw| needle.contains(kw)) {
                return *nature;
            }
        }
        ItemNature::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_hits_map_to_natures() {
        let c = KeywordClassifier;
        assert_eq!(c.classify("Ordinateur portable 15\""), ItemNature::Equipment);
        assert_eq!(c.classify("Contrat de MAINTENANCE annuel"), ItemNature::Service);
        assert_eq!(c.classify("Papier A4 80g"), ItemNature::Supplies);
        assert_eq!(c.classify("Travaux de renovation"), ItemNature::Works);
    }

    #[test]
    fn unknown_designations_fall_through_to_other() {
        assert_eq!(KeywordClassifier.classify("Zzz divers"), ItemNature::Other);
    }
}
