// ============================================================================
// Enum : Currency
// ============================================================================
// Devises d'affichage supportées par le dashboard
//
// CONCEPTS RUST :
// 1. Enum Copy : petite valeur, copiée au lieu d'être déplacée
// 2. &'static str : codes et symboles vivent dans le binaire
// 3. Cycle d'états : next() / previous() pour le sélecteur de devise
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

/// Devise de cotation (paramètre `vs_currency` de l'API)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    /// Dollar américain
    Usd,
    /// Roupie indienne
    Inr,
    /// Euro
    Eur,
}

impl Currency {
    /// Code envoyé à l'API (ex: "usd")
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "usd",
            Currency::Inr => "inr",
            Currency::Eur => "eur",
        }
    }

    /// Symbole affiché devant les montants
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Inr => "₹",
            Currency::Eur => "€",
        }
    }

    /// Parse un code de devise (insensible à la casse)
    ///
    /// Retourne None pour un code inconnu : l'appelant décide quoi faire
    /// (ignorer la saisie, garder la devise par défaut, ...)
    pub fn from_code(code: &str) -> Option<Currency> {
        match code.trim().to_ascii_lowercase().as_str() {
            "usd" => Some(Currency::Usd),
            "inr" => Some(Currency::Inr),
            "eur" => Some(Currency::Eur),
            _ => None,
        }
    }

    /// Toutes les devises, dans l'ordre du sélecteur
    pub fn all() -> [Currency; 3] {
        [Currency::Usd, Currency::Inr, Currency::Eur]
    }

    /// Devise suivante (USD → INR → EUR → USD)
    pub fn next(&self) -> Currency {
        match self {
            Currency::Usd => Currency::Inr,
            Currency::Inr => Currency::Eur,
            Currency::Eur => Currency::Usd,
        }
    }

    /// Devise précédente (cycle inverse)
    pub fn previous(&self) -> Currency {
        match self {
            Currency::Usd => Currency::Eur,
            Currency::Inr => Currency::Usd,
            Currency::Eur => Currency::Inr,
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::Usd
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code().to_uppercase())
    }
}
