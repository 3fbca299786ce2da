//! Erreurs typées du client API.
//!
//! Le reste de l'application (main, config, terminal) utilise `anyhow`;
//! ici on a besoin de variants distincts pour que l'orchestrateur et la
//! recherche puissent décider quoi afficher.

use thiserror::Error;

/// Result spécialisé pour les appels API
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Échecs possibles d'un appel à l'API de marché
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// L'API a répondu 429 (trop de requêtes)
    #[error("rate limited by upstream (HTTP 429)")]
    RateLimited,

    /// Autre statut HTTP hors 2xx
    #[error("upstream returned HTTP {status}")]
    HttpError { status: u16 },

    /// Échec de transport (DNS, connexion, timeout, ...)
    #[error("network error: {0}")]
    NetworkError(String),

    /// Réponse 2xx dont le JSON n'a pas la forme attendue
    #[error("unexpected response payload: {0}")]
    Decode(String),

    /// Aucun coin / aucune donnée de marché
    #[error("no matching data")]
    EmptyResult,
}

impl ApiError {
    /// Mappe un statut HTTP non-2xx vers le variant correspondant
    pub fn from_status(status: u16) -> Self {
        if status == 429 {
            ApiError::RateLimited
        } else {
            ApiError::HttpError { status }
        }
    }
}

/// Une liste vide devient `EmptyResult`
pub fn non_empty<T>(items: Vec<T>) -> ApiResult<Vec<T>> {
    if items.is_empty() {
        Err(ApiError::EmptyResult)
    } else {
        Ok(items)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert_eq!(ApiError::from_status(429), ApiError::RateLimited);
        assert_eq!(ApiError::from_status(503), ApiError::HttpError { status: 503 });
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::HttpError { status: 500 };
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Vec::<u8>::new()), Err(ApiError::EmptyResult));
        assert_eq!(non_empty(vec![1, 2]), Ok(vec![1, 2]));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<i32>("invalid").unwrap_err();
        let err: ApiError = json_err.into();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
