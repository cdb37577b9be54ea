//! Text form of the rating collection.
//!
//! JSON array of ratings, then standard padded Base64 so the result is safe to keep in any
//! string-valued store.

use base64::{engine::general_purpose, Engine as _};

use crate::{
    error::{AppError, AppResult},
    models::Rating,
};

/// Encodes the collection, preserving order and every field
pub fn encode(ratings: &[Rating]) -> AppResult<String> {
    let json = serde_json::to_vec(ratings)
        .map_err(|e| AppError::Codec(format!("Rating serialization error: {}", e)))?;
    Ok(general_purpose::STANDARD.encode(json))
}

/// Exact inverse of [`encode`]
pub fn decode(text: &str) -> AppResult<Vec<Rating>> {
    let bytes = general_purpose::STANDARD
        .decode(text.trim())
        .map_err(|e| AppError::Codec(format!("Invalid base64: {}", e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| AppError::Codec(format!("Rating deserialization error: {}", e)))
}

/// Decodes stored text, falling back to an empty collection
///
/// Absent or unreadable text is logged and never fatal.
pub fn decode_or_empty(text: Option<&str>) -> Vec<Rating> {
    let Some(text) = text else {
        tracing::debug!("No stored ratings, starting empty");
        return Vec::new();
    };

    if text.trim().is_empty() {
        return Vec::new();
    }

    match decode(text) {
        Ok(ratings) => ratings,
        Err(e) => {
            tracing::warn!(error = %e, "Stored ratings unreadable, starting empty");
            Vec::new()
        }
    }
}
