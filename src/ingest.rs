//! Property ingestion: validate -> geocode -> persist -> re-read.
//!
//! The submission is split into a pure preparation step (validation plus
//! geocoding, no storage access) and the single-statement insert, so the
//! decision-heavy half can be tested with a stub resolver and no database.

use super::{db_ops, geocode::AddressResolver, models};
use sqlx::PgPool;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Please fill in all fields")]
    MissingFields,
    #[error("Could not geocode the address. Please check the address and try again.")]
    Ungeocodable,
    #[error("Database error occurred. Please try again.")]
    Storage(#[source] anyhow::Error),
}

/// Validate the raw submission and geocode the address. Never touches
/// storage; a failure here guarantees no write happened.
pub async fn prepare_submission(
    resolver: &dyn AddressResolver,
    name: &str,
    address: &str,
) -> Result<models::NewProperty, IngestError> {
    let name = name.trim();
    let address = address.trim();
    if name.is_empty() || address.is_empty() {
        return Err(IngestError::MissingFields);
    }

    let result = resolver
        .resolve(address)
        .await
        .ok_or(IngestError::Ungeocodable)?;

    Ok(models::NewProperty {
        name: name.to_string(),
        address: address.to_string(),
        latitude: result.latitude,
        longitude: result.longitude,
        extra_field: models::GeoMeta {
            confidence: result.confidence,
            r#type: result.r#type,
            display_name: result.display_name,
        },
    })
}

pub async fn ingest_property(
    db: &PgPool,
    resolver: &dyn AddressResolver,
    name: &str,
    address: &str,
) -> Result<models::Property, IngestError> {
    let new = prepare_submission(resolver, name, address).await?;
    db_ops::insert_property(db, &new)
        .await
        .map_err(IngestError::Storage)
}
