use super::geocode::AddressResolver;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize, Serializer};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub geocoder: Arc<dyn AddressResolver>,
}

/// Geocoder metadata riding along with a property. Not authoritative,
/// display-only. On the wire (and in the `extra_field` column) this is a
/// serialized JSON object with all three keys present, `null` when absent,
/// which is the shape existing rows and the map script already expect.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoMeta {
    pub confidence: Option<f64>,
    pub r#type: Option<String>,
    pub display_name: Option<String>,
}

impl GeoMeta {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .expect("GeoMeta has no non-serializable fields")
    }

    /// Parse a stored `extra_field` column value. Rows written by older
    /// versions may hold garbage; that degrades to "no metadata" rather
    /// than failing the whole property read.
    pub fn from_stored(raw: Option<&str>) -> Option<Self> {
        raw.and_then(|s| serde_json::from_str(s).ok())
    }
}

fn geo_meta_as_json_string<S>(
    meta: &Option<GeoMeta>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match meta {
        Some(m) => serializer.serialize_str(&m.to_json()),
        None => serializer.serialize_none(),
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Property {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(serialize_with = "geo_meta_as_json_string")]
    pub extra_field: Option<GeoMeta>,
    pub created_at: NaiveDateTime,
}

/// A property as it comes out of the ingestion workflow, before it has an
/// id or a timestamp. Only [`crate::db_ops::insert_property`] consumes it.
#[derive(Clone, Debug)]
pub struct NewProperty {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub extra_field: GeoMeta,
}

#[derive(Clone, Debug, Serialize)]
pub struct Note {
    pub id: i32,
    pub property_id: i32,
    pub note: String,
    pub created_at: NaiveDateTime,
}

/// Just enough of a property for the sidebar listing.
#[derive(Clone, Debug)]
pub struct PropertySummary {
    pub id: i32,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_meta_wire_shape_keeps_null_keys() {
        let meta = GeoMeta {
            confidence: Some(8.0),
            r#type: None,
            display_name: Some("123 Main St, New York".to_string()),
        };
        let json = meta.to_json();
        assert_eq!(
            json,
            r#"{"confidence":8.0,"type":null,"display_name":"123 Main St, New York"}"#
        );
    }

    #[test]
    fn test_property_serializes_extra_field_as_string() {
        let property = Property {
            id: 1,
            name: "Downtown Office".to_string(),
            address: "123 Main St".to_string(),
            latitude: 40.7,
            longitude: -74.0,
            extra_field: Some(GeoMeta {
                confidence: Some(8.0),
                r#type: Some("office".to_string()),
                display_name: None,
            }),
            created_at: NaiveDateTime::from_timestamp_opt(0, 0).unwrap(),
        };
        let value = serde_json::to_value(&property).expect("serializes");
        // The map script does JSON.parse(property.extra_field), so the
        // field must be a string holding JSON, not a nested object.
        let raw = value["extra_field"].as_str().expect("is a string");
        let parsed: GeoMeta = serde_json::from_str(raw).expect("parses back");
        assert_eq!(parsed, property.extra_field.unwrap());
    }

    #[test]
    fn test_geo_meta_from_stored() {
        let parsed = GeoMeta::from_stored(Some(
            r#"{"confidence":null,"type":"house","display_name":null}"#,
        ))
        .expect("parses");
        assert_eq!(parsed.r#type.as_deref(), Some("house"));
        assert_eq!(parsed.confidence, None);

        assert_eq!(GeoMeta::from_stored(None), None);
        assert_eq!(GeoMeta::from_stored(Some("not json")), None);
    }
}
