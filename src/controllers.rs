use super::{
    components,
    components::Component,
    db_ops,
    errors::ApiError,
    ingest,
    ingest::IngestError,
    models::AppState,
};
use axum::{
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    Form, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

/// The sidebar is decoration; if the listing query fails we log it and
/// render the page with an empty list rather than failing the request.
async fn sidebar_properties(
    db: &sqlx::PgPool,
) -> Vec<super::models::PropertySummary> {
    match db_ops::list_properties(db).await {
        Ok(properties) => properties,
        Err(e) => {
            tracing::error!("failed to list properties for sidebar: {:?}", e);
            Vec::new()
        }
    }
}

pub async fn root(
    State(AppState { db, .. }): State<AppState>,
) -> impl IntoResponse {
    let properties = sidebar_properties(&db).await;
    let page = components::Page {
        title: "Brokerio".to_string(),
        children: Box::new(components::Home {
            error: None,
            created: None,
            form_name: "".to_string(),
            form_address: "".to_string(),
            properties: &properties,
        }),
    }
    .render();
    page
}

#[derive(Deserialize)]
pub struct PropertySubmission {
    name: Option<String>,
    address: Option<String>,
}

pub async fn submit_property(
    State(AppState { db, geocoder }): State<AppState>,
    Form(form): Form<PropertySubmission>,
) -> impl IntoResponse {
    let name = form.name.unwrap_or_default();
    let address = form.address.unwrap_or_default();

    let outcome =
        ingest::ingest_property(&db, geocoder.as_ref(), &name, &address).await;
    let properties = sidebar_properties(&db).await;

    match outcome {
        Ok(property) => components::Page {
            title: "Brokerio".to_string(),
            children: Box::new(components::Home {
                error: None,
                created: Some(&property),
                form_name: "".to_string(),
                form_address: "".to_string(),
                properties: &properties,
            }),
        }
        .render(),
        Err(e) => {
            if let IngestError::Storage(cause) = &e {
                tracing::error!("property insert failed: {:?}", cause);
            }
            components::Page {
                title: "Brokerio".to_string(),
                children: Box::new(components::Home {
                    error: Some(e.to_string()),
                    created: None,
                    // hand the rejected values back to the form
                    form_name: name,
                    form_address: address,
                    properties: &properties,
                }),
            }
            .render()
        }
    }
}

pub async fn map_page() -> impl IntoResponse {
    components::MapPage.render()
}

pub async fn get_map_js() -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    headers.insert(
        "content-type",
        HeaderValue::from_str("text/javascript")
            .expect("We can insert text/javascript headers"),
    );
    (headers, include_str!("./map.js"))
}

/// `id` must be integer-like; anything else is rejected before we touch
/// storage. `0` is accepted and falls through to a not-found lookup, since
/// generated ids start at 1.
fn parse_property_id(raw: Option<&str>) -> Option<i32> {
    raw?.trim().parse().ok()
}

#[derive(Deserialize)]
pub struct PropertyQuery {
    id: Option<String>,
}

pub async fn get_property_api(
    State(AppState { db, .. }): State<AppState>,
    Query(PropertyQuery { id }): Query<PropertyQuery>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_property_id(id.as_deref())
        .ok_or(ApiError::Validation("Invalid or missing property ID"))?;

    let property = db_ops::get_property(&db, id)
        .await?
        .ok_or(ApiError::NotFound("Property not found"))?;
    let notes = db_ops::list_notes(&db, id).await?;

    Ok(Json(json!({ "property": property, "notes": notes })))
}

/// The map script posts the property id as a string (it comes off the query
/// string), so both JSON numbers and numeric strings are accepted.
fn numeric_property_id(value: Option<&Value>) -> Option<i32> {
    match value? {
        Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Validate the note submission before any storage access. The id is
/// checked first, then the trimmed text, so the two failures stay
/// distinguishable.
fn validate_note_payload(payload: &Value) -> Result<(i32, &str), ApiError> {
    let property_id = numeric_property_id(payload.get("property_id"))
        .ok_or(ApiError::Validation("Invalid or missing property_id"))?;
    let note = payload
        .get("note")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim();
    if note.is_empty() {
        return Err(ApiError::Validation("Note cannot be empty"));
    }
    Ok((property_id, note))
}

pub async fn create_note_api(
    State(AppState { db, .. }): State<AppState>,
    body: String,
) -> Result<impl IntoResponse, ApiError> {
    let payload: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    let (property_id, note) = validate_note_payload(&payload)?;

    if !db_ops::property_exists(&db, property_id).await? {
        return Err(ApiError::NotFound("Property not found"));
    }
    let note = db_ops::insert_note(&db, property_id, note).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "note": note })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_property_id() {
        // mirrors what the read API must accept and reject
        assert_eq!(parse_property_id(Some("123")), Some(123));
        assert_eq!(parse_property_id(Some("0")), Some(0));
        assert_eq!(parse_property_id(Some(" 42 ")), Some(42));
        assert_eq!(parse_property_id(Some("invalid")), None);
        assert_eq!(parse_property_id(Some("abc123")), None);
        assert_eq!(parse_property_id(Some("1.5")), None);
        assert_eq!(parse_property_id(Some("")), None);
        assert_eq!(parse_property_id(None), None);
    }

    #[test]
    fn test_numeric_property_id() {
        assert_eq!(numeric_property_id(Some(&json!(1))), Some(1));
        assert_eq!(numeric_property_id(Some(&json!("7"))), Some(7));
        assert_eq!(numeric_property_id(Some(&json!("x"))), None);
        assert_eq!(numeric_property_id(Some(&json!(true))), None);
        assert_eq!(numeric_property_id(Some(&json!(null))), None);
        assert_eq!(numeric_property_id(None), None);
    }

    #[test]
    fn test_blank_note_is_rejected() {
        for note in [json!("  "), json!(""), json!(null), json!(12)] {
            let err = validate_note_payload(&json!({
                "property_id": 1,
                "note": note,
            }))
            .expect_err("blank note must not validate");
            assert_eq!(err.to_string(), "Note cannot be empty");
        }

        let err = validate_note_payload(&json!({ "property_id": 1 }))
            .expect_err("missing note must not validate");
        assert_eq!(err.to_string(), "Note cannot be empty");
    }

    #[test]
    fn test_bad_property_id_is_rejected_before_the_note_is_read() {
        for payload in [
            json!({ "note": "looks fine" }),
            json!({ "property_id": "abc", "note": "looks fine" }),
            json!({ "property_id": null, "note": "" }),
            Value::Null,
        ] {
            let err = validate_note_payload(&payload)
                .expect_err("bad id must not validate");
            assert_eq!(err.to_string(), "Invalid or missing property_id");
        }
    }

    #[test]
    fn test_valid_note_payload_is_trimmed() {
        let payload = json!({
            "property_id": "3",
            "note": "  needs a new roof  ",
        });
        let (property_id, note) =
            validate_note_payload(&payload).expect("validates");
        assert_eq!(property_id, 3);
        assert_eq!(note, "needs a new roof");
    }
}
