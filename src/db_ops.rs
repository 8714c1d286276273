use super::models;
use anyhow::Result;
use chrono::NaiveDateTime;
use sqlx::{postgres::PgPool, query_as, query_scalar};

#[derive(sqlx::FromRow)]
struct PropertyRow {
    id: i32,
    name: String,
    address: String,
    latitude: f64,
    longitude: f64,
    extra_field: Option<String>,
    created_at: NaiveDateTime,
}

impl From<PropertyRow> for models::Property {
    fn from(row: PropertyRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            address: row.address,
            latitude: row.latitude,
            longitude: row.longitude,
            extra_field: models::GeoMeta::from_stored(
                row.extra_field.as_deref(),
            ),
            created_at: row.created_at,
        }
    }
}

pub async fn get_property(
    db: &PgPool,
    id: i32,
) -> Result<Option<models::Property>> {
    let row = query_as::<_, PropertyRow>(
        "select id, name, address, latitude, longitude, extra_field, created_at
        from properties where id = $1",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(row.map(Into::into))
}

/// Insert the property in a single statement, then re-read the row by its
/// generated id so the caller gets the database's view of it (id and
/// created_at included).
pub async fn insert_property(
    db: &PgPool,
    new: &models::NewProperty,
) -> Result<models::Property> {
    let id: i32 = query_scalar(
        "insert into properties (name, address, latitude, longitude, extra_field)
        values ($1, $2, $3, $4, $5)
        returning id",
    )
    .bind(&new.name)
    .bind(&new.address)
    .bind(new.latitude)
    .bind(new.longitude)
    .bind(new.extra_field.to_json())
    .fetch_one(db)
    .await?;

    let property = get_property(db, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("property {id} vanished after insert"))?;

    Ok(property)
}

pub async fn list_properties(
    db: &PgPool,
) -> Result<Vec<models::PropertySummary>> {
    #[derive(sqlx::FromRow)]
    struct QRes {
        id: i32,
        name: String,
    }
    let res = query_as::<_, QRes>(
        "select id, name from properties order by created_at desc",
    )
    .fetch_all(db)
    .await?;

    Ok(res
        .into_iter()
        .map(|r| models::PropertySummary {
            id: r.id,
            name: r.name,
        })
        .collect())
}

pub async fn property_exists(db: &PgPool, id: i32) -> Result<bool> {
    let found: Option<i32> =
        query_scalar("select id from properties where id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?;

    Ok(found.is_some())
}

/// Most recent first; the map page shows newest notes at the top.
pub async fn list_notes(
    db: &PgPool,
    property_id: i32,
) -> Result<Vec<models::Note>> {
    #[derive(sqlx::FromRow)]
    struct QRes {
        id: i32,
        property_id: i32,
        note: String,
        created_at: NaiveDateTime,
    }
    let res = query_as::<_, QRes>(
        "select id, property_id, note, created_at from notes
        where property_id = $1
        order by created_at desc",
    )
    .bind(property_id)
    .fetch_all(db)
    .await?;

    Ok(res
        .into_iter()
        .map(|r| models::Note {
            id: r.id,
            property_id: r.property_id,
            note: r.note,
            created_at: r.created_at,
        })
        .collect())
}

pub async fn insert_note(
    db: &PgPool,
    property_id: i32,
    note: &str,
) -> Result<models::Note> {
    #[derive(sqlx::FromRow)]
    struct QRes {
        id: i32,
        created_at: NaiveDateTime,
    }
    let res = query_as::<_, QRes>(
        "insert into notes (property_id, note) values ($1, $2)
        returning id, created_at",
    )
    .bind(property_id)
    .bind(note)
    .fetch_one(db)
    .await?;

    Ok(models::Note {
        id: res.id,
        property_id,
        note: note.to_string(),
        created_at: res.created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models;
    use std::{env, time::Duration};

    /// These tests need a real database. They run when TEST_DATABASE_URL
    /// points at a disposable Postgres instance and are skipped otherwise.
    async fn test_pool() -> Option<PgPool> {
        let url = env::var("TEST_DATABASE_URL").ok()?;
        let db = PgPool::connect(&url)
            .await
            .expect("test database to be reachable");
        sqlx::migrate!()
            .run(&db)
            .await
            .expect("migrations to apply cleanly");
        Some(db)
    }

    fn sample_property(name: &str) -> models::NewProperty {
        models::NewProperty {
            name: name.to_string(),
            address: "123 Main St, New York, NY".to_string(),
            latitude: 40.7,
            longitude: -74.0,
            extra_field: models::GeoMeta {
                confidence: Some(8.0),
                r#type: Some("office".to_string()),
                display_name: None,
            },
        }
    }

    #[tokio::test]
    async fn test_insert_then_read_round_trips() {
        let Some(db) = test_pool().await else { return };

        let property =
            insert_property(&db, &sample_property("Downtown Office"))
                .await
                .expect("inserts");
        assert!(property.id >= 1);
        assert_eq!(property.latitude, 40.7);
        assert_eq!(property.longitude, -74.0);
        assert_eq!(
            property.extra_field.as_ref().and_then(|m| m.confidence),
            Some(8.0)
        );

        let read_back = get_property(&db, property.id)
            .await
            .expect("reads")
            .expect("exists");
        assert_eq!(read_back.name, "Downtown Office");
        assert_eq!(read_back.extra_field, property.extra_field);
    }

    #[tokio::test]
    async fn test_missing_property_reads_as_none() {
        let Some(db) = test_pool().await else { return };

        let found = get_property(&db, i32::MAX).await.expect("query runs");
        assert!(found.is_none());
        assert!(!property_exists(&db, i32::MAX).await.expect("query runs"));
    }

    #[tokio::test]
    async fn test_notes_list_most_recent_first() {
        let Some(db) = test_pool().await else { return };

        let property = insert_property(&db, &sample_property("Warehouse"))
            .await
            .expect("inserts");
        insert_note(&db, property.id, "roof leaks")
            .await
            .expect("inserts");
        // distinct created_at so the ordering is unambiguous
        tokio::time::sleep(Duration::from_millis(20)).await;
        insert_note(&db, property.id, "roof fixed")
            .await
            .expect("inserts");

        let notes = list_notes(&db, property.id).await.expect("lists");
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].note, "roof fixed");
        assert_eq!(notes[1].note, "roof leaks");
        assert!(notes[0].created_at >= notes[1].created_at);
    }
}
