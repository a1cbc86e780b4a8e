//! Slot repository for persisted session projections

use chrono::Utc;

use super::DbPool;
use crate::context::SessionProjection;
use crate::{Error, Result};

/// Repository over the `context_slots` table
#[derive(Clone)]
pub struct SlotRepo {
    pool: DbPool,
}

impl SlotRepo {
    /// Create a new slot repository
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Load the projection stored under `name`
    ///
    /// A corrupt payload is logged and treated as absent, so a damaged slot
    /// never blocks startup.
    ///
    /// # Errors
    ///
    /// Returns error if the database operation fails
    pub fn load(&self, name: &str) -> Result<Option<SessionProjection>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM context_slots WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .ok();

        let Some(payload) = payload else {
            return Ok(None);
        };

        match serde_json::from_str(&payload) {
            Ok(projection) => Ok(Some(projection)),
            Err(e) => {
                tracing::warn!(slot = %name, error = %e, "discarding corrupt slot payload");
                Ok(None)
            }
        }
    }

    /// Upsert the projection under `name`
    ///
    /// # Errors
    ///
    /// Returns error if serialization or the database operation fails
    pub fn save(&self, name: &str, projection: &SessionProjection) -> Result<()> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let payload = serde_json::to_string(projection)?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO context_slots (name, payload, saved_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET payload = excluded.payload, saved_at = excluded.saved_at",
            [name, &payload, &now],
        )
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    /// Delete the slot stored under `name`
    ///
    /// Deleting an absent slot is not an error.
    ///
    /// # Errors
    ///
    /// Returns error if the database operation fails
    pub fn delete(&self, name: &str) -> Result<()> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        conn.execute("DELETE FROM context_slots WHERE name = ?1", [name])
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    /// Whether a slot exists under `name`
    ///
    /// # Errors
    ///
    /// Returns error if the database operation fails
    pub fn exists(&self, name: &str) -> Result<bool> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM context_slots WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::StateMap;
    use crate::db;

    fn repo() -> SlotRepo {
        SlotRepo::new(db::init_memory().unwrap())
    }

    fn sample_projection() -> SessionProjection {
        let mut filters = StateMap::new();
        filters.insert("status".to_string(), serde_json::json!("active"));
        SessionProjection {
            page: Some("contacts".to_string()),
            view: Some("list".to_string()),
            filters: Some(filters),
            search_query: Some("acme".to_string()),
            component_states: Some(StateMap::new()),
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let repo = repo();
        let projection = sample_projection();

        repo.save("ui-context", &projection).unwrap();
        let loaded = repo.load("ui-context").unwrap().unwrap();

        assert_eq!(loaded, projection);
    }

    #[test]
    fn save_upserts_existing_slot() {
        let repo = repo();
        repo.save("ui-context", &sample_projection()).unwrap();

        let replacement = SessionProjection {
            page: Some("deals".to_string()),
            ..SessionProjection::default()
        };
        repo.save("ui-context", &replacement).unwrap();

        let loaded = repo.load("ui-context").unwrap().unwrap();
        assert_eq!(loaded.page.as_deref(), Some("deals"));
        assert!(loaded.filters.is_none());
    }

    #[test]
    fn load_missing_slot_is_none() {
        let repo = repo();
        assert!(repo.load("nope").unwrap().is_none());
    }

    #[test]
    fn corrupt_payload_is_treated_as_absent() {
        let repo = repo();
        let conn = repo.pool.get().unwrap();
        conn.execute(
            "INSERT INTO context_slots (name, payload, saved_at) VALUES ('bad', 'not json', datetime('now'))",
            [],
        )
        .unwrap();
        // The in-memory pool has a single connection; release it so load() can acquire it.
        drop(conn);

        assert!(repo.load("bad").unwrap().is_none());
    }

    #[test]
    fn delete_removes_slot_and_tolerates_absence() {
        let repo = repo();
        repo.save("ui-context", &sample_projection()).unwrap();
        assert!(repo.exists("ui-context").unwrap());

        repo.delete("ui-context").unwrap();
        assert!(!repo.exists("ui-context").unwrap());

        // Second delete is a no-op
        repo.delete("ui-context").unwrap();
    }
}
