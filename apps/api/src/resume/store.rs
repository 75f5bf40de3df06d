//! Résumé persistence: one document per user, loaded and saved wholesale.
//!
//! Carried in `AppState` as `Arc<dyn ResumeStore>`. Postgres in production,
//! an in-memory map when no `DATABASE_URL` is configured and in tests.
//!
//! Every write is a read-modify-write run by `ResumeStore::update` while the
//! user's résumé is locked, so concurrent edits to the same lists never drop
//! each other's entries.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{ResumeDocument, ResumeRow, DEFAULT_RESUME_TITLE};
use crate::resume::normalize::normalize;
use crate::resume::validation::validate_document;

/// In-place edit of the current résumé. Returning an error aborts the write.
pub type ResumeEdit<'a> =
    Box<dyn FnOnce(&mut LoadedResume) -> Result<(), AppError> + Send + 'a>;

#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn load(&self, user_id: Uuid) -> Result<Option<ResumeRow>, AppError>;

    /// Loads the user's résumé (empty when none), applies `edit`, runs the save
    /// gate and writes the result, all while holding the user's lock.
    /// The row id survives overwrites.
    async fn update(&self, user_id: Uuid, edit: ResumeEdit<'_>) -> Result<ResumeRow, AppError>;
}

/// Stored résumé as the handlers see it.
#[derive(Debug, Clone)]
pub struct LoadedResume {
    /// `None` until the first save.
    pub id: Option<Uuid>,
    pub title: String,
    pub document: ResumeDocument,
    pub updated_at: Option<chrono::DateTime<Utc>>,
}

impl LoadedResume {
    fn empty() -> Self {
        Self {
            id: None,
            title: DEFAULT_RESUME_TITLE.to_string(),
            document: ResumeDocument::default(),
            updated_at: None,
        }
    }
}

impl From<ResumeRow> for LoadedResume {
    fn from(row: ResumeRow) -> Self {
        Self {
            id: Some(row.id),
            document: normalize(&row.data),
            title: row.title,
            updated_at: Some(row.updated_at),
        }
    }
}

/// Loads and normalizes the user's résumé; an empty document when none is stored.
pub async fn load_document(
    store: &dyn ResumeStore,
    user_id: Uuid,
) -> Result<LoadedResume, AppError> {
    Ok(store
        .load(user_id)
        .await?
        .map(LoadedResume::from)
        .unwrap_or_else(LoadedResume::empty))
}

/// Atomic, validation-gated edit. Nothing is written when the edit fails or
/// leaves the profile invalid.
pub async fn update_document(
    store: &dyn ResumeStore,
    user_id: Uuid,
    edit: ResumeEdit<'_>,
) -> Result<LoadedResume, AppError> {
    let row = store.update(user_id, edit).await?;
    info!("Saved résumé {} for user {user_id}", row.id);
    Ok(row.into())
}

/// Runs `edit` over the current row and applies the save gate.
fn apply_edit(
    user_id: Uuid,
    current: Option<ResumeRow>,
    edit: ResumeEdit<'_>,
) -> Result<LoadedResume, AppError> {
    let mut draft = current
        .map(LoadedResume::from)
        .unwrap_or_else(LoadedResume::empty);
    edit(&mut draft)?;

    let report = validate_document(&draft.document);
    if !report.is_valid() {
        let fields: Vec<_> = report.fields.fields().collect();
        warn!("Rejected save for user {user_id}: invalid {fields:?}");
        return Err(AppError::InvalidDocument(Box::new(report)));
    }

    draft.title = match draft.title.trim() {
        "" => DEFAULT_RESUME_TITLE.to_string(),
        t => t.to_string(),
    };
    Ok(draft)
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory store
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryResumeStore {
    rows: RwLock<HashMap<Uuid, ResumeRow>>,
}

impl MemoryResumeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResumeStore for MemoryResumeStore {
    async fn load(&self, user_id: Uuid) -> Result<Option<ResumeRow>, AppError> {
        Ok(self.rows.read().await.get(&user_id).cloned())
    }

    async fn update(&self, user_id: Uuid, edit: ResumeEdit<'_>) -> Result<ResumeRow, AppError> {
        // Write guard held across load, edit and insert.
        let mut rows = self.rows.write().await;
        let current = rows.get(&user_id).cloned();
        let id = current.as_ref().map(|r| r.id).unwrap_or_else(Uuid::new_v4);

        let draft = apply_edit(user_id, current, edit)?;
        let row = ResumeRow {
            id,
            user_id,
            template: draft.document.template.as_str().to_string(),
            data: serde_json::to_value(&draft.document).map_err(anyhow::Error::from)?,
            title: draft.title,
            updated_at: Utc::now(),
        };
        rows.insert(user_id, row.clone());
        Ok(row)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Postgres store
// ────────────────────────────────────────────────────────────────────────────

pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `resumes` table when missing.
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS resumes (
                id          UUID PRIMARY KEY,
                user_id     UUID NOT NULL UNIQUE,
                title       TEXT NOT NULL,
                template    TEXT NOT NULL,
                data        JSONB NOT NULL,
                updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        info!("resumes table ready");
        Ok(())
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn load(&self, user_id: Uuid) -> Result<Option<ResumeRow>, AppError> {
        Ok(sqlx::query_as::<_, ResumeRow>(
            "SELECT id, user_id, title, template, data, updated_at FROM resumes WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn update(&self, user_id: Uuid, edit: ResumeEdit<'_>) -> Result<ResumeRow, AppError> {
        let mut tx = self.pool.begin().await?;

        // Row locks cannot cover a résumé that does not exist yet, so the
        // first insert is serialized with a per-user advisory lock.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await?;

        let current = sqlx::query_as::<_, ResumeRow>(
            r#"
            SELECT id, user_id, title, template, data, updated_at
            FROM resumes
            WHERE user_id = $1
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let draft = apply_edit(user_id, current, edit)?;
        let data = serde_json::to_value(&draft.document).map_err(anyhow::Error::from)?;

        let row = sqlx::query_as::<_, ResumeRow>(
            r#"
            INSERT INTO resumes (id, user_id, title, template, data, updated_at)
            VALUES ($1, $2, $3, $4, $5, now())
            ON CONFLICT (user_id) DO UPDATE
                SET title = EXCLUDED.title,
                    template = EXCLUDED.template,
                    data = EXCLUDED.data,
                    updated_at = now()
            RETURNING id, user_id, title, template, data, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&draft.title)
        .bind(draft.document.template.as_str())
        .bind(&data)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::resume::Skill;
    use serde_json::json;

    /// Replaces the whole document; `title: None` keeps the stored title.
    async fn save_document(
        store: &dyn ResumeStore,
        user_id: Uuid,
        title: Option<&str>,
        doc: &ResumeDocument,
    ) -> Result<LoadedResume, AppError> {
        update_document(
            store,
            user_id,
            Box::new(move |draft: &mut LoadedResume| {
                draft.document = doc.clone();
                if let Some(title) = title {
                    draft.title = title.to_string();
                }
                Ok(())
            }),
        )
        .await
    }

    #[tokio::test]
    async fn test_missing_resume_loads_empty_document() {
        let store = MemoryResumeStore::new();
        let loaded = load_document(&store, Uuid::new_v4()).await.unwrap();
        assert_eq!(loaded.document, ResumeDocument::default());
        assert_eq!(loaded.title, DEFAULT_RESUME_TITLE);
        assert!(loaded.id.is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_roundtrips_document() {
        let store = MemoryResumeStore::new();
        let user = Uuid::new_v4();
        let doc = normalize(&json!({
            "profile": {"name": "Ann", "email": "ann@example.com", "summary": "Go dev"},
            "skills": ["Go"],
            "template": "github",
        }));
        save_document(&store, user, Some("CV"), &doc).await.unwrap();

        let loaded = load_document(&store, user).await.unwrap();
        assert_eq!(loaded.document, doc);
        assert_eq!(loaded.title, "CV");
        assert_eq!(store.load(user).await.unwrap().unwrap().template, "github");
    }

    #[tokio::test]
    async fn test_invalid_profile_is_not_persisted() {
        let store = MemoryResumeStore::new();
        let user = Uuid::new_v4();
        let mut doc = ResumeDocument::default();
        doc.profile.phone = "12".into();

        let err = save_document(&store, user, None, &doc).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidDocument(_)));
        assert!(store.load(user).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_overwrite_keeps_row_id_and_blank_title_defaults() {
        let store = MemoryResumeStore::new();
        let user = Uuid::new_v4();
        let first = save_document(&store, user, Some("  "), &ResumeDocument::default())
            .await
            .unwrap();
        assert_eq!(first.title, DEFAULT_RESUME_TITLE);

        let mut doc = ResumeDocument::default();
        doc.set_about("Updated");
        let second = save_document(&store, user, Some("v2"), &doc).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.document.profile.about, "Updated");
    }

    #[tokio::test]
    async fn test_save_without_title_keeps_stored_title() {
        let store = MemoryResumeStore::new();
        let user = Uuid::new_v4();
        save_document(&store, user, Some("CV"), &ResumeDocument::default())
            .await
            .unwrap();
        let saved = save_document(&store, user, None, &ResumeDocument::default())
            .await
            .unwrap();
        assert_eq!(saved.title, "CV");
    }

    #[tokio::test]
    async fn test_failed_edit_writes_nothing() {
        let store = MemoryResumeStore::new();
        let user = Uuid::new_v4();
        let err = update_document(
            &store,
            user,
            Box::new(|_: &mut LoadedResume| {
                Err(AppError::NotFound("Entry x not found".into()))
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(store.load(user).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_are_all_kept() {
        let store = Arc::new(MemoryResumeStore::new());
        let user = Uuid::new_v4();

        let tasks: Vec<_> = (0..50)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    update_document(
                        store.as_ref(),
                        user,
                        Box::new(move |draft: &mut LoadedResume| {
                            draft.document.add_skill(Skill {
                                id: None,
                                name: format!("skill-{i}"),
                                level: None,
                            });
                            Ok(())
                        }),
                    )
                    .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let loaded = load_document(store.as_ref(), user).await.unwrap();
        assert_eq!(loaded.document.skills.len(), 50);
    }
}
