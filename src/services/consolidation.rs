use sqlx::PgPool;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::db::models::Question;
use crate::db::types::QuestionStatus;
use crate::repositories;
use crate::repositories::questions::QuestionKey;

#[derive(Debug)]
pub(crate) struct ResolvedQuestion {
    pub(crate) question: Question,
    pub(crate) created: bool,
}

/// Normalizes the optional section of an identity key. A blank section is the
/// same key as no section at all.
pub(crate) fn normalize_section(section: Option<String>) -> Option<String> {
    section
        .map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty())
}

/// Resolves an identity key to its question row, creating one when the key is
/// new. A freshly created question is published immediately when every foreign
/// key of the identity already has at least one published question; otherwise
/// it waits in the review queue as pending.
pub(crate) async fn resolve_question(
    pool: &PgPool,
    key: &QuestionKey,
    created_by: &str,
) -> Result<ResolvedQuestion, sqlx::Error> {
    if let Some(existing) = repositories::questions::find_by_key(pool, key).await? {
        return Ok(ResolvedQuestion { question: existing, created: false });
    }

    let history = repositories::questions::publish_history(pool, key).await?;
    let status =
        if history.all_published() { QuestionStatus::Published } else { QuestionStatus::Pending };

    let now = primitive_now_utc();
    let created = repositories::questions::create(
        pool,
        repositories::questions::CreateQuestion {
            id: &Uuid::new_v4().to_string(),
            key,
            status,
            created_by,
            created_at: now,
            updated_at: now,
        },
    )
    .await;

    match created {
        Ok(question) => {
            tracing::info!(
                question_id = %question.id,
                status = ?question.status,
                "Created question for new identity key"
            );
            Ok(ResolvedQuestion { question, created: true })
        }
        // Lost the unique-index race to a concurrent registration; the
        // winner's row is the question.
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            let winner = repositories::questions::find_by_key(pool, key).await?;
            match winner {
                Some(question) => Ok(ResolvedQuestion { question, created: false }),
                None => Err(sqlx::Error::RowNotFound),
            }
        }
        Err(err) => Err(err),
    }
}
