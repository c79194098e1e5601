use sqlx::PgPool;
use time::PrimitiveDateTime;

pub(crate) async fn upsert(
    pool: &PgPool,
    submission_id: &str,
    user_id: &str,
    value: i16,
    now: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO votes (submission_id, user_id, value, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$4)
         ON CONFLICT (submission_id, user_id)
         DO UPDATE SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at",
    )
    .bind(submission_id)
    .bind(user_id)
    .bind(value)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

/// Retract is idempotent: deleting a vote that never existed is not an error.
pub(crate) async fn delete(
    pool: &PgPool,
    submission_id: &str,
    user_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM votes WHERE submission_id = $1 AND user_id = $2")
        .bind(submission_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn find_value(
    pool: &PgPool,
    submission_id: &str,
    user_id: &str,
) -> Result<Option<i16>, sqlx::Error> {
    sqlx::query_scalar::<_, i16>(
        "SELECT value FROM votes WHERE submission_id = $1 AND user_id = $2",
    )
    .bind(submission_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn score(pool: &PgPool, submission_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(SUM(value), 0)::BIGINT FROM votes WHERE submission_id = $1",
    )
    .bind(submission_id)
    .fetch_one(pool)
    .await
}
