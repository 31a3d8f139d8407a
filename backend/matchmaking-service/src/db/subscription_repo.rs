use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

/// Supplier ids on an active premium plan. Fetched once per ranking run and
/// treated as a lookup set from then on.
pub async fn premium_supplier_ids(pool: &PgPool) -> Result<HashSet<Uuid>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (Uuid,)>(
        r#"
        SELECT supplier_id
        FROM supplier_subscriptions
        WHERE plan = 'premium' AND status = 'active'
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}
