use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{AgentUsageLog, CarbonCalculation};

/// Insert one carbon audit row per candidate of a ranking run.
pub async fn insert_carbon_calculations(
    pool: &PgPool,
    rows: &[CarbonCalculation],
) -> Result<(), sqlx::Error> {
    for row in rows {
        sqlx::query(
            r#"
            INSERT INTO carbon_calculations
                (request_id, supplier_id, distance_miles, transport_carbon_kg,
                 embodied_carbon_kg, total_carbon_kg, tier)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(row.request_id)
        .bind(row.supplier_id)
        .bind(row.distance_miles)
        .bind(row.transport_carbon_kg)
        .bind(row.embodied_carbon_kg)
        .bind(row.total_carbon_kg)
        .bind(row.tier)
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Insert the per-run usage record.
pub async fn insert_usage_log(pool: &PgPool, log: &AgentUsageLog) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO agent_usage_logs
            (user_id, request_id, agent_type, input_summary, output_summary,
             model_used, total_tokens, cost_usd)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(log.user_id)
    .bind(log.request_id)
    .bind(&log.agent_type)
    .bind(&log.input_summary)
    .bind(&log.output_summary)
    .bind(&log.model_used)
    .bind(log.total_tokens)
    .bind(log.cost_usd)
    .execute(pool)
    .await?;

    Ok(())
}

/// Carbon audit rows for a request, best candidates first.
pub async fn carbon_calculations_for_request(
    pool: &PgPool,
    request_id: Uuid,
) -> Result<Vec<CarbonCalculation>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CarbonCalculation>(
        r#"
        SELECT request_id, supplier_id, distance_miles, transport_carbon_kg,
               embodied_carbon_kg, total_carbon_kg, tier
        FROM carbon_calculations
        WHERE request_id = $1
        ORDER BY tier ASC, distance_miles ASC
        "#,
    )
    .bind(request_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
