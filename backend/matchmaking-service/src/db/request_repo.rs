use sqlx::PgPool;
use uuid::Uuid;

use crate::models::MaterialRequest;

/// Find a material request by ID.
pub async fn find_material_request(
    pool: &PgPool,
    request_id: Uuid,
) -> Result<Option<MaterialRequest>, sqlx::Error> {
    let request = sqlx::query_as::<_, MaterialRequest>(
        r#"
        SELECT id, buyer_id, materials, weight_tons, site_lat, site_lng, status, created_at
        FROM material_requests
        WHERE id = $1
        "#,
    )
    .bind(request_id)
    .fetch_optional(pool)
    .await?;

    Ok(request)
}
