use sqlx::PgPool;

use crate::models::Supplier;

/// Find suppliers whose product list overlaps the requested materials.
/// Returns a best-effort snapshot; rows added mid-run are not seen.
pub async fn find_suppliers_offering(
    pool: &PgPool,
    materials: &[String],
) -> Result<Vec<Supplier>, sqlx::Error> {
    let suppliers = sqlx::query_as::<_, Supplier>(
        r#"
        SELECT id, name, lat, lng, verified, products, certifications
        FROM suppliers
        WHERE products && $1
        ORDER BY name
        "#,
    )
    .bind(materials)
    .fetch_all(pool)
    .await?;

    Ok(suppliers)
}
