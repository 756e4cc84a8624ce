//! Integration tests for the studio error log.

use atelier_db::repositories::StudioErrorRepo;
use sqlx::PgPool;

#[sqlx::test]
async fn test_record_list_and_delete(pool: PgPool) {
    for i in 0..3i64 {
        StudioErrorRepo::record(&pool, 10 + i, 20, &format!("failure {i}"))
            .await
            .unwrap();
    }

    let page = StudioErrorRepo::list(&pool, 1, 2).await.unwrap();
    assert_eq!(page.total_count, 3);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.errors.len(), 2);
    assert_eq!(page.errors[0].info, "failure 0"); // oldest first

    let first_id = page.errors[0].id;
    assert!(StudioErrorRepo::delete(&pool, first_id).await.unwrap());
    assert!(!StudioErrorRepo::delete(&pool, first_id).await.unwrap());

    let page = StudioErrorRepo::list(&pool, 1, 10).await.unwrap();
    assert_eq!(page.total_count, 2);
}

#[sqlx::test]
async fn test_long_info_is_truncated_to_column_width(pool: PgPool) {
    let long = "x".repeat(1500);
    let entry = StudioErrorRepo::record(&pool, 1, 2, &long).await.unwrap();
    assert_eq!(entry.info.chars().count(), 1000);
}
