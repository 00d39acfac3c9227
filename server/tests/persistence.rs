//! RocksDB persistence: data written through a repository survives reopening
//! the database from the same path.

use storefront_server::db::DbService;
use storefront_server::db::models::CategoryCreate;
use storefront_server::db::repository::CategoryRepository;

#[tokio::test]
async fn categories_survive_a_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("storefront.db");
    let path = path.to_str().expect("utf-8 path");

    {
        let db = DbService::new(path).await.expect("open");
        CategoryRepository::new(db.db.clone())
            .create(CategoryCreate {
                name: "Gowns".to_string(),
            })
            .await
            .expect("create");
        // Handle dropped here, releasing the RocksDB lock
    }

    let db = DbService::new(path).await.expect("reopen");
    let found = CategoryRepository::new(db.db.clone())
        .find_by_slug("gowns")
        .await
        .expect("lookup");
    assert_eq!(found.map(|c| c.name), Some("Gowns".to_string()));
}
