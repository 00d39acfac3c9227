//! Catalog integration tests: slugs, filtering, related products, reviews.

mod common;

use std::sync::Arc;

use axum::body::Body;
use http::{Request, StatusCode};
use rust_decimal::Decimal;
use serde_json::Value;
use storefront_server::api::build_router;
use storefront_server::db::models::{CategoryCreate, ProductCreate, UserRole};
use storefront_server::db::repository::{
    CategoryRepository, ProductRepository, RepoError, ReviewRepository,
};
use surrealdb::RecordId;
use tower::ServiceExt;

use common::{MockGateway, create_user, test_state};

fn product(name: &str, category: Option<String>) -> ProductCreate {
    ProductCreate {
        name: name.to_string(),
        description: format!("{name} description"),
        price: Decimal::new(19_99, 2),
        category,
        gender: None,
        color: "blue".to_string(),
        pieces_available: Some(3),
        size_guide: String::new(),
        sizes: vec!["M".to_string(), "L".to_string()],
        image1: None,
        image2: None,
    }
}

#[tokio::test]
async fn duplicate_product_names_get_suffixed_slugs() {
    let state = test_state(Arc::new(MockGateway::success(0))).await;
    let repo = ProductRepository::new(state.db.clone());

    let first = repo.create(product("Silk Gown", None), None).await.expect("create");
    let second = repo.create(product("Silk Gown", None), None).await.expect("create");

    assert_eq!(first.slug, "silk-gown");
    assert_eq!(second.slug, "silk-gown-1");
}

#[tokio::test]
async fn listing_filters_by_category_and_search() {
    let state = test_state(Arc::new(MockGateway::success(0))).await;
    let categories = CategoryRepository::new(state.db.clone());
    let products = ProductRepository::new(state.db.clone());

    let gowns = categories
        .create(CategoryCreate {
            name: "Gowns".to_string(),
        })
        .await
        .expect("category");
    let hats = categories
        .create(CategoryCreate {
            name: "Hats".to_string(),
        })
        .await
        .expect("category");

    let gowns_id: RecordId = gowns.id.clone().expect("id");
    let hats_id: RecordId = hats.id.clone().expect("id");

    products
        .create(product("Silk Gown", None), Some(gowns_id.clone()))
        .await
        .expect("create");
    products
        .create(product("Velvet Gown", None), Some(gowns_id.clone()))
        .await
        .expect("create");
    products
        .create(product("Straw Hat", None), Some(hats_id.clone()))
        .await
        .expect("create");

    let in_gowns = products
        .find_active(Some(gowns_id.clone()), None)
        .await
        .expect("filter");
    assert_eq!(in_gowns.len(), 2);

    let silk = products
        .find_active(None, Some("SILK"))
        .await
        .expect("search");
    assert_eq!(silk.len(), 1);
    assert_eq!(silk[0].name, "Silk Gown");

    let silk_in_hats = products
        .find_active(Some(hats_id), Some("silk"))
        .await
        .expect("combined");
    assert!(silk_in_hats.is_empty());
}

#[tokio::test]
async fn related_products_share_the_category_and_exclude_self() {
    let state = test_state(Arc::new(MockGateway::success(0))).await;
    let categories = CategoryRepository::new(state.db.clone());
    let products = ProductRepository::new(state.db.clone());

    let gowns = categories
        .create(CategoryCreate {
            name: "Gowns".to_string(),
        })
        .await
        .expect("category");
    let gowns_id = gowns.id.clone().expect("id");

    let silk = products
        .create(product("Silk Gown", None), Some(gowns_id.clone()))
        .await
        .expect("create");
    products
        .create(product("Velvet Gown", None), Some(gowns_id.clone()))
        .await
        .expect("create");
    products
        .create(product("Lone Hat", None), None)
        .await
        .expect("create");

    let related = products.find_related(&silk).await.expect("related");
    assert_eq!(related.len(), 1);
    assert_eq!(related[0].name, "Velvet Gown");
}

#[tokio::test]
async fn one_review_per_user_and_product() {
    let state = test_state(Arc::new(MockGateway::success(0))).await;
    let user = create_user(&state, "ada", UserRole::User).await;
    let user_id = user.id.clone().expect("id");

    let products = ProductRepository::new(state.db.clone());
    let silk = products
        .create(product("Silk Gown", None), None)
        .await
        .expect("create");
    let product_id = silk.id.clone().expect("id");

    let reviews = ReviewRepository::new(state.db.clone());
    reviews
        .create(product_id.clone(), user_id.clone(), 5, "Lovely".to_string())
        .await
        .expect("first review");

    let err = reviews
        .create(product_id.clone(), user_id.clone(), 3, "Again".to_string())
        .await
        .expect_err("second review must fail");
    assert!(matches!(err, RepoError::Validation(_)));

    let err = reviews
        .create(product_id, user_id, 6, "Too high".to_string())
        .await
        .expect_err("rating out of range");
    assert!(matches!(err, RepoError::Validation(_)));
}

#[tokio::test]
async fn product_detail_embeds_reviews_and_average_rating() {
    let state = test_state(Arc::new(MockGateway::success(0))).await;
    let ada = create_user(&state, "ada", UserRole::User).await;
    let grace = create_user(&state, "grace", UserRole::User).await;

    let products = ProductRepository::new(state.db.clone());
    let silk = products
        .create(product("Silk Gown", None), None)
        .await
        .expect("create");
    let product_id = silk.id.clone().expect("id");

    let reviews = ReviewRepository::new(state.db.clone());
    reviews
        .create(
            product_id.clone(),
            ada.id.clone().expect("id"),
            5,
            "Lovely".to_string(),
        )
        .await
        .expect("review");
    reviews
        .create(
            product_id.clone(),
            grace.id.clone().expect("id"),
            3,
            "Decent".to_string(),
        )
        .await
        .expect("review");

    let router = build_router(state);
    let response = router
        .oneshot(
            Request::builder()
                .uri(format!("/api/products/{product_id}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("send");
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let detail: Value = serde_json::from_slice(&bytes).expect("json");

    assert_eq!(detail["name"], "Silk Gown");
    assert_eq!(detail["reviews"].as_array().map(|r| r.len()), Some(2));
    assert_eq!(detail["avg_rating"], 4.0);
}
