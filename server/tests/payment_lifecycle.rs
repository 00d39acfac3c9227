//! Order lifecycle integration tests against the in-memory database.

mod common;

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;
use storefront_server::db::models::{ConfirmStatus, OrderCreate, OrderStatus, UserRole};
use storefront_server::db::repository::{OrderRepository, RepoError};
use storefront_server::utils::error::AppError;

use common::{MockGateway, create_user, test_state};

fn checkout(amount: &str) -> OrderCreate {
    OrderCreate {
        amount: amount.to_string(),
        metadata: json!({"items": [{"name": "Agbada", "qty": 1}]}),
    }
}

#[tokio::test]
async fn initiate_opens_session_without_writing_an_order() {
    let gateway = Arc::new(MockGateway::success(4999));
    let state = test_state(gateway.clone()).await;
    let user = create_user(&state, "ada", UserRole::User).await;

    let session = state
        .payment_service()
        .initiate_payment(&user, checkout("49.99"))
        .await
        .expect("initiate");

    assert_eq!(session.reference.len(), 12);
    assert!(session.reference.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(session.authorization_url.contains(&session.reference));

    let requests = gateway.initialized.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].amount_minor, 4999);
    assert_eq!(requests[0].email, "ada@example.com");
    assert!(
        requests[0]
            .callback_url
            .ends_with(&format!("/verify-payment?reference={}", session.reference))
    );
    drop(requests);

    // No order row exists until the gateway verifies the charge
    let orders = OrderRepository::new(state.db.clone())
        .find_all()
        .await
        .expect("find_all");
    assert!(orders.is_empty());
}

#[tokio::test]
async fn verify_success_creates_the_order_when_none_exists() {
    let gateway = Arc::new(MockGateway::success(4999));
    let state = test_state(gateway).await;
    let user = create_user(&state, "ada", UserRole::User).await;

    let verification = state
        .payment_service()
        .verify_payment(&user, "abc123def456")
        .await
        .expect("verify");

    assert!(verification.success);
    assert_eq!(
        verification.redirect_path,
        "/payment-success?reference=abc123def456"
    );

    let order = OrderRepository::new(state.db.clone())
        .find_by_reference("abc123def456")
        .await
        .expect("lookup")
        .expect("order created");
    assert_eq!(order.amount, Decimal::new(4999, 2));
    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(order.confirm_status, ConfirmStatus::Pending);
    assert_eq!(order.metadata["channel"], "card");
}

#[tokio::test]
async fn verify_success_updates_the_existing_order() {
    let gateway = Arc::new(MockGateway::success(4999));
    let state = test_state(gateway).await;
    let user = create_user(&state, "ada", UserRole::User).await;
    let service = state.payment_service();

    let order = service
        .create_order(&user, checkout("49.99"))
        .await
        .expect("create order");
    assert_eq!(order.status, OrderStatus::Initiated);

    let verification = service
        .verify_payment(&user, &order.reference)
        .await
        .expect("verify");
    assert!(verification.success);

    let repo = OrderRepository::new(state.db.clone());
    let orders = repo.find_all().await.expect("find_all");
    assert_eq!(orders.len(), 1, "verify must not duplicate the order");

    let updated = &orders[0];
    assert_eq!(updated.status, OrderStatus::Paid);
    assert!(updated.version > order.version);
    // Cart snapshot survives the metadata merge
    assert_eq!(updated.metadata["items"][0]["name"], "Agbada");
    assert_eq!(updated.metadata["channel"], "card");
}

#[tokio::test]
async fn verify_failure_writes_nothing() {
    let gateway = Arc::new(MockGateway::failure());
    let state = test_state(gateway).await;
    let user = create_user(&state, "ada", UserRole::User).await;

    let verification = state
        .payment_service()
        .verify_payment(&user, "deadbeef0000")
        .await
        .expect("verify");

    assert!(!verification.success);
    assert_eq!(verification.redirect_path, "/payment-failed");

    let orders = OrderRepository::new(state.db.clone())
        .find_all()
        .await
        .expect("find_all");
    assert!(orders.is_empty());
}

#[tokio::test]
async fn owners_see_their_own_orders() {
    let gateway = Arc::new(MockGateway::success(4999));
    let state = test_state(gateway).await;
    let owner = create_user(&state, "ada", UserRole::User).await;
    let other = create_user(&state, "grace", UserRole::User).await;

    let order = state
        .payment_service()
        .create_order(&owner, checkout("49.99"))
        .await
        .expect("create order");

    let repo = OrderRepository::new(state.db.clone());
    let owned = repo
        .find_by_user(&owner.id.clone().expect("id"))
        .await
        .expect("owner listing");
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].reference, order.reference);

    let others = repo
        .find_by_user(&other.id.clone().expect("id"))
        .await
        .expect("other listing");
    assert!(others.is_empty());
}

#[tokio::test]
async fn stale_version_transitions_lose_with_a_conflict() {
    let gateway = Arc::new(MockGateway::success(4999));
    let state = test_state(gateway).await;
    let owner = create_user(&state, "ada", UserRole::User).await;

    let order = state
        .payment_service()
        .create_order(&owner, checkout("49.99"))
        .await
        .expect("create order");
    let order_id = order.id.clone().expect("id");

    // Two actors read the same version; only the first transition lands
    let repo = OrderRepository::new(state.db.clone());
    repo.update_status(
        &order_id,
        order.version,
        OrderStatus::Paid,
        ConfirmStatus::Confirmed,
    )
    .await
    .expect("first transition");

    let err = repo
        .update_status(
            &order_id,
            order.version,
            OrderStatus::Pending,
            ConfirmStatus::Pending,
        )
        .await
        .expect_err("stale transition must lose");
    assert!(matches!(err, RepoError::Conflict(_)));

    let settled = repo
        .find_by_id(&order_id)
        .await
        .expect("lookup")
        .expect("order");
    assert_eq!(settled.status, OrderStatus::Paid);
    assert_eq!(settled.confirm_status, ConfirmStatus::Confirmed);
}

#[tokio::test]
async fn mark_paid_by_a_stranger_is_rejected_without_mutation() {
    let gateway = Arc::new(MockGateway::success(4999));
    let state = test_state(gateway).await;
    let owner = create_user(&state, "ada", UserRole::User).await;
    let stranger = create_user(&state, "mallory", UserRole::User).await;
    let service = state.payment_service();

    let order = service
        .create_order(&owner, checkout("49.99"))
        .await
        .expect("create order");
    let order_id = order.id.clone().expect("id");

    let err = service
        .mark_paid(&stranger, &order_id)
        .await
        .expect_err("stranger must be rejected");
    assert!(matches!(err, AppError::Forbidden(_)));

    let unchanged = OrderRepository::new(state.db.clone())
        .find_by_id(&order_id)
        .await
        .expect("lookup")
        .expect("order");
    assert_eq!(unchanged.status, OrderStatus::Initiated);
    assert_eq!(unchanged.version, order.version);
}

#[tokio::test]
async fn mark_paid_flags_metadata_and_nothing_else() {
    let gateway = Arc::new(MockGateway::success(4999));
    let state = test_state(gateway).await;
    let owner = create_user(&state, "ada", UserRole::User).await;
    let service = state.payment_service();

    let order = service
        .create_order(&owner, checkout("49.99"))
        .await
        .expect("create order");
    let order_id = order.id.clone().expect("id");

    let updated = service
        .mark_paid(&owner, &order_id)
        .await
        .expect("mark paid");

    assert_eq!(updated.status, OrderStatus::Initiated);
    assert_eq!(updated.confirm_status, ConfirmStatus::Pending);
    assert_eq!(updated.metadata["user_marked_paid"], json!(true));
    assert!(updated.metadata["user_marked_paid_at"].is_string());
    assert!(updated.version > order.version);
    // Cart snapshot survives the flagging
    assert_eq!(updated.metadata["items"][0]["name"], "Agbada");
}

#[tokio::test]
async fn admins_can_mark_any_order_paid() {
    let gateway = Arc::new(MockGateway::success(4999));
    let state = test_state(gateway).await;
    let owner = create_user(&state, "ada", UserRole::User).await;
    let admin = create_user(&state, "boss", UserRole::Admin).await;
    let service = state.payment_service();

    let order = service
        .create_order(&owner, checkout("49.99"))
        .await
        .expect("create order");
    let order_id = order.id.clone().expect("id");

    let updated = service
        .mark_paid(&admin, &order_id)
        .await
        .expect("admin mark paid");
    assert_eq!(updated.metadata["user_marked_paid"], json!(true));
}

#[tokio::test]
async fn confirm_then_reverse_returns_to_pending() {
    let gateway = Arc::new(MockGateway::success(4999));
    let state = test_state(gateway).await;
    let owner = create_user(&state, "ada", UserRole::User).await;
    let service = state.payment_service();

    let order = service
        .create_order(&owner, checkout("49.99"))
        .await
        .expect("create order");
    let order_id = order.id.clone().expect("id");

    let confirmed = service
        .confirm_payment(&order_id, &owner)
        .await
        .expect("confirm");
    assert_eq!(confirmed.status, OrderStatus::Paid);
    assert_eq!(confirmed.confirm_status, ConfirmStatus::Confirmed);

    let reversed = service.reverse_payment(&order_id).await.expect("reverse");
    assert_eq!(reversed.status, OrderStatus::Pending);
    assert_eq!(reversed.confirm_status, ConfirmStatus::Pending);
}

#[tokio::test]
async fn reverse_requires_a_confirmed_order() {
    let gateway = Arc::new(MockGateway::success(4999));
    let state = test_state(gateway).await;
    let owner = create_user(&state, "ada", UserRole::User).await;
    let service = state.payment_service();

    let order = service
        .create_order(&owner, checkout("49.99"))
        .await
        .expect("create order");
    let order_id = order.id.clone().expect("id");

    let err = service
        .reverse_payment(&order_id)
        .await
        .expect_err("unconfirmed order cannot be reversed");
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn confirm_twice_rewrites_identical_state() {
    let gateway = Arc::new(MockGateway::success(4999));
    let state = test_state(gateway).await;
    let owner = create_user(&state, "ada", UserRole::User).await;
    let service = state.payment_service();

    let order = service
        .create_order(&owner, checkout("49.99"))
        .await
        .expect("create order");
    let order_id = order.id.clone().expect("id");

    let first = service
        .confirm_payment(&order_id, &owner)
        .await
        .expect("confirm");
    let second = service
        .confirm_payment(&order_id, &owner)
        .await
        .expect("re-confirm");

    assert_eq!(second.status, OrderStatus::Paid);
    assert_eq!(second.confirm_status, ConfirmStatus::Confirmed);
    assert!(second.version > first.version);
}

#[tokio::test]
async fn invalid_amounts_are_rejected_before_the_gateway() {
    let gateway = Arc::new(MockGateway::success(4999));
    let state = test_state(gateway.clone()).await;
    let user = create_user(&state, "ada", UserRole::User).await;
    let service = state.payment_service();

    for amount in ["0", "-10", "abc", "10.999"] {
        let err = service
            .initiate_payment(&user, checkout(amount))
            .await
            .expect_err("bad amount");
        assert!(matches!(err, AppError::Validation(_)), "amount {amount}");
    }

    assert!(gateway.initialized.lock().unwrap().is_empty());
}
