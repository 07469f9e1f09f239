//! Order route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::Serialize;

use farmlink_core::OrderId;

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::{AdminOnly, CurrentUser, SellerOrAdmin};
use crate::models::Order;
use crate::services::orders::{OrderService, SubmitOrder};
use crate::state::AppState;

/// Response for a submitted order: the persisted order plus the opaque
/// handle the client needs to complete payment.
#[derive(Debug, Serialize)]
pub struct SubmitOrderResponse {
    pub order: Order,
    pub client_secret: Option<String>,
}

/// Assemble the `/orders` routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_order).get(admin_list_orders))
        .route("/myorders", get(my_orders))
        .route("/seller/my-orders", get(seller_orders))
        .route("/{id}", get(get_order))
        .route("/{id}/pay", put(pay_order))
}

fn order_service(state: &AppState) -> OrderService<'_> {
    OrderService::new(state.pool(), state.payments(), state.config().pricing)
}

/// `POST /orders` - submit an order and reserve a payment intent.
///
/// The request carries product references and quantities only; prices,
/// totals, and stock come from the catalog.
async fn submit_order(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(submission): Json<SubmitOrder>,
) -> Result<impl IntoResponse> {
    let submitted = order_service(&state).submit_order(&user, submission).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitOrderResponse {
            order: submitted.order,
            client_secret: submitted.client_secret,
        }),
    ))
}

/// `PUT /orders/{id}/pay` - confirm payment after client-side completion.
///
/// The outcome is verified with the payment processor; the request body
/// is ignored. Safe to retry.
async fn pay_order(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = order_service(&state).confirm_payment(&user, id).await?;
    Ok(Json(order))
}

/// `GET /orders/{id}` - fetch one order (purchaser or admin).
async fn get_order(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    if order.user_id != user.id && !user.role.is_admin() {
        return Err(AppError::Unauthorized("Not your order".to_string()));
    }

    Ok(Json(order))
}

/// `GET /orders/myorders` - the caller's own orders, newest first.
async fn my_orders(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_by_user(user.id)
        .await?;
    Ok(Json(orders))
}

/// `GET /orders/seller/my-orders` - orders containing at least one of the
/// caller's products.
async fn seller_orders(
    SellerOrAdmin(seller): SellerOrAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_by_seller(seller.id)
        .await?;
    Ok(Json(orders))
}

/// `GET /orders` - every order (admin).
async fn admin_list_orders(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool()).list_all().await?;
    Ok(Json(orders))
}
