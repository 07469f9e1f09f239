//! Product catalog route handlers.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use farmlink_core::{Category, ProductId};

use crate::db::products::NewProduct;
use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::{AdminOnly, SellerOrAdmin};
use crate::models::Product;
use crate::state::AppState;

/// Query parameters for the public listing.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<Category>,
}

/// Product creation request body.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub image: String,
    pub brand: String,
    pub category: Category,
    pub description: String,
    pub price: Decimal,
    pub count_in_stock: i32,
    #[serde(default)]
    pub discount: Decimal,
}

/// Approval request body (admin).
#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub is_approved: bool,
}

/// Response for a completed image upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// Assemble the `/products` routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/categories", get(list_categories))
        .route("/upload", post(upload_image))
        .route("/admin/all", get(admin_list_products))
        .route("/seller/my-products", get(seller_list_products))
        .route("/{id}", get(get_product))
        .route("/{id}/approve", put(approve_product))
}

/// `GET /products` - public listing of approved products, optionally
/// filtered by category.
async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool())
        .list_approved(query.category)
        .await?;
    Ok(Json(products))
}

/// `GET /products/categories` - the fixed category list.
async fn list_categories() -> Json<Vec<&'static str>> {
    Json(Category::ALL.into_iter().map(Category::as_str).collect())
}

/// `GET /products/{id}` - fetch one product.
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    Ok(Json(product))
}

/// `POST /products` - create an unapproved product owned by the caller.
async fn create_product(
    SellerOrAdmin(seller): SellerOrAdmin,
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> Result<impl IntoResponse> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    if req.price < Decimal::ZERO {
        return Err(AppError::Validation("price cannot be negative".to_string()));
    }
    if req.count_in_stock < 0 {
        return Err(AppError::Validation(
            "count_in_stock cannot be negative".to_string(),
        ));
    }
    if req.discount < Decimal::ZERO || req.discount > Decimal::ONE_HUNDRED {
        return Err(AppError::Validation(
            "discount must be between 0 and 100".to_string(),
        ));
    }

    let product = ProductRepository::new(state.pool())
        .create(NewProduct {
            user_id: seller.id,
            name: req.name.trim(),
            image: &req.image,
            brand: &req.brand,
            category: req.category,
            description: &req.description,
            price: req.price,
            count_in_stock: req.count_in_stock,
            discount: req.discount,
        })
        .await?;

    tracing::info!(product_id = %product.id, seller_id = %seller.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /products/{id}/approve` - flip the approval flag (admin).
async fn approve_product(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(req): Json<ApprovalRequest>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .set_approval(id, req.is_approved)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    tracing::info!(product_id = %product.id, is_approved = req.is_approved, "product approval set");
    Ok(Json(product))
}

/// `GET /products/admin/all` - every product, all approval states.
async fn admin_list_products(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list_all().await?;
    Ok(Json(products))
}

/// `GET /products/seller/my-products` - the caller's own products.
async fn seller_list_products(
    SellerOrAdmin(seller): SellerOrAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool())
        .list_by_seller(seller.id)
        .await?;
    Ok(Json(products))
}

/// `POST /products/upload` - upload an image, returns the hosted URL.
///
/// Expects a multipart form with a single `image` field.
async fn upload_image(
    SellerOrAdmin(_seller): SellerOrAdmin,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("could not read image field: {e}")))?;

        if bytes.is_empty() {
            return Err(AppError::Validation("image field is empty".to_string()));
        }

        let url = state.images().upload(&bytes, &content_type).await?;
        tracing::info!(%url, "image uploaded");
        return Ok(Json(UploadResponse { url }));
    }

    Err(AppError::Validation(
        "multipart field 'image' is required".to_string(),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_parses_display_category() {
        let req: CreateProductRequest = serde_json::from_str(
            r#"{
                "name": "Chicken Breast",
                "image": "https://res.cloudinary.com/demo/chicken.jpg",
                "brand": "Hill Farm",
                "category": "Meat & Poultry",
                "description": "Free range",
                "price": "450.00",
                "count_in_stock": 12
            }"#,
        )
        .unwrap();
        assert_eq!(req.category, Category::MeatAndPoultry);
        assert_eq!(req.discount, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_categories_endpoint_serves_full_enum() {
        let Json(names) = list_categories().await;
        assert_eq!(names.len(), Category::ALL.len());
        assert!(names.contains(&"Vegetables"));
        assert!(names.contains(&"Meat & Poultry"));
    }

    #[test]
    fn test_list_query_category_optional() {
        let q: ListQuery = serde_urlencoded::from_str("").unwrap();
        assert!(q.category.is_none());

        let q: ListQuery = serde_urlencoded::from_str("category=Vegetables").unwrap();
        assert_eq!(q.category, Some(Category::Vegetables));
    }
}
