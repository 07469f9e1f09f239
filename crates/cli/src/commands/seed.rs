//! Database seeding command.
//!
//! Loads a small set of sample users and products for local development.
//! Passwords go through the same argon2 hashing as live registration, and
//! rows are inserted through the server's repositories, so seeded data is
//! indistinguishable from organically created data.
//!
//! Seeding is idempotent: users are matched by email and skipped when they
//! already exist (their products are skipped with them).

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use farmlink_core::{Category, Email, Role, UserId};
use farmlink_server::db::products::NewProduct;
use farmlink_server::db::users::NewUser;
use farmlink_server::db::{ProductRepository, UserRepository};
use farmlink_server::models::Address;
use farmlink_server::services::auth::{self, AuthError};

/// Errors from the seed command.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] farmlink_server::db::RepositoryError),

    #[error("Invalid seed email: {0}")]
    Email(#[from] farmlink_core::EmailError),

    #[error("Password hashing failed: {0}")]
    Hash(#[from] AuthError),
}

struct SeedUser<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
    role: Role,
}

struct SeedProduct<'a> {
    name: &'a str,
    image: &'a str,
    brand: &'a str,
    category: Category,
    description: &'a str,
    /// Price in minor units (paisa); converted to a two-place decimal.
    price_minor: i64,
    count_in_stock: i32,
}

const SEED_USERS: &[SeedUser<'static>] = &[
    SeedUser {
        name: "Admin",
        email: "admin@farmlink.local",
        password: "farmlink-admin-dev",
        role: Role::Admin,
    },
    SeedUser {
        name: "Sunita Gurung",
        email: "sunita@farmlink.local",
        password: "farmlink-seller-dev",
        role: Role::Seller,
    },
    SeedUser {
        name: "Ram Shrestha",
        email: "ram@farmlink.local",
        password: "farmlink-customer-dev",
        role: Role::Customer,
    },
];

const SEED_PRODUCTS: &[SeedProduct<'static>] = &[
    SeedProduct {
        name: "Organic Tomatoes",
        image: "https://res.cloudinary.com/farmlink/image/upload/v1/farmlink/tomatoes.jpg",
        brand: "Gurung Farm",
        category: Category::Vegetables,
        description: "Vine-ripened organic tomatoes, sold per kg.",
        price_minor: 12_000,
        count_in_stock: 40,
    },
    SeedProduct {
        name: "Local Apples",
        image: "https://res.cloudinary.com/farmlink/image/upload/v1/farmlink/apples.jpg",
        brand: "Gurung Farm",
        category: Category::Fruits,
        description: "Crisp Jumla apples, sold per kg.",
        price_minor: 25_000,
        count_in_stock: 25,
    },
    SeedProduct {
        name: "Fresh Milk",
        image: "https://res.cloudinary.com/farmlink/image/upload/v1/farmlink/milk.jpg",
        brand: "Gurung Farm",
        category: Category::Dairy,
        description: "Pasteurized whole milk, one litre.",
        price_minor: 9_000,
        count_in_stock: 60,
    },
    SeedProduct {
        name: "Free-Range Chicken",
        image: "https://res.cloudinary.com/farmlink/image/upload/v1/farmlink/chicken.jpg",
        brand: "Gurung Farm",
        category: Category::MeatAndPoultry,
        description: "Free-range whole chicken, sold per kg.",
        price_minor: 55_000,
        count_in_stock: 15,
    },
];

/// Seed the database with sample users and products.
///
/// # Errors
///
/// Returns `SeedError` if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let database_url =
        super::database_url().ok_or(SeedError::MissingEnvVar("FARMLINK_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = farmlink_server::db::create_pool(&database_url).await?;

    let seller_id = seed_users(&pool).await?;

    match seller_id {
        Some(seller_id) => seed_products(&pool, seller_id).await?,
        None => tracing::info!("Seller already present; skipping product seed"),
    }

    tracing::info!("Seeding complete!");
    Ok(())
}

/// Insert the sample users, returning the seller's ID when freshly created.
async fn seed_users(pool: &PgPool) -> Result<Option<UserId>, SeedError> {
    let users = UserRepository::new(pool);
    let mut seller_id = None;

    for seed in SEED_USERS {
        let email = Email::parse(seed.email)?;

        if let Some(existing) = users.get_by_email(&email).await? {
            tracing::info!(email = %existing.email, "User already exists, skipping");
            continue;
        }

        // Seeded passwords take the same hashing path as registration.
        let password_hash = auth::hash_password(seed.password)?;
        let user = users
            .create(NewUser {
                name: seed.name,
                email: &email,
                password_hash: &password_hash,
                role: seed.role,
                phone: None,
                address: Some(&Address {
                    street: "Lakeside Road".to_string(),
                    city: "Pokhara".to_string(),
                    state: "Gandaki".to_string(),
                    postal_code: "33700".to_string(),
                }),
            })
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "Seeded user");
        if seed.role == Role::Seller {
            seller_id = Some(user.id);
        }
    }

    Ok(seller_id)
}

/// Insert the sample products for the seller and approve them.
async fn seed_products(pool: &PgPool, seller_id: UserId) -> Result<(), SeedError> {
    let products = ProductRepository::new(pool);

    for seed in SEED_PRODUCTS {
        let product = products
            .create(NewProduct {
                user_id: seller_id,
                name: seed.name,
                image: seed.image,
                brand: seed.brand,
                category: seed.category,
                description: seed.description,
                price: Decimal::new(seed.price_minor, 2),
                count_in_stock: seed.count_in_stock,
                discount: Decimal::ZERO,
            })
            .await?;

        // Approve so the public listing is populated out of the box.
        products.set_approval(product.id, true).await?;
        tracing::info!(product_id = %product.id, name = seed.name, "Seeded product");
    }

    Ok(())
}
