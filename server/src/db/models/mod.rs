//! Database models
//!
//! One module per table, each with the entity struct plus Create/Update
//! payload types. Record ids serialize as `"table:id"` strings via
//! [`serde_helpers`].

pub mod serde_helpers;

pub mod category;
pub mod order;
pub mod product;
pub mod review;
pub mod sale;
pub mod user;

pub use category::{Category, CategoryCreate, CategoryId, CategoryUpdate};
pub use order::{ConfirmStatus, Order, OrderCreate, OrderId, OrderStatus, OrderView};
pub use product::{Gender, Product, ProductCreate, ProductDetail, ProductId, ProductUpdate};
pub use review::{Review, ReviewCreate, ReviewId, ReviewView};
pub use sale::{Sale, SaleCreate, SaleId, SaleUpdate};
pub use user::{User, UserId, UserProfile, UserPublic, UserRole, UserUpdate};
