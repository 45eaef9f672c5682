pub mod admin_service;
pub mod cart_service;
pub mod initializer;
pub mod storefront_service;

pub use admin_service::*;
pub use cart_service::*;
pub use initializer::*;
pub use storefront_service::*;
