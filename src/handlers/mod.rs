pub mod admin;
pub mod cart;
pub mod storefront;

pub use admin::admin_config;
pub use cart::cart_config;
pub use storefront::storefront_config;
