//! Pure render functions: state in, serializable view description out.

pub mod admin;
pub mod cart;
pub mod storefront;

pub use admin::*;
pub use cart::*;
pub use storefront::*;
