pub mod admin;
pub mod cart;
pub mod common;
pub mod customization;
pub mod data_transfer;
pub mod product;
pub mod storefront;

pub use admin::*;
pub use cart::*;
pub use common::*;
pub use customization::*;
pub use data_transfer::*;
pub use product::*;
pub use storefront::*;
