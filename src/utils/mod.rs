pub mod pagination;
pub mod sample_data;

pub use pagination::{PaginationInfo, PaginationParams, total_pages};
pub use sample_data::{generate_sample_products, generate_sample_products_with};
