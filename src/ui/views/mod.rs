pub mod product_detail;
pub mod products;
