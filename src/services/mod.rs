pub mod cart;
pub mod catalog;

pub use cart::CartService;
pub use catalog::CatalogService;
