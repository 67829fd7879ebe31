pub mod line_item;
pub mod order;
pub mod product;

pub use line_item::*;
pub use order::*;
pub use product::*;
