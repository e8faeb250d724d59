mod filter;

pub use filter::{filter_by_category_ci, filter_software};
