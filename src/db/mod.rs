pub mod merge;
pub mod models;
pub mod store;

pub use merge::{merge, SubResourceUpdate};
pub use store::SeriesStore;
