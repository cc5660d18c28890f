mod controller;
mod error;
pub mod units;

pub use controller::FileSelectionController;
pub use error::SelectionError;
