pub mod health_controller;
pub mod meal_controller;
pub mod preview_controller;
pub mod share_controller;
