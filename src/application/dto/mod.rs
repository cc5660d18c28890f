pub mod meal_dto;
