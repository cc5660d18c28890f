mod meal_dto;
