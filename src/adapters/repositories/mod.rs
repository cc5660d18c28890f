mod sqlite_meal_repository;

pub use sqlite_meal_repository::SqliteMealRepository;
