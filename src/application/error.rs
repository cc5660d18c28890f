#[derive(Debug)]
pub enum ApplicationError {
    NotFound,
    InternalError(String),
    DatabaseError(String),
    BadRequest(String),
    PayloadTooLarge,
}

impl From<askama::Error> for ApplicationError {
    fn from(error: askama::Error) -> Self {
        ApplicationError::InternalError(format!("Template error: {}", error))
    }
}
