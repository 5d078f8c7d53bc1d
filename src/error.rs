use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid date `{input}`")]
    InvalidDate { input: String },

    #[error("invalid coordinates ({lat}, {lng})")]
    InvalidCoordinates { lat: f64, lng: f64 },
}

impl Error {
    pub(crate) fn invalid_date(input: impl Into<String>) -> Self {
        Error::InvalidDate {
            input: input.into(),
        }
    }
}
