use std::error::Error;
use std::fmt::{Display, Formatter};

/// The result type returned by the client traits.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// A failed AWS request. `code` is the service error code, e.g. `NoSuchEntity`, which is what the
/// cleaners match on to recognise resources that are already gone.
#[derive(Debug)]
pub struct ApiError {
    code: Option<String>,
    message: String,
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

impl ApiError {
    pub fn new<S1, S2>(code: S1, message: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            code: Some(code.into()),
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn with_source<E>(code: Option<String>, message: String, source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            code,
            message,
            source: Some(Box::new(source)),
        }
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// True if the error code is any of `codes`.
    pub fn is_code(&self, codes: &[&str]) -> bool {
        self.code().map_or(false, |code| codes.contains(&code))
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{}: {}", code, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|some| some.as_ref() as &(dyn Error + 'static))
    }
}

#[test]
fn matches_codes() {
    let err = ApiError::new("NoSuchEntity", "The role with name foo cannot be found.");
    assert!(err.is_code(&["NoSuchEntity"]));
    assert!(err.is_code(&["InvalidActivation", "NoSuchEntity"]));
    assert!(!err.is_code(&["InvalidActivation"]));
    assert_eq!(
        err.to_string(),
        "NoSuchEntity: The role with name foo cannot be found."
    );
}
