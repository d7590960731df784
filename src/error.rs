use thiserror::Error;

/// Failure talking to the remote model. Never leaves the reply stream; it is
/// logged and replaced by the apology fragment.
#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("model API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("model API error: {0}")]
    Api(String),
    #[error("malformed stream event: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Rejected calculator-form transition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalculatorError {
    #[error("the calculator is not open")]
    Closed,
    #[error("pick a date first")]
    MissingDate,
    #[error("pick an object first")]
    MissingObject,
    #[error("the form is not on its last step")]
    WrongStep,
    #[error("unknown booking object: {0}")]
    UnknownObject(String),
}
