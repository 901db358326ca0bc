use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum PortalError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("input stream closed before the exam flow finished")]
    InputClosed,
}
