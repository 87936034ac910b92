use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Mail API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mail API rejected message: status {0}")]
    Rejected(u16),
}

pub type NotifyResult<T> = Result<T, NotifyError>;
