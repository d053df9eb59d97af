use thiserror::Error;

use crate::model::{ParseIdError, SelectionError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    InvalidId(#[from] ParseIdError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
}
