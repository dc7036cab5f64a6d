use thiserror::Error;

use crate::catalog::CatalogError;
use crate::model::{IdentityError, ParseIdError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Id(#[from] ParseIdError),
}
