use thiserror::Error;

use crate::auth::{Action, Role};
use crate::decimal::Money;
use crate::types::ClientId;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("invalid payment amount: {amount}")]
    InvalidPaymentAmount {
        amount: Money,
    },

    #[error("loan is already fully paid")]
    LoanAlreadyPaidOff {
        client_id: Option<ClientId>,
    },

    #[error("client not found: {client_id}")]
    ClientNotFound {
        client_id: ClientId,
    },

    #[error("not authorized: role {role:?} may not perform {action:?}")]
    NotAuthorized {
        role: Role,
        action: Action,
    },

    #[error("storage failure: {message}")]
    StorageFailure {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
