use crate::domain::order::OrderError;
use crate::domain::payment::PaymentError;
use crate::pricing::PricingError;
use crate::store::StoreError;

// ============================================================================
// Workflow Boundary Errors
// ============================================================================
//
// Every failure a workflow operation can produce, with a stable machine-
// readable kind. An HTTP layer maps kinds to status codes; the core knows
// nothing about HTTP. None of these are retryable from inside the core:
// the caller must fix input or state. Storage failures are kept distinct
// from the domain taxonomy.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Conflict,
    InvalidState,
    Storage,
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("order {0} not found")]
    OrderNotFound(String),

    #[error("payment {0} not found")]
    PaymentNotFound(String),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WorkflowError {
    /// Stable kind for boundary mapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::OrderNotFound(_) | WorkflowError::PaymentNotFound(_) => {
                ErrorKind::NotFound
            }

            WorkflowError::Order(e) => match e {
                OrderError::MissingCustomerField(_)
                | OrderError::EmptyItems
                | OrderError::UnknownStatus(_) => ErrorKind::InvalidInput,
                OrderError::AlreadyCancelled | OrderError::AlreadyDelivered => {
                    ErrorKind::Conflict
                }
                OrderError::InvalidTransition { .. } | OrderError::NotAwaitingPayment(_) => {
                    ErrorKind::InvalidState
                }
            },

            WorkflowError::Payment(e) => match e {
                PaymentError::AlreadyExists
                | PaymentError::AmountMismatch { .. }
                | PaymentError::AlreadyProcessed(_) => ErrorKind::Conflict,
                PaymentError::NotVerified(_) => ErrorKind::InvalidState,
                PaymentError::MissingRejectionReason | PaymentError::UnknownMethod(_) => {
                    ErrorKind::InvalidInput
                }
            },

            WorkflowError::Pricing(e) => match e {
                PricingError::ProductNotFound(_)
                | PricingError::PresentationNotFound { .. } => ErrorKind::NotFound,
                PricingError::ProductInactive(_) | PricingError::InvalidQuantity(_) => {
                    ErrorKind::InvalidInput
                }
            },

            WorkflowError::Store(e) => match e {
                StoreError::NotFound { .. } => ErrorKind::NotFound,
                StoreError::Duplicate { .. }
                | StoreError::PaymentExists { .. }
                | StoreError::Conflict { .. } => ErrorKind::Conflict,
                StoreError::Backend(_) => ErrorKind::Storage,
            },
        }
    }
}
