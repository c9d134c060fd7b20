use domain::RepositoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("user is not a member of any private communities")]
    NoQualifyingCommunities,
    #[error("queue not found or expired")]
    QueueNotFound,
    #[error("failed to register queue with real-time server")]
    DeliveryUnavailable,
    #[error("authentication failed")]
    Authentication,
}
