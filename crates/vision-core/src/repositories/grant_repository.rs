//! Grant repository trait (port)

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use uuid::Uuid;

use crate::domain::AccessGrant;
use crate::error::DomainError;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait GrantRepository: Send + Sync {
    /// Active grant rows for one operator on one client.
    async fn list_active_for_operator(
        &self,
        operator_id: Uuid,
        client_id: Uuid,
    ) -> Result<Vec<AccessGrant>, DomainError>;
}
