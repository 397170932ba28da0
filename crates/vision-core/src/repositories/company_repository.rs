//! Company repository trait (port)

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use uuid::Uuid;

use crate::domain::Company;
use crate::error::DomainError;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// Active companies of one client, ordered by name.
    async fn list_active_by_client(&self, client_id: Uuid) -> Result<Vec<Company>, DomainError>;
}
