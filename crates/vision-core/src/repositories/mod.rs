//! Repository traits (ports)

pub mod company_repository;
pub mod grant_repository;
pub mod vision_repository;

pub use company_repository::CompanyRepository;
pub use grant_repository::GrantRepository;
pub use vision_repository::VisionRepository;

#[cfg(test)]
pub use company_repository::MockCompanyRepository;
#[cfg(test)]
pub use grant_repository::MockGrantRepository;
#[cfg(test)]
pub use vision_repository::MockVisionRepository;
