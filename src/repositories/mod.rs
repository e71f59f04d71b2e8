//! Tenant-scoped data access.
//!
//! Every read, update or delete against tenant data binds the caller's
//! organization id as a hard filter component. Repositories never accept an
//! optional tenant: cross-tenant reads are unrepresentable at this layer.

pub mod activities;
pub mod companies;
pub mod contacts;
pub mod deals;
pub mod organizations;
pub mod users;

pub use activities::ActivityRepository;
pub use companies::CompanyRepository;
pub use contacts::ContactRepository;
pub use deals::DealRepository;
pub use organizations::OrganizationRepository;
pub use users::UserRepository;

/// One page of rows plus the total matching count
#[derive(Debug)]
pub struct PagedResult<T> {
    pub rows: Vec<T>,
    pub total: i64,
}
