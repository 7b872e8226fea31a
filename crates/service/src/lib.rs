//! Service layer for the product catalog.
//! - Auth: registration, login and bearer token checks.
//! - Products: CRUD with details and files, priority assignment.
//! - Storage: object storage gateway for uploaded files.

pub mod errors;
pub mod auth;
pub mod product;
pub mod storage;
#[cfg(test)]
pub mod test_support;
