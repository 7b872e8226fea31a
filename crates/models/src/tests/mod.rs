/// CRUD operations tests against a live PostgreSQL (skipped without `DATABASE_URL`)
pub mod crud_tests;
