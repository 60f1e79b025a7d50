// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, registration and service metadata. Inputs are validated
// here without any trusted user context.
pub mod auth;
pub mod root;
