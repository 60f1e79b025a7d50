// handlers/elevated/mod.rs - Elevated handlers (admin role required)
//
// Marketplace-wide management. These are the only endpoints that pass
// ADMIN_OVERRIDE to the mutation guard.
pub mod admin;
