// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route here sits behind jwt_auth_middleware + validate_user_middleware.
// Each handler then names its allow-list through its extractor (`Guarded<L>`,
// `AdminUser` or `CurrentUser`), and mutating handlers run the ownership guard
// on the fetched record before touching the store.
pub mod providers;
pub mod repair_requests;
pub mod services;
pub mod users;
