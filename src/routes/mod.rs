/// Router Module Index
///
/// Splits the HTTP surface by access level. Each module is wrapped in its own
/// route layer in `create_router`, so an endpoint's protection follows from the
/// module it is registered in.

/// Anonymous access: health, account gateway and the read-only movie catalog.
pub mod public;

/// Any authenticated account (Bearer JWT or HTTP Basic).
pub mod authenticated;

/// Accounts holding `ROLE_ADMIN`.
pub mod admin;
