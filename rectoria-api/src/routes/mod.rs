/// API route handlers
///
/// - `health`: Health check endpoint
/// - `rol`: Role management endpoints (admin only)

pub mod health;
pub mod rol;
