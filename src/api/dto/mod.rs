//! Data Transfer Objects for REST request/response serialization.
//!
//! Request and response field names follow the wire conventions the
//! mobile and web clients already speak: camelCase for plan payloads,
//! snake_case elsewhere.

pub mod auth_dto;
pub mod notification_dto;
pub mod plan_dto;

pub use auth_dto::*;
pub use notification_dto::*;
pub use plan_dto::*;
