mod admin;

pub use admin::{require_admin, AdminContext};
