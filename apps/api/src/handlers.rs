pub mod groups;
pub mod health;
pub mod me;
pub mod permissions;
pub mod roles;
