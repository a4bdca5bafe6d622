pub mod auth_service;
pub mod photo_storage;
pub mod role_service;
pub mod seed;
pub mod token_service;
