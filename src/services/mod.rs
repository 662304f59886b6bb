pub mod cloudinary;
pub mod metadata_store;
pub mod object_storage;
pub mod upload_service;
