//! Infrastructure layer - database storage and uploaded file storage

pub mod files;
pub mod storage;
