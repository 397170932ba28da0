//! Domain services

pub mod vision_service;

pub use vision_service::VisionService;
