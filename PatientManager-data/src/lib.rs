// Patient Manager Data
// This crate handles storage of patient records

// Database configuration and connection management
pub mod database;

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;
