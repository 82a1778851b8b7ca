// Public entities for the Patient Manager API
// This module contains data structures that are shared across the application boundary

// Patient bodies and query parameters
pub mod patient;

// Common entities for error handling and plain messages
pub mod common;
