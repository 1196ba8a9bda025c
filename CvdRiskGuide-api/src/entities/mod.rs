// Public entities for the CvdRiskGuide API
// This module contains data structures that are shared across the application boundary

// Calculator request/response shapes
pub mod assessment;

// Common entities for error handling
pub mod common;

// Conversions between public and domain entities
pub mod conversions;
