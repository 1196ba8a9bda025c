// CvdRiskGuide Data
// This crate holds the session state behind the risk calculator

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;
