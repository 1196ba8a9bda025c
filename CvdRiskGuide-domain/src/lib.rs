// CvdRiskGuide Domain
// This crate contains the risk model and business logic for the CvdRiskGuide application

// Services that implement business logic
pub mod services;

// Domain entities
pub mod entities;

// Health checks and system status
pub mod health;

// Testing utilities - only available with mock feature
#[cfg(feature = "mock")]
pub mod testing;
