pub mod assessment;
pub mod health;

// Re-export handlers for easier imports
pub use assessment::{
    export_assessment_csv, get_current_assessment, list_therapies, project_ldl, reset_assessment,
    submit_assessment,
};
pub use health::health_check;
