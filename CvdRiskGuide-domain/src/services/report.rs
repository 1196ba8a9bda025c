use thiserror::Error;

use crate::entities::assessment::{ChartPoint, OutcomeSummary, ReportLines, RiskEstimate};
use crate::entities::therapy::LdlProjection;

/// Filename offered for the CSV download
pub const EXPORT_FILENAME: &str = "cvd_results.csv";

/// Shown instead of ARR/RRR/NNT when lifetime risk does not apply
pub const OUTCOME_NOT_APPLICABLE: &str = "ARR/RRR/NNT not applicable for age ≥ 85";

/// Report rendering errors
#[derive(Debug, Error)]
pub enum ReportError {
    /// Writing a CSV record failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The CSV writer could not be flushed into a buffer
    #[error("CSV buffer error: {0}")]
    Buffer(String),

    /// The CSV output was not valid UTF-8
    #[error("CSV encoding error: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Format a percentage with one decimal and a trailing `%`
pub fn format_percentage(value: f64) -> String {
    format!("{:.1}%", value)
}

/// "5-year: …, 10-year: …, Lifetime: …"
pub fn risk_summary_line(estimate: &RiskEstimate) -> String {
    let lifetime = estimate
        .lifetime
        .map(format_percentage)
        .unwrap_or_else(|| "N/A".to_string());

    format!(
        "5-year: {}, 10-year: {}, Lifetime: {}",
        format_percentage(estimate.five_year),
        format_percentage(estimate.ten_year),
        lifetime
    )
}

/// ARR/RRR/NNT line, or the not-applicable message
pub fn outcome_summary_line(outcome: Option<&OutcomeSummary>) -> String {
    match outcome {
        Some(outcome) => {
            let nnt = outcome
                .nnt
                .map(|nnt| format!("{:.0}", nnt))
                .unwrap_or_else(|| "N/A".to_string());
            format!("ARR: {:.1} pp, RRR: {:.1}%, NNT: {}", outcome.arr, outcome.rrr, nnt)
        }
        None => OUTCOME_NOT_APPLICABLE.to_string(),
    }
}

/// "Projected LDL-C: 1.5 mmol/L (↓ 1.5 mmol/L)"
pub fn ldl_statement(projection: &LdlProjection) -> String {
    format!(
        "Projected LDL-C: {:.1} mmol/L (↓ {:.1} mmol/L)",
        projection.projected, projection.drop
    )
}

pub fn bmi_statement(bmi: f64) -> String {
    format!("BMI: {:.1} kg/m²", bmi)
}

/// Bars for the risk chart; lifetime only when applicable
pub fn chart_series(estimate: &RiskEstimate) -> Vec<ChartPoint> {
    let mut points = vec![
        ChartPoint {
            label: "5-year".to_string(),
            value: estimate.five_year,
        },
        ChartPoint {
            label: "10-year".to_string(),
            value: estimate.ten_year,
        },
    ];

    if let Some(lifetime) = estimate.lifetime {
        points.push(ChartPoint {
            label: "Lifetime".to_string(),
            value: lifetime,
        });
    }

    points
}

/// All text lines for one assessment
pub fn build_report(
    estimate: &RiskEstimate,
    outcome: Option<&OutcomeSummary>,
    projection: &LdlProjection,
    bmi: f64,
) -> ReportLines {
    ReportLines {
        risk: risk_summary_line(estimate),
        outcome: outcome_summary_line(outcome),
        ldl: ldl_statement(projection),
        bmi: bmi_statement(bmi),
    }
}

/// Two-column (Metric, Value) CSV with values rounded to one decimal
pub fn export_csv(estimate: &RiskEstimate) -> Result<String, ReportError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    let mut rows = vec![
        ("5yr", format!("{:.1}", estimate.five_year)),
        ("10yr", format!("{:.1}", estimate.ten_year)),
    ];
    if let Some(lifetime) = estimate.lifetime {
        rows.push(("Lifetime", format!("{:.1}", lifetime)));
    }

    writer.write_record(["Metric", "Value"])?;
    for (metric, value) in &rows {
        writer.write_record([*metric, value.as_str()])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ReportError::Buffer(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}
