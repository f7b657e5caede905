use std::fmt::Write;
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;

use crate::models::{PatientRecord, PredictionReport};

#[derive(Debug, Clone)]
pub struct ScreeningOutcome {
    pub record: PatientRecord,
    pub report: PredictionReport,
}

#[derive(Debug, Clone)]
pub struct FactorSummary {
    pub factor: String,
    pub count: usize,
}

pub fn read_patients_csv(path: &Path) -> anyhow::Result<Vec<PatientRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut records = Vec::new();
    for (i, row) in reader.deserialize().enumerate() {
        let record: PatientRecord =
            row.with_context(|| format!("invalid patient record on row {}", i + 1))?;
        records.push(record);
    }
    Ok(records)
}

pub fn summarize_factors(outcomes: &[ScreeningOutcome]) -> Vec<FactorSummary> {
    let mut map: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

    for outcome in outcomes {
        for factor in &outcome.report.analysis.risk_factors {
            *map.entry(factor.factor.clone()).or_insert(0) += 1;
        }
    }

    let mut summaries: Vec<FactorSummary> = map
        .into_iter()
        .map(|(factor, count)| FactorSummary { factor, count })
        .collect();

    summaries.sort_by(|a, b| b.count.cmp(&a.count).then(a.factor.cmp(&b.factor)));
    summaries
}

pub fn build_report(outcomes: &[ScreeningOutcome], generated: NaiveDate) -> String {
    let mut output = String::new();

    let high_risk: Vec<&ScreeningOutcome> = outcomes
        .iter()
        .filter(|o| o.report.risk_prediction == 1)
        .collect();

    let _ = writeln!(output, "# Cardio Risk Screening Report");
    let _ = writeln!(
        output,
        "Generated on {} for {} patient records",
        generated,
        outcomes.len()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overview");

    if outcomes.is_empty() {
        let _ = writeln!(output, "No records screened.");
        return output;
    }

    let avg_probability: f64 = outcomes
        .iter()
        .map(|o| o.report.risk_probability)
        .sum::<f64>()
        / outcomes.len() as f64;
    let _ = writeln!(
        output,
        "- High risk: {} of {} ({:.0}%)",
        high_risk.len(),
        outcomes.len(),
        100.0 * high_risk.len() as f64 / outcomes.len() as f64
    );
    let _ = writeln!(
        output,
        "- Average risk probability: {:.1}%",
        avg_probability * 100.0
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Most Frequent Risk Factors");

    let summaries = summarize_factors(outcomes);
    if summaries.is_empty() {
        let _ = writeln!(output, "No risk factors identified in this batch.");
    } else {
        for summary in summaries.iter() {
            let _ = writeln!(output, "- {}: {} records", summary.factor, summary.count);
        }
    }

    let mut ranked: Vec<(usize, &ScreeningOutcome)> = outcomes.iter().enumerate().collect();
    ranked.sort_by(|a, b| {
        b.1.report
            .risk_probability
            .partial_cmp(&a.1.report.risk_probability)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let _ = writeln!(output);
    let _ = writeln!(output, "## Highest Risk Records");

    for (row, outcome) in ranked.iter().take(10) {
        let factors: Vec<&str> = outcome
            .report
            .analysis
            .risk_factors
            .iter()
            .map(|f| f.factor.as_str())
            .collect();
        let _ = writeln!(
            output,
            "- row {}: {} ({:.1}%), age {}, bp {}/{}, bmi {:.1}, factors: {}",
            row + 1,
            outcome.report.message,
            outcome.report.risk_probability * 100.0,
            outcome.record.age,
            outcome.record.ap_hi,
            outcome.record.ap_lo,
            outcome.report.analysis.bmi,
            if factors.is_empty() {
                "none".to_string()
            } else {
                factors.join(", ")
            }
        );
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RiskAnalysis, RiskFactor, Severity};

    fn record() -> PatientRecord {
        PatientRecord {
            age: 50,
            gender: 1,
            height: 170,
            weight: 70.0,
            ap_hi: 120,
            ap_lo: 80,
            cholesterol: 1,
            gluc: 1,
            smoke: 0,
            alco: 0,
            active: 1,
        }
    }

    fn outcome(label: u8, probability: f64, factors: Vec<&str>) -> ScreeningOutcome {
        ScreeningOutcome {
            record: record(),
            report: PredictionReport {
                risk_prediction: label,
                risk_probability: probability,
                message: if label == 1 { "High Risk" } else { "Low Risk" }.to_string(),
                analysis: RiskAnalysis {
                    bmi: 24.2,
                    risk_factors: factors
                        .into_iter()
                        .map(|name| RiskFactor {
                            factor: name.to_string(),
                            value: "x".to_string(),
                            status: "x".to_string(),
                            severity: Severity::Medium,
                        })
                        .collect(),
                },
            },
        }
    }

    #[test]
    fn factor_summary_counts_across_records() {
        let outcomes = vec![
            outcome(1, 0.8, vec!["Smoking", "BMI"]),
            outcome(1, 0.7, vec!["Smoking"]),
            outcome(0, 0.2, vec![]),
        ];
        let summaries = summarize_factors(&outcomes);
        assert_eq!(summaries[0].factor, "Smoking");
        assert_eq!(summaries[0].count, 2);
        assert_eq!(summaries[1].factor, "BMI");
        assert_eq!(summaries[1].count, 1);
    }

    #[test]
    fn report_counts_match_predictions() {
        let outcomes = vec![outcome(1, 0.8, vec!["Smoking"]), outcome(0, 0.2, vec![])];
        let generated = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        let report = build_report(&outcomes, generated);
        assert!(report.contains("High risk: 1 of 2 (50%)"));
        assert!(report.contains("Average risk probability: 50.0%"));
        assert!(report.contains("- Smoking: 1 records"));
        assert!(report.contains("row 1: High Risk (80.0%)"));
    }

    #[test]
    fn empty_batch_produces_a_stub_report() {
        let generated = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        let report = build_report(&[], generated);
        assert!(report.contains("No records screened."));
    }

    #[test]
    fn csv_rows_deserialize_into_patient_records() {
        use std::io::Write as _;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "age,gender,height,weight,ap_hi,ap_lo,cholesterol,gluc,smoke,alco,active"
        )
        .unwrap();
        writeln!(file, "50,1,170,70.0,120,80,1,1,0,0,1").unwrap();
        writeln!(file, "65,2,160,90.5,150,95,3,2,1,0,0").unwrap();

        let records = read_patients_csv(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].ap_hi, 150);
        assert!((records[1].weight - 90.5).abs() < f64::EPSILON);
    }

    #[test]
    fn csv_with_a_bad_row_names_the_row() {
        use std::io::Write as _;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "age,gender,height,weight,ap_hi,ap_lo,cholesterol,gluc,smoke,alco,active"
        )
        .unwrap();
        writeln!(file, "50,1,170,not-a-number,120,80,1,1,0,0,1").unwrap();

        let err = read_patients_csv(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("row 1"));
    }
}
