use crate::models::{OrdinalLevel, PatientRecord, RiskFactor, Severity};

fn factor(name: &str, value: String, status: &str, severity: Severity) -> RiskFactor {
    RiskFactor {
        factor: name.to_string(),
        value,
        status: status.to_string(),
        severity,
    }
}

fn ordinal_severity(level: OrdinalLevel) -> Severity {
    if level == OrdinalLevel::High {
        Severity::High
    } else {
        Severity::Medium
    }
}

// Threshold rules, emitted in fixed table order. A missing row means the
// reading is in the acceptable range, not that it is unknown.
pub fn annotate(record: &PatientRecord, bmi: f64) -> Vec<RiskFactor> {
    let mut factors = Vec::new();

    if bmi > 30.0 {
        factors.push(factor("BMI", format!("{bmi:.1}"), "Obese", Severity::High));
    } else if bmi > 25.0 {
        factors.push(factor(
            "BMI",
            format!("{bmi:.1}"),
            "Overweight",
            Severity::Medium,
        ));
    }

    let pressure = format!("{}/{}", record.ap_hi, record.ap_lo);
    if record.ap_hi > 140 || record.ap_lo > 90 {
        factors.push(factor(
            "Blood Pressure",
            pressure,
            "Hypertension",
            Severity::High,
        ));
    } else if record.ap_hi > 120 && record.ap_lo > 80 {
        factors.push(factor("Blood Pressure", pressure, "Elevated", Severity::Low));
    }

    if record.age > 60 {
        factors.push(factor(
            "Age",
            record.age.to_string(),
            "Senior",
            Severity::Medium,
        ));
    }

    if let Some(level) = OrdinalLevel::from_code(record.cholesterol) {
        if level != OrdinalLevel::Normal {
            factors.push(factor(
                "Cholesterol",
                level.label().to_string(),
                "High Levels",
                ordinal_severity(level),
            ));
        }
    }

    if let Some(level) = OrdinalLevel::from_code(record.gluc) {
        if level != OrdinalLevel::Normal {
            factors.push(factor(
                "Glucose",
                level.label().to_string(),
                "High Levels",
                ordinal_severity(level),
            ));
        }
    }

    if record.smoke == 1 {
        factors.push(factor("Smoking", "Yes".to_string(), "Smoker", Severity::High));
    }
    if record.alco == 1 {
        factors.push(factor(
            "Alcohol",
            "Yes".to_string(),
            "Consumer",
            Severity::Medium,
        ));
    }
    if record.active == 0 {
        factors.push(factor(
            "Activity",
            "No".to_string(),
            "Sedentary",
            Severity::High,
        ));
    }

    factors
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn statuses(factors: &[RiskFactor]) -> Vec<&str> {
        factors.iter().map(|f| f.status.as_str()).collect()
    }

    #[test]
    fn healthy_baseline_emits_no_factors() {
        // 120/80 sits exactly on the elevated boundary and must not trigger
        assert!(annotate(&record(), 24.22).is_empty());
    }

    #[test]
    fn bmi_categories_are_mutually_exclusive() {
        let obese = annotate(&record(), 34.6);
        assert_eq!(statuses(&obese), vec!["Obese"]);
        assert_eq!(obese[0].severity, Severity::High);
        assert_eq!(obese[0].value, "34.6");

        let overweight = annotate(&record(), 27.0);
        assert_eq!(statuses(&overweight), vec!["Overweight"]);
        assert_eq!(overweight[0].severity, Severity::Medium);

        // boundary: exactly 30 is overweight, exactly 25 is normal
        assert_eq!(statuses(&annotate(&record(), 30.0)), vec!["Overweight"]);
        assert!(annotate(&record(), 25.0).is_empty());
    }

    #[test]
    fn hypertension_suppresses_elevated() {
        let mut r = record();
        r.ap_hi = 150;
        r.ap_lo = 95;
        let factors = annotate(&r, 24.0);
        assert_eq!(statuses(&factors), vec!["Hypertension"]);
        assert_eq!(factors[0].value, "150/95");
        assert_eq!(factors[0].severity, Severity::High);
    }

    #[test]
    fn elevated_requires_both_readings_above_boundary() {
        let mut r = record();
        r.ap_hi = 130;
        r.ap_lo = 85;
        assert_eq!(statuses(&annotate(&r, 24.0)), vec!["Elevated"]);
        assert_eq!(annotate(&r, 24.0)[0].severity, Severity::Low);

        // one reading at the boundary is still normal
        r.ap_lo = 80;
        assert!(annotate(&r, 24.0).is_empty());
    }

    #[test]
    fn diastolic_alone_can_trigger_hypertension() {
        let mut r = record();
        r.ap_lo = 95;
        assert_eq!(statuses(&annotate(&r, 24.0)), vec!["Hypertension"]);
    }

    #[test]
    fn age_over_sixty_is_a_medium_factor() {
        let mut r = record();
        r.age = 61;
        let factors = annotate(&r, 24.0);
        assert_eq!(factors[0].factor, "Age");
        assert_eq!(factors[0].value, "61");
        assert_eq!(factors[0].severity, Severity::Medium);

        r.age = 60;
        assert!(annotate(&r, 24.0).is_empty());
    }

    #[test]
    fn normal_cholesterol_and_glucose_never_appear() {
        let factors = annotate(&record(), 24.0);
        assert!(factors.iter().all(|f| f.factor != "Cholesterol"));
        assert!(factors.iter().all(|f| f.factor != "Glucose"));
    }

    #[test]
    fn ordinal_severity_tracks_the_code() {
        let mut r = record();
        r.cholesterol = 2;
        r.gluc = 3;
        let factors = annotate(&r, 24.0);
        assert_eq!(factors.len(), 2);
        assert_eq!(factors[0].factor, "Cholesterol");
        assert_eq!(factors[0].value, "Above Normal");
        assert_eq!(factors[0].severity, Severity::Medium);
        assert_eq!(factors[1].factor, "Glucose");
        assert_eq!(factors[1].value, "High");
        assert_eq!(factors[1].severity, Severity::High);
    }

    #[test]
    fn lifestyle_factors_use_fixed_labels() {
        let mut r = record();
        r.smoke = 1;
        r.alco = 1;
        r.active = 0;
        let factors = annotate(&r, 24.0);
        assert_eq!(statuses(&factors), vec!["Smoker", "Consumer", "Sedentary"]);
        assert_eq!(factors[0].severity, Severity::High);
        assert_eq!(factors[1].severity, Severity::Medium);
        assert_eq!(factors[2].severity, Severity::High);
    }

    #[test]
    fn emission_follows_rule_table_order() {
        let r = PatientRecord {
            age: 65,
            gender: 2,
            height: 170,
            weight: 100.0,
            ap_hi: 150,
            ap_lo: 95,
            cholesterol: 3,
            gluc: 2,
            smoke: 1,
            alco: 1,
            active: 0,
        };
        let factors = annotate(&r, 34.6);
        let names: Vec<&str> = factors.iter().map(|f| f.factor.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "BMI",
                "Blood Pressure",
                "Age",
                "Cholesterol",
                "Glucose",
                "Smoking",
                "Alcohol",
                "Activity"
            ]
        );
    }
}
