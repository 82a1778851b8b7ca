use crate::entities::patient::{BodyMetrics, Verdict};

/// Body mass index from height in centimeters and weight in kilograms,
/// rounded to two decimals (halves away from zero).
///
/// Callers guarantee `height_cm > 0` and `weight_kg > 0`.
pub fn calculate_bmi(height_cm: f64, weight_kg: f64) -> f64 {
    let height_m = height_cm / 100.0;
    let bmi = weight_kg / (height_m * height_m);
    (bmi * 100.0).round() / 100.0
}

/// Bucket a BMI value. Lower bounds are inclusive.
pub fn classify_bmi(bmi: f64) -> Verdict {
    if bmi < 18.5 {
        Verdict::Underweight
    } else if bmi < 25.0 {
        Verdict::NormalWeight
    } else if bmi < 30.0 {
        Verdict::Overweight
    } else {
        Verdict::Obese
    }
}

/// Compute both derived fields in one step
pub fn derive_body_metrics(height_cm: f64, weight_kg: f64) -> BodyMetrics {
    let bmi = calculate_bmi(height_cm, weight_kg);
    BodyMetrics {
        bmi,
        verdict: classify_bmi(bmi),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_measurements() {
        let metrics = derive_body_metrics(175.5, 70.2);
        assert_eq!(metrics.bmi, 22.79);
        assert_eq!(metrics.verdict, Verdict::NormalWeight);

        let metrics = derive_body_metrics(160.0, 45.0);
        assert_eq!(metrics.bmi, 17.58);
        assert_eq!(metrics.verdict, Verdict::Underweight);

        let metrics = derive_body_metrics(170.0, 90.0);
        assert_eq!(metrics.bmi, 31.14);
        assert_eq!(metrics.verdict, Verdict::Obese);
    }

    #[test]
    fn test_boundaries_fall_into_upper_category() {
        assert_eq!(classify_bmi(18.49), Verdict::Underweight);
        assert_eq!(classify_bmi(18.5), Verdict::NormalWeight);
        assert_eq!(classify_bmi(24.99), Verdict::NormalWeight);
        assert_eq!(classify_bmi(25.0), Verdict::Overweight);
        assert_eq!(classify_bmi(29.99), Verdict::Overweight);
        assert_eq!(classify_bmi(30.0), Verdict::Obese);
    }

    #[test]
    fn test_overweight_band() {
        // 80 / 1.75^2 = 26.122...
        let metrics = derive_body_metrics(175.0, 80.0);
        assert_eq!(metrics.bmi, 26.12);
        assert_eq!(metrics.verdict, Verdict::Overweight);
    }

    #[test]
    fn test_derivation_is_deterministic() {
        assert_eq!(derive_body_metrics(182.3, 77.7), derive_body_metrics(182.3, 77.7));
    }
}
