use serde::ser::Serializer;
use serde::Serialize;

use crate::config::config::PostureThresholds;
use crate::utils::coordinate::PostureLandmarks;

/// Points deducted from the 0-100 score per triggered indicator.
const DEDUCTION_PER_ISSUE: f32 = 16.67;

fn bool_as_int<S>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u8(u8::from(*flag))
}

/// The six raw geometric measurements. Distances are in normalized image
/// units, head tilt in radians, neck angle in degrees.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PostureMetrics {
    pub forward_head_distance: f32,
    pub shoulder_imbalance: f32,
    pub head_tilt: f32,
    pub slouch_distance: f32,
    pub total_misalignment: f32,
    pub neck_angle: f32,
}

/// Binary indicators derived from the measurements, serialized as 0/1.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PostureFlags {
    #[serde(serialize_with = "bool_as_int")]
    pub forward_head: bool,
    #[serde(serialize_with = "bool_as_int")]
    pub shoulder_imbalance: bool,
    #[serde(serialize_with = "bool_as_int")]
    pub head_tilt: bool,
    #[serde(serialize_with = "bool_as_int")]
    pub slouching: bool,
    #[serde(serialize_with = "bool_as_int")]
    pub alignment: bool,
    #[serde(serialize_with = "bool_as_int")]
    pub neck_angle: bool,
}

impl PostureFlags {
    pub fn count(&self) -> u32 {
        u32::from(self.forward_head)
            + u32::from(self.shoulder_imbalance)
            + u32::from(self.head_tilt)
            + u32::from(self.slouching)
            + u32::from(self.alignment)
            + u32::from(self.neck_angle)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PostureAnalysis {
    pub metrics: PostureMetrics,
    pub flags: PostureFlags,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub issue: &'static str,
    pub tips: [&'static str; 3],
}

#[derive(Debug, Clone)]
pub struct PostureAnalyzer {
    thresholds: PostureThresholds,
}

impl PostureAnalyzer {
    pub fn new(thresholds: PostureThresholds) -> Self {
        PostureAnalyzer { thresholds }
    }

    /// analyze derives the six measurements and their indicators from one
    /// landmark set.
    ///
    /// # Arguments
    /// * `landmarks` - &PostureLandmarks
    ///
    /// # Returns
    /// * `PostureAnalysis`
    pub fn analyze(&self, landmarks: &PostureLandmarks) -> PostureAnalysis {
        let mid_shoulder = landmarks.mid_shoulder().to_vector();
        let mid_ear = landmarks.mid_ear().to_vector();
        let mid_hip = landmarks.mid_hip().to_vector();

        let forward_head_distance = (mid_ear.x - mid_shoulder.x).abs();
        let shoulder_imbalance = (landmarks.left_shoulder.y - landmarks.right_shoulder.y).abs();
        let head_tilt = (landmarks.right_ear.y - landmarks.left_ear.y)
            .atan2(landmarks.right_ear.x - landmarks.left_ear.x)
            .abs();
        let slouch_distance = (mid_shoulder.x - mid_hip.x).abs();
        let total_misalignment = forward_head_distance + slouch_distance;

        let neck_vector = mid_ear - mid_shoulder;
        let torso_vector = mid_shoulder - mid_hip;
        let norms = neck_vector.norm() * torso_vector.norm();

        // A zero-length neck or torso vector makes the angle undefined; treat
        // it as neutral and leave the indicator clear.
        let (neck_angle, neck_angle_flag) = if norms > 0.0 {
            let cosine = (neck_vector.dot(&torso_vector) / norms).clamp(-1.0, 1.0);
            let angle = cosine.acos().to_degrees();
            (
                angle,
                (angle - 90.0).abs() > self.thresholds.neck_angle_deviation,
            )
        } else {
            (90.0, false)
        };

        PostureAnalysis {
            metrics: PostureMetrics {
                forward_head_distance,
                shoulder_imbalance,
                head_tilt,
                slouch_distance,
                total_misalignment,
                neck_angle,
            },
            flags: PostureFlags {
                forward_head: forward_head_distance > self.thresholds.forward_head,
                shoulder_imbalance: shoulder_imbalance > self.thresholds.shoulder_imbalance,
                head_tilt: head_tilt > self.thresholds.head_tilt,
                slouching: slouch_distance > self.thresholds.slouch,
                alignment: total_misalignment > self.thresholds.alignment,
                neck_angle: neck_angle_flag,
            },
        }
    }
}

/// posture_score deducts a fixed amount per triggered indicator, floored at
/// zero and rounded to one decimal.
pub fn posture_score(flags: &PostureFlags) -> f32 {
    let raw = (100.0 - flags.count() as f32 * DEDUCTION_PER_ISSUE).max(0.0);
    (raw * 10.0).round() / 10.0
}

/// quality_tier maps a score onto its tier label and binary prediction.
pub fn quality_tier(score: f32) -> (&'static str, u8) {
    if score >= 80.0 {
        ("Good", 1)
    } else if score >= 60.0 {
        ("Fair", 0)
    } else {
        ("Poor", 0)
    }
}

/// issues_and_recommendations maps the triggered indicators to their issue
/// labels and canned tips, always in the same order.
pub fn issues_and_recommendations(
    flags: &PostureFlags,
) -> (Vec<&'static str>, Vec<Recommendation>) {
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    if flags.forward_head {
        issues.push("Forward head posture detected");
        recommendations.push(Recommendation {
            issue: "Forward Head Posture",
            tips: [
                "Tuck your chin back",
                "Imagine a string pulling the top of your head up",
                "Keep your ears aligned over your shoulders",
            ],
        });
    }

    if flags.shoulder_imbalance {
        issues.push("Uneven shoulders");
        recommendations.push(Recommendation {
            issue: "Shoulder Imbalance",
            tips: [
                "Check if you're carrying weight on one side",
                "Practice shoulder blade squeezes",
                "Be aware of which shoulder tends to be higher",
            ],
        });
    }

    if flags.head_tilt {
        issues.push("Head tilted to one side");
        recommendations.push(Recommendation {
            issue: "Head Tilt",
            tips: [
                "Practice head alignment exercises",
                "Check your workspace ergonomics",
                "Be mindful of phone/computer screen positioning",
            ],
        });
    }

    if flags.slouching {
        issues.push("Slouching/rounded shoulders");
        recommendations.push(Recommendation {
            issue: "Slouching",
            tips: [
                "Pull your shoulder blades back and down",
                "Engage your core muscles",
                "Keep your chest open",
            ],
        });
    }

    if flags.alignment {
        issues.push("Poor overall alignment");
        recommendations.push(Recommendation {
            issue: "Overall Alignment",
            tips: [
                "Practice standing against a wall",
                "Focus on stacking head over shoulders over hips",
                "Consider ergonomic adjustments to your workspace",
            ],
        });
    }

    if flags.neck_angle {
        issues.push("Poor neck angle");
        recommendations.push(Recommendation {
            issue: "Neck Angle",
            tips: [
                "Adjust your screen to eye level",
                "Practice neck stretches",
                "Maintain neutral neck position",
            ],
        });
    }

    (issues, recommendations)
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use crate::utils::coordinate::Coordinate2D;

    use super::*;

    fn analyzer() -> PostureAnalyzer {
        PostureAnalyzer::new(PostureThresholds::new())
    }

    /// An upright subject: every measurement sits inside its threshold.
    fn upright_landmarks() -> PostureLandmarks {
        PostureLandmarks {
            left_shoulder: Coordinate2D::new(0.45, 0.6),
            right_shoulder: Coordinate2D::new(0.55, 0.6),
            left_ear: Coordinate2D::new(0.52, 0.58),
            right_ear: Coordinate2D::new(0.62, 0.58),
            left_hip: Coordinate2D::new(0.45, 0.9),
            right_hip: Coordinate2D::new(0.55, 0.9),
            nose: Coordinate2D::new(0.57, 0.5),
        }
    }

    /// A heavily collapsed pose that trips every indicator at once.
    fn collapsed_landmarks() -> PostureLandmarks {
        PostureLandmarks {
            left_shoulder: Coordinate2D::new(0.4, 0.5),
            right_shoulder: Coordinate2D::new(0.6, 0.58),
            left_ear: Coordinate2D::new(0.62, 0.30),
            right_ear: Coordinate2D::new(0.68, 0.34),
            left_hip: Coordinate2D::new(0.32, 0.9),
            right_hip: Coordinate2D::new(0.52, 0.9),
            nose: Coordinate2D::new(0.66, 0.25),
        }
    }

    fn flags_with(count: u32) -> PostureFlags {
        PostureFlags {
            forward_head: count > 0,
            shoulder_imbalance: count > 1,
            head_tilt: count > 2,
            slouching: count > 3,
            alignment: count > 4,
            neck_angle: count > 5,
        }
    }

    #[test]
    fn test_upright_pose_clears_all_indicators() {
        let analysis = analyzer().analyze(&upright_landmarks());

        assert_eq!(analysis.flags.count(), 0);
        assert_approx_eq!(analysis.metrics.forward_head_distance, 0.07, 1e-5);
        assert_approx_eq!(analysis.metrics.shoulder_imbalance, 0.0, 1e-6);
        assert_approx_eq!(analysis.metrics.head_tilt, 0.0, 1e-6);
        assert_approx_eq!(analysis.metrics.slouch_distance, 0.0, 1e-5);
        assert_approx_eq!(analysis.metrics.total_misalignment, 0.07, 1e-5);
        assert_approx_eq!(analysis.metrics.neck_angle, 74.05, 0.1);
    }

    #[test]
    fn test_collapsed_pose_trips_all_indicators() {
        let analysis = analyzer().analyze(&collapsed_landmarks());

        assert!(analysis.flags.forward_head);
        assert!(analysis.flags.shoulder_imbalance);
        assert!(analysis.flags.head_tilt);
        assert!(analysis.flags.slouching);
        assert!(analysis.flags.alignment);
        assert!(analysis.flags.neck_angle);
        assert_eq!(analysis.flags.count(), 6);
    }

    #[test]
    fn test_zero_length_neck_vector_defaults_angle() {
        // Ears collapsed onto the shoulders: mid_ear == mid_shoulder.
        let mut landmarks = upright_landmarks();
        landmarks.left_ear = landmarks.left_shoulder;
        landmarks.right_ear = landmarks.right_shoulder;

        let analysis = analyzer().analyze(&landmarks);
        assert_approx_eq!(analysis.metrics.neck_angle, 90.0);
        assert!(!analysis.flags.neck_angle);
    }

    #[test]
    fn test_zero_length_torso_vector_defaults_angle() {
        let mut landmarks = upright_landmarks();
        landmarks.left_hip = landmarks.left_shoulder;
        landmarks.right_hip = landmarks.right_shoulder;

        let analysis = analyzer().analyze(&landmarks);
        assert_approx_eq!(analysis.metrics.neck_angle, 90.0);
        assert!(!analysis.flags.neck_angle);
    }

    #[test]
    fn test_measurement_at_threshold_is_not_flagged() {
        // The comparison is strict: exactly 0.05 shoulder difference stays clear.
        let mut landmarks = upright_landmarks();
        landmarks.left_shoulder.y = 0.6;
        landmarks.right_shoulder.y = 0.65;

        let analysis = analyzer().analyze(&landmarks);
        assert_approx_eq!(analysis.metrics.shoulder_imbalance, 0.05, 1e-6);
        assert!(!analysis.flags.shoulder_imbalance);
    }

    #[test]
    fn test_score_monotone_and_bounded() {
        let mut previous = f32::INFINITY;
        for count in 0..=6 {
            let score = posture_score(&flags_with(count));
            assert!((0.0..=100.0).contains(&score));
            assert!(score <= previous);
            previous = score;
        }
    }

    #[test]
    fn test_score_extremes() {
        assert_approx_eq!(posture_score(&flags_with(0)), 100.0);
        // 6 x 16.67 overshoots 100 and clamps at the floor.
        assert_approx_eq!(posture_score(&flags_with(6)), 0.0);
    }

    #[test]
    fn test_score_single_issue() {
        assert_approx_eq!(posture_score(&flags_with(1)), 83.3);
    }

    #[test]
    fn test_quality_tiers() {
        assert_eq!(quality_tier(100.0), ("Good", 1));
        assert_eq!(quality_tier(80.0), ("Good", 1));
        assert_eq!(quality_tier(66.7), ("Fair", 0));
        assert_eq!(quality_tier(60.0), ("Fair", 0));
        assert_eq!(quality_tier(50.0), ("Poor", 0));
        assert_eq!(quality_tier(0.0), ("Poor", 0));
    }

    #[test]
    fn test_no_issues_no_recommendations() {
        let (issues, recommendations) = issues_and_recommendations(&flags_with(0));
        assert!(issues.is_empty());
        assert!(recommendations.is_empty());
    }

    #[test]
    fn test_recommendation_order_is_stable() {
        let (issues, recommendations) = issues_and_recommendations(&flags_with(6));
        assert_eq!(
            issues,
            vec![
                "Forward head posture detected",
                "Uneven shoulders",
                "Head tilted to one side",
                "Slouching/rounded shoulders",
                "Poor overall alignment",
                "Poor neck angle",
            ]
        );
        let labels: Vec<&str> = recommendations.iter().map(|r| r.issue).collect();
        assert_eq!(
            labels,
            vec![
                "Forward Head Posture",
                "Shoulder Imbalance",
                "Head Tilt",
                "Slouching",
                "Overall Alignment",
                "Neck Angle",
            ]
        );

        // Pure function of the flag set: a second call yields the same output.
        let again = issues_and_recommendations(&flags_with(6));
        assert_eq!(issues, again.0);
        assert_eq!(recommendations, again.1);
    }

    #[test]
    fn test_single_flag_maps_to_single_recommendation() {
        let flags = PostureFlags {
            forward_head: false,
            shoulder_imbalance: false,
            head_tilt: false,
            slouching: true,
            alignment: false,
            neck_angle: false,
        };
        let (issues, recommendations) = issues_and_recommendations(&flags);
        assert_eq!(issues, vec!["Slouching/rounded shoulders"]);
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].issue, "Slouching");
        assert_eq!(recommendations[0].tips.len(), 3);
    }

    #[test]
    fn test_flags_serialize_as_integers() {
        let flags = flags_with(1);
        let json = serde_json::to_value(flags).unwrap();
        assert_eq!(json["forward_head"], 1);
        assert_eq!(json["neck_angle"], 0);
    }
}
