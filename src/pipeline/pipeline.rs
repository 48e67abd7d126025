use std::time::Duration;

use anyhow::Error;
use opencv::core::Mat;
use serde::Serialize;

use crate::config::config::{PoseModelConfig, PostureThresholds};
use crate::helper::posture_helper::{
    issues_and_recommendations, posture_score, quality_tier, PostureAnalysis, PostureAnalyzer,
    PostureFlags, PostureMetrics, Recommendation,
};
use crate::modules::pose_landmark_client::PoseLandmarkClient;
use crate::triton_client::client::TritonInferenceClient;

const LIVENESS_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Score-derived classifier summary, kept alongside the raw measurements in
/// the report payload.
#[derive(Debug, Clone, Serialize)]
pub struct MlPrediction {
    pub probability: f32,
    pub binary_prediction: u8,
    pub posture_quality: String,
    pub confidence: f32,
}

/// One complete analysis outcome. Created per request, serialized, discarded.
#[derive(Debug, Clone, Serialize)]
pub struct PostureReport {
    pub posture_score: f32,
    pub ml_prediction: MlPrediction,
    pub issues: Vec<&'static str>,
    pub recommendations: Vec<Recommendation>,
    pub technical_measurements: PostureMetrics,
    pub binary_indicators: PostureFlags,
    pub total_issues_count: u32,
}

#[derive(Debug, Clone)]
pub struct PosturePipeline {
    pose_client: PoseLandmarkClient,
    analyzer: PostureAnalyzer,
}

impl PosturePipeline {
    /// new initializes new instance of the pipeline.
    pub fn new(
        triton_infer_client: TritonInferenceClient,
        pose_config: PoseModelConfig,
        thresholds: PostureThresholds,
    ) -> Self {
        PosturePipeline {
            pose_client: PoseLandmarkClient::new(triton_infer_client, pose_config),
            analyzer: PostureAnalyzer::new(thresholds),
        }
    }

    /// analyze_image extracts pose landmarks from the input image and derives
    /// the full posture report.
    ///
    /// # Arguments
    /// * `img` - RGB OpenCV matrix
    ///
    /// # Returns
    /// * `Result<Option<PostureReport>, Error>` - None when no pose was detected
    pub async fn analyze_image(&self, img: &Mat) -> Result<Option<PostureReport>, Error> {
        let landmarks = match self.pose_client.detect_landmarks(img).await? {
            None => return Ok(None),
            Some(landmarks) => landmarks,
        };

        let analysis = self.analyzer.analyze(&landmarks);
        Ok(Some(self.compose_report(&analysis)))
    }

    /// compose_report aggregates one analysis into the serializable report:
    /// score, quality tier, issue labels, recommendations and counters.
    pub fn compose_report(&self, analysis: &PostureAnalysis) -> PostureReport {
        let score = posture_score(&analysis.flags);
        let (posture_quality, binary_prediction) = quality_tier(score);
        let (issues, recommendations) = issues_and_recommendations(&analysis.flags);

        let ml_prediction = MlPrediction {
            probability: score / 100.0,
            binary_prediction,
            posture_quality: posture_quality.to_string(),
            confidence: (score / 100.0).max(0.7),
        };

        PostureReport {
            posture_score: score,
            ml_prediction,
            issues,
            recommendations,
            technical_measurements: analysis.metrics,
            binary_indicators: analysis.flags,
            total_issues_count: analysis.flags.count(),
        }
    }

    /// detector_available probes the model server liveness, bounded so a dead
    /// endpoint cannot stall the health check.
    pub async fn detector_available(&self) -> bool {
        match tokio::time::timeout(LIVENESS_PROBE_TIMEOUT, self.pose_client.is_ready()).await {
            Ok(Ok(live)) => live,
            Ok(Err(_)) | Err(_) => false,
        }
    }
}
