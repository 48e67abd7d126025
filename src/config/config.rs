use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PoseModelConfig {
    pub model_name: String,
    pub input_name: String,
    pub output_name: String,
    pub timeout: i32,
    pub mean: f32,
    pub scale: f32,
    pub imsize: (i32, i32),
    pub min_confidence: f32,
}

impl PoseModelConfig {
    pub fn new() -> Self {
        PoseModelConfig {
            model_name: "pose_landmark".to_string(),
            input_name: "input".to_string(),
            output_name: "landmarks".to_string(),
            timeout: 20,
            mean: 127.5,
            scale: 0.00784313725490196,
            imsize: (256, 256),
            min_confidence: 0.5,
        }
    }
}

impl Default for PoseModelConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Empirical cutoffs for each posture measurement. Hand-tuned against webcam
/// photos, not derived from calibration data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostureThresholds {
    pub forward_head: f32,
    pub shoulder_imbalance: f32,
    pub head_tilt: f32,
    pub slouch: f32,
    pub alignment: f32,
    pub neck_angle_deviation: f32,
}

impl PostureThresholds {
    pub fn new() -> Self {
        PostureThresholds {
            forward_head: 0.08,
            shoulder_imbalance: 0.05,
            head_tilt: 0.2,
            slouch: 0.05,
            alignment: 0.12,
            neck_angle_deviation: 25.0,
        }
    }
}

impl Default for PostureThresholds {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub triton_endpoint: String,
}

impl ServerConfig {
    pub fn new() -> Self {
        ServerConfig {
            bind_addr: "0.0.0.0:5001".to_string(),
            triton_endpoint: "http://127.0.0.1:8001".to_string(),
        }
    }

    /// from_env applies `POSTURE_BIND_ADDR` / `POSTURE_TRITON_ENDPOINT`
    /// overrides on top of the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::new();
        if let Ok(addr) = std::env::var("POSTURE_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(endpoint) = std::env::var("POSTURE_TRITON_ENDPOINT") {
            config.triton_endpoint = endpoint;
        }
        config
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_defaults() {
        let thresholds = PostureThresholds::new();
        assert_eq!(thresholds.forward_head, 0.08);
        assert_eq!(thresholds.shoulder_imbalance, 0.05);
        assert_eq!(thresholds.head_tilt, 0.2);
        assert_eq!(thresholds.slouch, 0.05);
        assert_eq!(thresholds.alignment, 0.12);
        assert_eq!(thresholds.neck_angle_deviation, 25.0);
    }

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::new();
        assert_eq!(config.bind_addr, "0.0.0.0:5001");
        assert_eq!(config.triton_endpoint, "http://127.0.0.1:8001");
    }
}
