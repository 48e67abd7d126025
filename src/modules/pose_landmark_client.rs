use anyhow::Error;
use ndarray::{Array2, Array3, Array4, Axis};
use opencv::core::{Mat, MatTraitConst, Rect, Scalar, Size, Vec3b, CV_8UC3};
use opencv::imgproc;
use opencv::imgproc::resize;

use crate::config::config::PoseModelConfig;
use crate::triton_client::client::triton::model_infer_request::InferInputTensor;
use crate::triton_client::client::triton::{InferTensorContents, ModelInferRequest};
use crate::triton_client::client::TritonInferenceClient;
use crate::utils::coordinate::{Coordinate2D, PostureLandmarks};
use crate::utils::utils::u8_to_f32_vec;

/// MediaPipe pose landmark indices (33-keypoint convention).
/// See: https://google.github.io/mediapipe/solutions/pose.html
pub(crate) mod landmark_index {
    pub const NOSE: usize = 0;
    pub const LEFT_EAR: usize = 7;
    pub const RIGHT_EAR: usize = 8;
    pub const LEFT_SHOULDER: usize = 11;
    pub const RIGHT_SHOULDER: usize = 12;
    pub const LEFT_HIP: usize = 23;
    pub const RIGHT_HIP: usize = 24;
}

use landmark_index::*;

const REQUIRED_LANDMARKS: [usize; 7] = [
    LEFT_SHOULDER,
    RIGHT_SHOULDER,
    LEFT_EAR,
    RIGHT_EAR,
    LEFT_HIP,
    RIGHT_HIP,
    NOSE,
];

#[derive(Debug, Clone)]
pub(crate) struct PoseLandmarkClient {
    triton_infer_client: TritonInferenceClient,
    model_name: String,
    input_name: String,
    output_name: String,
    timeout: i32,
    mean: f32,
    scale: f32,
    imsize: (i32, i32),
    min_confidence: f32,
}

impl PoseLandmarkClient {
    pub fn new(triton_infer_client: TritonInferenceClient, config: PoseModelConfig) -> Self {
        PoseLandmarkClient {
            triton_infer_client,
            model_name: config.model_name,
            input_name: config.input_name,
            output_name: config.output_name,
            timeout: config.timeout,
            mean: config.mean,
            scale: config.scale,
            imsize: config.imsize,
            min_confidence: config.min_confidence,
        }
    }

    pub async fn is_ready(&self) -> Result<bool, Error> {
        self.triton_infer_client.is_server_live().await
    }

    /// preprocess resizes the input image onto the model canvas (aspect ratio
    /// preserved, remainder zero padded), normalizes pixels and lays the tensor
    /// out as NCHW. Also returns the per-axis factors needed to map model-space
    /// coordinates back onto the original image.
    fn preprocess(&self, img: &Mat) -> Result<(Array4<f32>, (f32, f32)), Error> {
        let img_h = img.rows();
        let img_w = img.cols();
        if img_h == 0 || img_w == 0 {
            return Err(Error::msg("pose_landmark_client - input image is empty"));
        }

        let (canvas_w, canvas_h) = self.imsize;
        let im_ratio = img_w as f32 / img_h as f32;
        let model_ratio = canvas_w as f32 / canvas_h as f32;

        let (new_width, new_height) = if im_ratio > model_ratio {
            let new_width = canvas_w;
            let new_height = (new_width as f32 / im_ratio) as i32;
            (new_width, new_height)
        } else {
            let new_height = canvas_h;
            let new_width = (new_height as f32 * im_ratio) as i32;
            (new_width, new_height)
        };

        let mut img_resized = Mat::default();
        resize(
            img,
            &mut img_resized,
            Size::new(new_width, new_height),
            0.0,
            0.0,
            imgproc::INTER_LINEAR,
        )?;

        let mut img_scaled =
            Mat::new_rows_cols_with_default(canvas_h, canvas_w, CV_8UC3, Scalar::all(0.0))?;
        let mut roi = Mat::roi_mut(&mut img_scaled, Rect::new(0, 0, new_width, new_height))?;
        img_resized.copy_to(&mut roi)?;

        let mut im_tensor =
            Array3::<f32>::zeros((canvas_h as usize, canvas_w as usize, 3usize));

        // Convert the image to float and normalize it
        for i in 0..3 {
            for y in 0..canvas_h as usize {
                for x in 0..canvas_w as usize {
                    let pixel_value = img_scaled.at_2d::<Vec3b>(y as i32, x as i32)?[i];
                    im_tensor[[y, x, i]] = (pixel_value as f32 - self.mean) * self.scale;
                }
            }
        }

        let transposed_tensors = im_tensor.permuted_axes([2, 0, 1]);
        let letterbox_scale = (
            canvas_w as f32 / new_width as f32,
            canvas_h as f32 / new_height as f32,
        );

        Ok((transposed_tensors.insert_axis(Axis(0)), letterbox_scale))
    }

    /// postprocess turns the raw keypoint tensor into the seven named posture
    /// landmarks, undoing the letterbox so coordinates are normalized to the
    /// original image. Returns None when the detection confidence over the
    /// required keypoints falls below the configured minimum.
    fn postprocess(
        &self,
        keypoints: &Array2<f32>,
        letterbox_scale: (f32, f32),
    ) -> Option<PostureLandmarks> {
        let mean_score = REQUIRED_LANDMARKS
            .iter()
            .map(|&idx| keypoints[[idx, 2]])
            .sum::<f32>()
            / REQUIRED_LANDMARKS.len() as f32;

        if mean_score < self.min_confidence {
            return None;
        }

        let point = |idx: usize| -> Coordinate2D {
            Coordinate2D::new(
                (keypoints[[idx, 0]] * letterbox_scale.0).clamp(0.0, 1.0),
                (keypoints[[idx, 1]] * letterbox_scale.1).clamp(0.0, 1.0),
            )
        };

        Some(PostureLandmarks {
            left_shoulder: point(LEFT_SHOULDER),
            right_shoulder: point(RIGHT_SHOULDER),
            left_ear: point(LEFT_EAR),
            right_ear: point(RIGHT_EAR),
            left_hip: point(LEFT_HIP),
            right_hip: point(RIGHT_HIP),
            nose: point(NOSE),
        })
    }

    /// detect_landmarks runs one inference round trip against the pose model
    /// and extracts the posture landmarks from its keypoint output.
    ///
    /// # Arguments
    /// * `img` - RGB OpenCV matrix
    ///
    /// # Returns
    /// * `Result<Option<PostureLandmarks>, Error>` - None when no pose was detected
    pub async fn detect_landmarks(&self, img: &Mat) -> Result<Option<PostureLandmarks>, Error> {
        let (input_tensor, letterbox_scale) = self.preprocess(img)?;

        let sub_tensor: Vec<f32> = input_tensor.iter().copied().collect();
        let model_input = InferInputTensor {
            name: self.input_name.to_string(),
            datatype: "FP32".to_string(),
            shape: input_tensor.shape().iter().map(|&x| x as i64).collect(),
            parameters: Default::default(),
            contents: Option::from(InferTensorContents {
                bool_contents: vec![],
                int_contents: vec![],
                int64_contents: vec![],
                uint_contents: vec![],
                uint64_contents: vec![],
                fp32_contents: sub_tensor,
                fp64_contents: vec![],
                bytes_contents: vec![],
            }),
        };

        let model_request = ModelInferRequest {
            model_name: self.model_name.to_owned(),
            model_version: "".to_string(),
            id: "".to_string(),
            parameters: Default::default(),
            inputs: vec![model_input],
            outputs: Default::default(),
            raw_input_contents: vec![],
        };

        let result = self.triton_infer_client.model_infer(model_request).await?;

        let oidx = result
            .outputs
            .iter()
            .position(|output| output.name == self.output_name)
            .unwrap_or(0);
        let output = result.outputs.get(oidx).ok_or_else(|| {
            Error::msg("pose_landmark_client - pose model returned no outputs")
        })?;

        let f_vec: Vec<f32> = if oidx < result.raw_output_contents.len() {
            u8_to_f32_vec(&result.raw_output_contents[oidx])
        } else {
            output
                .contents
                .clone()
                .map(|contents| contents.fp32_contents)
                .unwrap_or_default()
        };

        let dims: Vec<usize> = output.shape.iter().map(|&dim| dim as usize).collect();
        if dims.len() < 2 {
            return Err(Error::msg(
                "pose_landmark_client - unexpected keypoint tensor rank",
            ));
        }
        let num_keypoints = dims[dims.len() - 2];
        let num_channels = dims[dims.len() - 1];
        if num_channels < 3 || num_keypoints <= RIGHT_HIP {
            return Err(Error::msg(
                "pose_landmark_client - keypoint tensor too small for posture landmarks",
            ));
        }
        if f_vec.len() != num_keypoints * num_channels {
            return Err(Error::msg(
                "pose_landmark_client - keypoint tensor shape does not match payload",
            ));
        }

        let keypoints = Array2::from_shape_vec((num_keypoints, num_channels), f_vec)?;

        Ok(self.postprocess(&keypoints, letterbox_scale))
    }
}
