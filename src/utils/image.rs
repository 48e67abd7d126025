use anyhow::Error;
use opencv::core::{Mat, MatTraitConst};
use opencv::imgcodecs::{imdecode, IMREAD_COLOR};
use opencv::imgproc::{cvt_color, COLOR_BGR2RGB};

/// decode_rgb decodes an uploaded byte buffer into an RGB image matrix.
///
/// `imdecode` signals an undecodable buffer by returning an empty matrix, so
/// that case is turned into an error here instead of leaking downstream.
///
/// # Arguments
/// * `im_bytes` - &[u8]
///
/// # Returns
/// * `Result<Mat, Error>`
pub fn decode_rgb(im_bytes: &[u8]) -> Result<Mat, Error> {
    if im_bytes.is_empty() {
        return Err(Error::msg("image buffer is empty"));
    }

    let img_as_mat = Mat::from_slice(im_bytes)?;

    let img_bgr = imdecode(&img_as_mat, IMREAD_COLOR)?;
    if img_bgr.empty() {
        return Err(Error::msg("cannot decode image bytes"));
    }

    let mut img_rgb = Mat::default();
    cvt_color(&img_bgr, &mut img_rgb, COLOR_BGR2RGB, 0)?;

    Ok(img_rgb)
}
