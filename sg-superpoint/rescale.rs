use sg_core::{ImageSize, Keypoint};

/// Map a point from `from` pixel space to `to` pixel space.
#[inline]
pub fn rescale_point(x: f32, y: f32, from: ImageSize, to: ImageSize) -> (f32, f32) {
    (
        x * to.width as f32 / from.width as f32,
        y * to.height as f32 / from.height as f32,
    )
}

/// Rescale every keypoint in place, confidences untouched.
pub fn rescale_keypoints(keypoints: &mut [Keypoint], from: ImageSize, to: ImageSize) {
    if from == to {
        return;
    }
    for kp in keypoints.iter_mut() {
        let (x, y) = rescale_point(kp.x, kp.y, from, to);
        kp.x = x;
        kp.y = y;
    }
}
