/// Backing-store size for a canvas filling a `width` x `height` CSS area.
///
/// The canvas is drawn at one device pixel per CSS pixel. Returns `None`
/// while the area is collapsed (minimised tab, hidden iframe) so callers
/// keep their last valid size.
pub fn backing_size(width: f64, height: f64) -> Option<(u32, u32)> {
    if !width.is_finite() || !height.is_finite() {
        return None;
    }
    let w = width.round();
    let h = height.round();
    if w < 1.0 || h < 1.0 {
        return None;
    }
    Some((w.min(u32::MAX as f64) as u32, h.min(u32::MAX as f64) as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backing_size_rounds() {
        assert_eq!(backing_size(1280.4, 719.6), Some((1280, 720)));
    }

    #[test]
    fn test_backing_size_rejects_empty() {
        assert_eq!(backing_size(0.0, 600.0), None);
        assert_eq!(backing_size(800.0, 0.2), None);
        assert_eq!(backing_size(-5.0, 10.0), None);
    }

    #[test]
    fn test_backing_size_rejects_nan() {
        assert_eq!(backing_size(f64::NAN, 10.0), None);
        assert_eq!(backing_size(10.0, f64::INFINITY), None);
    }
}
