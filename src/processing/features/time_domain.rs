//! Time domain amplitude features

/// Root mean square; `None` for an empty slice
pub fn rms(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    let sum_squares: f64 = data.iter().map(|&x| x * x).sum();
    Some((sum_squares / data.len() as f64).sqrt())
}

/// Mean absolute value; `None` for an empty slice
pub fn mav(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().map(|&x| x.abs()).sum::<f64>() / data.len() as f64)
}
