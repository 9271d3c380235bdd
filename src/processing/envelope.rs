// src/processing/envelope.rs
//! Moving RMS amplitude envelope
//!
//! The envelope uses a trailing window: `output[i]` is the RMS of
//! `samples[max(0, i - w + 1)..=i]`. The first `w - 1` outputs therefore use
//! a shorter, growing window, so the output always has the input's length.

use crate::channels::ms_to_samples;
use crate::config::constants::envelope::MIN_WINDOW_SAMPLES;

/// Window length in samples for a time window at a given sampling rate
pub fn window_samples(window_ms: f64, sampling_rate: f64) -> usize {
    ms_to_samples(window_ms, sampling_rate).max(MIN_WINDOW_SAMPLES)
}

/// Trailing moving RMS with the same length as the input
pub fn moving_rms(signal: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(MIN_WINDOW_SAMPLES);
    let mut output = Vec::with_capacity(signal.len());
    let mut sum_squares = 0.0;

    for (i, &sample) in signal.iter().enumerate() {
        sum_squares += sample * sample;
        if i >= window {
            let leaving = signal[i - window];
            sum_squares -= leaving * leaving;
        }
        let count = (i + 1).min(window) as f64;
        // Running subtraction can leave a tiny negative residue.
        output.push((sum_squares / count).max(0.0).sqrt());
    }

    output
}

/// Rectified copy of a signal, used for pre-processed activation traces
pub fn rectify(signal: &[f64]) -> Vec<f64> {
    signal.iter().map(|s| s.abs()).collect()
}
