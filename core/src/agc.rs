/// Per-segment automatic gain correction.
///
/// Walks the window tracking the up-trend and down-trend peaks between
/// consecutive zero crossings. At each crossing, if the peak-to-peak span
/// since the last crossing exceeds `threshold`, every sample of that segment
/// is rescaled by `32768 / max(|up|, |down|)` so the dominant peak reaches
/// full scale. Gain is corrected segment by segment, which tracks amplitude
/// drift inside a single frame without a calibration pass. Segments below
/// the threshold are left alone rather than amplifying noise.
pub fn normalize(window: &mut [i16], threshold: i16) {
    let mut up_trend = false;
    let mut down_trend = false;
    let mut up_peak: i16 = 0;
    let mut down_peak: i16 = 0;
    let mut segment_start = 0usize;

    for i in 1..window.len() {
        if window[i] > window[i - 1] {
            up_trend = true;
            if window[i] > up_peak {
                up_peak = window[i];
            }
        } else if window[i] < window[i - 1] {
            down_trend = true;
            if window[i] < down_peak {
                down_peak = window[i];
            }
        }

        // Sign change closes the segment
        if (window[i] as i32) * (window[i - 1] as i32) < 0 {
            if up_trend && down_trend {
                let span = up_peak as i32 - down_peak as i32;
                if span > threshold as i32 {
                    let peak = (up_peak as i32).abs().max((down_peak as i32).abs());
                    if peak > 0 {
                        let gain = 32768.0 / peak as f32;
                        for s in &mut window[segment_start..=i] {
                            let scaled = (*s as f32 * gain).round();
                            *s = scaled.clamp(i16::MIN as f32, i16::MAX as f32) as i16;
                        }
                    }
                }
                segment_start = i + 1;
                up_trend = false;
                down_trend = false;
                up_peak = 0;
                down_peak = 0;
            }
        }
    }
}
