/// Tick positions at 1, 2, 2.5 or 5 x 10^k inside `lo..=hi`, at most
/// `max_ticks` of them
pub fn nice_ticks(lo: f64, hi: f64, max_ticks: usize) -> Vec<f64> {
    if !(lo.is_finite() && hi.is_finite()) || max_ticks < 2 {
        return Vec::new();
    }
    if hi <= lo {
        return vec![lo];
    }

    let step = nice_step(lo, hi, max_ticks);
    let first = (lo / step).ceil();
    let last = (hi / step).floor();
    let mut ticks = Vec::new();
    let mut i = first;
    while i <= last {
        // snap away float noise such as 0.30000000000000004
        let t = (i * step * 1e9).round() / 1e9;
        ticks.push(if t == 0.0 { 0.0 } else { t });
        i += 1.0;
    }
    ticks
}

/// Step between ticks chosen by [`nice_ticks`]
pub fn nice_step(lo: f64, hi: f64, max_ticks: usize) -> f64 {
    let raw = (hi - lo) / (max_ticks.max(2) - 1) as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|&s| s >= raw)
        .unwrap_or(10.0 * magnitude)
}

/// Tick label with only the decimals the step needs
pub fn format_tick(value: f64, step: f64) -> String {
    let decimals = (0usize..=6)
        .find(|&d| {
            let scaled = step * 10f64.powi(d as i32);
            (scaled - scaled.round()).abs() < 1e-6
        })
        .unwrap_or(6);
    format!("{:.*}", decimals, value)
}
