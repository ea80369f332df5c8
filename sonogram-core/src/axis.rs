// ── Time axis ─────────────────────────────────────────────────────────────

/// Nice 1-2-5 progression of tick intervals in seconds, from 1 ms to 10 min.
const TICK_INTERVALS: &[f64] = &[
    0.001, 0.002, 0.005,            // 1–5 ms
    0.01, 0.02, 0.05,               // 10–50 ms
    0.1, 0.2, 0.5,                  // 100–500 ms
    1.0, 2.0, 5.0,                  // 1–5 s
    10.0, 30.0, 60.0,               // 10 s – 1 min
    120.0, 300.0, 600.0,            // 2–10 min
];

/// Smallest nice interval giving at most `max_ticks` ticks over `duration`.
pub fn time_tick_interval(duration: f64, max_ticks: usize) -> f64 {
    let min_interval = duration / max_ticks.max(1) as f64;
    TICK_INTERVALS
        .iter()
        .copied()
        .find(|&i| i >= min_interval)
        .unwrap_or(TICK_INTERVALS[TICK_INTERVALS.len() - 1])
}

/// Format a time value as a compact label whose precision matches the tick interval.
pub fn format_time_label(seconds: f64, interval: f64) -> String {
    if interval < 1.0 {
        let ms = seconds * 1000.0;
        if interval >= 0.01 {
            format!("{:.0}ms", ms)
        } else {
            format!("{:.1}ms", ms)
        }
    } else if interval < 60.0 {
        if (seconds - seconds.round()).abs() < 0.001 {
            format!("{:.0}s", seconds)
        } else {
            format!("{:.1}s", seconds)
        }
    } else {
        let mins = (seconds / 60.0).floor() as u32;
        let secs = (seconds % 60.0).round() as u32;
        if secs == 0 {
            format!("{}m", mins)
        } else {
            format!("{}m{:02}s", mins, secs)
        }
    }
}

// ── Frequency axis ────────────────────────────────────────────────────────

/// Label for a log-axis frequency tick: `"500 Hz"`, `"2 kHz"`, `"1.5 kHz"`.
pub fn format_freq_label(freq_hz: f64) -> String {
    if freq_hz >= 1000.0 {
        let khz = (freq_hz / 100.0).round() / 10.0;
        format!("{} kHz", khz)
    } else {
        format!("{:.0} Hz", freq_hz)
    }
}

// ── Colour bar ────────────────────────────────────────────────────────────

/// Signed whole-decibel label, `"+0 dB"`, `"-40 dB"`.
pub fn format_db_label(db: f64) -> String {
    let db = if db.abs() < 0.5 { 0.0 } else { db };
    format!("{:+.0} dB", db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_interval_for_tick_budget() {
        assert_eq!(time_tick_interval(2.0, 10), 0.2);
        assert_eq!(time_tick_interval(2.0, 4), 0.5);
        assert_eq!(time_tick_interval(180.0, 8), 30.0);
        assert_eq!(time_tick_interval(1e6, 8), 600.0);
    }

    #[test]
    fn time_labels_follow_interval_precision() {
        assert_eq!(format_time_label(0.25, 0.05), "250ms");
        assert_eq!(format_time_label(0.0025, 0.001), "2.5ms");
        assert_eq!(format_time_label(2.0, 1.0), "2s");
        assert_eq!(format_time_label(2.5, 1.0), "2.5s");
        assert_eq!(format_time_label(120.0, 60.0), "2m");
        assert_eq!(format_time_label(150.0, 120.0), "2m30s");
    }

    #[test]
    fn frequency_labels() {
        assert_eq!(format_freq_label(500.0), "500 Hz");
        assert_eq!(format_freq_label(2000.0), "2 kHz");
        assert_eq!(format_freq_label(1500.0), "1.5 kHz");
    }

    #[test]
    fn db_labels_are_signed() {
        assert_eq!(format_db_label(0.0), "+0 dB");
        assert_eq!(format_db_label(-0.2), "+0 dB");
        assert_eq!(format_db_label(-40.0), "-40 dB");
    }
}
