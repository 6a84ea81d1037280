/// d3's default transition easing.
pub fn ease_cubic_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

pub fn transition_progress(started_at: f64, now: f64, duration: f64) -> f32 {
    if duration <= 0.0 {
        return 1.0;
    }
    ((now - started_at) / duration).clamp(0.0, 1.0) as f32
}

/// Shortens `text` to `max_chars` characters, marking the cut with an ellipsis.
pub fn truncate_label(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let mut shortened = text
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect::<String>();
    shortened.push('…');
    shortened
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_hits_endpoints_and_midpoint() {
        assert_eq!(ease_cubic_in_out(0.0), 0.0);
        assert_eq!(ease_cubic_in_out(1.0), 1.0);
        assert!((ease_cubic_in_out(0.5) - 0.5).abs() < 1e-6);
        assert!(ease_cubic_in_out(0.25) < 0.25);
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(transition_progress(1.0, 0.5, 0.75), 0.0);
        assert_eq!(transition_progress(1.0, 3.0, 0.75), 1.0);
        assert_eq!(transition_progress(1.0, 3.0, 0.0), 1.0);
    }

    #[test]
    fn labels_are_truncated_on_char_boundaries() {
        assert_eq!(truncate_label("Engineering", 40), "Engineering");
        assert_eq!(truncate_label("Ünïcödé names", 6), "Ünïcö…");
    }
}
