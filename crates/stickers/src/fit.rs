//! Label font size search

/// Find the largest font size whose text width fits `max_width`
///
/// Starts at `ceiling` and steps down by `step` while the text is too wide,
/// stopping at `floor`. Text that does not fit even at `floor` is drawn at
/// `floor`.
///
/// # Arguments
/// * `width_at` - Text width in points at a given font size
/// * `max_width` - Maximum text width in points
/// * `ceiling` - Starting (largest) font size
/// * `floor` - Smallest font size
/// * `step` - Decrement per iteration; must be positive
pub fn fit_font_size<F>(width_at: F, max_width: f64, ceiling: f32, floor: f32, step: f32) -> f32
where
    F: Fn(f32) -> f64,
{
    if ceiling <= floor {
        return floor;
    }
    if step <= 0.0 {
        return if width_at(ceiling) <= max_width { ceiling } else { floor };
    }

    let mut size = ceiling;
    while width_at(size) > max_width && size > floor {
        size -= step;
    }

    size.max(floor)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Width proportional to size, like any real font
    fn linear(units: f64) -> impl Fn(f32) -> f64 {
        move |size| units * size as f64
    }

    #[test]
    fn test_short_text_keeps_ceiling() {
        assert_eq!(fit_font_size(linear(10.0), 130.0, 9.0, 5.0, 0.5), 9.0);
    }

    #[test]
    fn test_steps_down_until_fit() {
        // 20 * 6.5 = 130 fits, 20 * 7 = 140 does not
        assert_eq!(fit_font_size(linear(20.0), 130.0, 9.0, 5.0, 0.5), 6.5);
    }

    #[test]
    fn test_exact_fit_is_accepted() {
        assert_eq!(fit_font_size(linear(10.0), 90.0, 9.0, 5.0, 0.5), 9.0);
    }

    #[test]
    fn test_never_below_floor() {
        assert_eq!(fit_font_size(linear(1000.0), 130.0, 9.0, 5.0, 0.5), 5.0);
        // Step that overshoots the floor is clamped
        assert_eq!(fit_font_size(linear(1000.0), 130.0, 9.0, 5.0, 3.0), 5.0);
    }

    #[test]
    fn test_monotonic_in_text_width() {
        let mut previous = f32::MAX;
        for units in (1..200).map(|u| u as f64) {
            let size = fit_font_size(linear(units), 130.0, 9.0, 5.0, 0.5);
            assert!(size <= previous);
            assert!((5.0..=9.0).contains(&size));
            previous = size;
        }
    }

    #[test]
    fn test_degenerate_parameters() {
        assert_eq!(fit_font_size(linear(1.0), 10.0, 9.0, 5.0, 0.0), 9.0);
        assert_eq!(fit_font_size(linear(2.0), 10.0, 9.0, 5.0, 0.0), 5.0);
        assert_eq!(fit_font_size(linear(1.0), 10.0, 4.0, 5.0, 0.5), 5.0);
    }
}
