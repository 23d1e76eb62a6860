use ratatui::text::Line;

const MIN_BAR: usize = 3;

/// One line per value: name, count and a bar scaled to half of `width`.
///
/// `ranked` must already be ordered by count descending.
pub fn string_count_lines(ranked: &[(String, usize)], width: u16) -> Vec<Line<'static>> {
    let Some((_, max_count)) = ranked.first() else {
        return vec![Line::raw("No string values found.")];
    };
    let bar_width = width as usize / 2;
    ranked
        .iter()
        .map(|(value, count)| {
            let length = ((*count as f64 / *max_count as f64) * bar_width as f64) as usize;
            Line::raw(format!(
                "{:<20} {:>5} {}",
                value,
                count,
                "█".repeat(length.max(MIN_BAR))
            ))
        })
        .collect()
}
