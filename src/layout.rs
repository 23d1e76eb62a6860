use ratatui::layout::{Constraint, Layout, Rect};

/// Top-level layout: header, main view, control bar, optional debug row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
    pub header: Rect,
    pub main_view: Rect,
    pub control_bar: Rect,
    pub debug: Option<Rect>,
}

/// Single-row header and control bar around a filling main view; the debug
/// row, when enabled, sits below the controls.
pub fn app_layout(area: Rect, debug_enabled: bool) -> AppLayout {
    let debug_rows = u16::from(debug_enabled);
    let [header, main_view, control_bar, debug] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(debug_rows),
    ])
    .areas(area);

    AppLayout {
        header,
        main_view,
        control_bar,
        debug: debug_enabled.then_some(debug),
    }
}

/// Number of panel columns that fit in `width`; never less than one.
pub fn grid_columns(width: u16, panel_width: u16) -> usize {
    if panel_width == 0 {
        return 1;
    }
    usize::from(width / panel_width).max(1)
}

/// Rect for grid cell `(row, col)` relative to the first visible row.
pub fn panel_rect(area: Rect, col: usize, visible_row: usize, panel_width: u16, panel_height: u16) -> Option<Rect> {
    let x = area.x as usize + col * panel_width as usize;
    let y = area.y as usize + visible_row * panel_height as usize;
    let right = (area.x + area.width) as usize;
    let bottom = (area.y + area.height) as usize;
    if x >= right || y >= bottom {
        return None;
    }
    Some(Rect {
        x: x as u16,
        y: y as u16,
        width: (panel_width as usize).min(right - x) as u16,
        height: (panel_height as usize).min(bottom - y) as u16,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_layout_minimal() {
        let area = Rect::new(0, 0, 100, 50);
        let layout = app_layout(area, false);

        assert_eq!(layout.header.height, 1);
        assert_eq!(layout.main_view.y, 1);
        assert_eq!(layout.main_view.height, 48);
        assert_eq!(layout.control_bar.y, 49);
        assert_eq!(layout.debug, None);
    }

    #[test]
    fn test_app_layout_with_debug() {
        let area = Rect::new(0, 0, 100, 50);
        let layout = app_layout(area, true);

        assert_eq!(layout.main_view.height, 47);
        assert_eq!(layout.control_bar.y, 48);
        let debug = layout.debug.unwrap();
        assert_eq!(debug.height, 1);
        assert_eq!(debug.y, 49);
    }

    #[test]
    fn test_grid_columns() {
        assert_eq!(grid_columns(200, 60), 3);
        assert_eq!(grid_columns(59, 60), 1);
        assert_eq!(grid_columns(0, 60), 1);
        assert_eq!(grid_columns(80, 0), 1);
    }

    #[test]
    fn test_panel_rect_clips_to_area() {
        let area = Rect::new(0, 2, 100, 30);
        assert_eq!(panel_rect(area, 1, 0, 60, 14), Some(Rect::new(60, 2, 40, 14)));
        assert_eq!(panel_rect(area, 0, 2, 60, 14), Some(Rect::new(0, 30, 60, 2)));
        assert_eq!(panel_rect(area, 0, 3, 60, 14), None);
        assert_eq!(panel_rect(area, 2, 0, 60, 14), None);
    }
}
