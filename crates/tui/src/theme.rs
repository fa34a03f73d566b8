use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
};
use sgadmin_core::resource::NoticeLevel;

#[derive(Debug, Clone)]
pub(crate) struct Theme {
    pub primary_fg: Color,
    pub accent: Color,
    pub muted: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
    pub success: Color,
    pub warning: Color,
    pub danger: Color,
    pub on_accent: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            selection_fg: Color::White,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
            on_accent: Color::Black,
        }
    }
}

impl Theme {
    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .bg(self.selection_bg)
            .fg(self.selection_fg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn notice(&self, level: NoticeLevel) -> Style {
        let color = match level {
            NoticeLevel::Info => self.primary_fg,
            NoticeLevel::Success => self.success,
            NoticeLevel::Error => self.danger,
        };
        Style::default().fg(color)
    }

    pub fn key_hint(&self) -> Style {
        Style::default()
            .fg(self.on_accent)
            .bg(self.accent)
            .add_modifier(Modifier::BOLD)
    }
}

pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

pub(crate) fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_clamped_to_area() {
        let area = Rect::new(0, 0, 40, 10);
        assert_eq!(centered_rect(20, 4, area), Rect::new(10, 3, 20, 4));
        assert_eq!(centered_rect(80, 40, area), area);
    }

    #[test]
    fn hit_test_excludes_far_edges() {
        let area = Rect::new(5, 5, 10, 4);
        assert!(contains(area, 5, 5));
        assert!(contains(area, 14, 8));
        assert!(!contains(area, 15, 8));
        assert!(!contains(area, 4, 6));
    }
}
