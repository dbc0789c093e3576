use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    widgets::{Paragraph, Widget},
};

const SELECTOR_CONTROLS: [(&str, &str); 5] = [
    ("←→", "Mode"),
    ("Tab", "Next"),
    ("Enter", "Submit"),
    ("q", "Quit"),
    ("1-9", "Pick"),
];

const INPUT_CONTROLS: [(&str, &str); 4] = [
    ("Tab", "Next"),
    ("Esc", "Selector"),
    ("Enter", "Submit"),
    ("^C", "Quit"),
];

/// Key hints bar at the bottom of the screen
pub struct Controls {
    pub editing: bool,
    pub background: Color,
    pub key_color: Color,
    pub status: Option<String>,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            editing: false,
            background: Color::DarkGray,
            key_color: Color::White,
            status: None,
        }
    }
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_editing(mut self, editing: bool) -> Self {
        self.editing = editing;
        self
    }

    pub fn with_colors(mut self, background: Color, key_color: Color) -> Self {
        self.background = background;
        self.key_color = key_color;
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

impl Widget for &Controls {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let controls: &[(&str, &str)] = if self.editing {
            &INPUT_CONTROLS
        } else {
            &SELECTOR_CONTROLS
        };

        let mut constraints = controls.iter().fold(vec![], |mut acc, (key, action)| {
            acc.push(Constraint::Length(key.chars().count() as u16 + 2));
            acc.push(Constraint::Length(action.chars().count() as u16 + 1));
            acc
        });
        constraints.push(Constraint::Fill(1));

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);
        let base_style = Style::default();

        for (i, (key, action)) in controls.iter().enumerate() {
            let j = i * 2;
            Paragraph::new(*key)
                .style(base_style.fg(self.key_color).bold())
                .centered()
                .render(layout[j], buf);
            Paragraph::new(*action)
                .style(base_style.bg(self.background))
                .render(layout[j + 1], buf);
        }

        let status = self.status.as_deref().unwrap_or("");
        Paragraph::new(status)
            .style(base_style.bg(self.background))
            .right_aligned()
            .render(layout[controls.len() * 2], buf);
    }
}
