//! Renders an open form: each group's mode selector followed by its visible sections.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, BorderType, Borders, Widget},
};

use crate::config::Theme;
use crate::form_modal::FormFocus;
use crate::forms::FormState;
use crate::visibility::Section;
use crate::widgets::radio_block::RadioBlock;

const SECTION_HEIGHT: u16 = 3;

enum Row {
    Selector(usize),
    Section(usize, usize),
}

pub struct FormView<'a> {
    pub state: &'a mut FormState,
    pub focus: FormFocus,
    pub theme: &'a Theme,
    pub radio_columns: usize,
}

impl FormView<'_> {
    fn rows(&self) -> Vec<(Row, u16)> {
        let mut rows = Vec::new();
        for (g, def) in self.state.spec().groups.iter().enumerate() {
            rows.push((
                Row::Selector(g),
                RadioBlock::height(def.modes.len(), self.radio_columns),
            ));
            for (i, section) in self.state.controller().sections(&def.name).iter().enumerate() {
                if section.is_visible() {
                    rows.push((Row::Section(g, i), SECTION_HEIGHT));
                }
            }
        }
        rows
    }
}

impl Widget for FormView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = self.rows();
        let mut constraints: Vec<Constraint> =
            rows.iter().map(|(_, h)| Constraint::Length(*h)).collect();
        constraints.push(Constraint::Fill(1));
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let border = self.theme.get("border");
        let active = self.theme.get("active");

        for ((row, _), chunk) in rows.iter().zip(chunks.iter()) {
            match *row {
                Row::Selector(g) => {
                    let Some(def) = self.state.group_def(g) else {
                        continue;
                    };
                    let labels: Vec<&str> = def.modes.iter().map(|m| m.display_label()).collect();
                    let selected = self.state.controller().active_index(&def.name);
                    RadioBlock::new(
                        def.display_label(),
                        &labels,
                        selected,
                        self.focus == FormFocus::Group(g),
                        self.radio_columns,
                        border,
                        active,
                    )
                    .render(*chunk, buf);
                }
                Row::Section(g, i) => {
                    let focused = self.focus == FormFocus::Section { group: g, index: i };
                    let Some(section) = self.state.section_mut(g, i) else {
                        continue;
                    };
                    let block = Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Plain)
                        .border_style(Style::default().fg(if focused { active } else { border }))
                        .title(format!(" {} ", section.label));
                    let inner = block.inner(*chunk);
                    block.render(*chunk, buf);
                    section.input.set_focused(focused);
                    (&section.input).render(inner, buf);
                }
            }
        }
    }
}
