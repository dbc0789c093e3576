use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use ratatui::widgets::{Block, BorderType, Borders};

pub mod cli;
pub mod config;
pub mod form_modal;
pub mod forms;
pub mod logging;
pub mod query;
pub mod visibility;
pub mod widgets;

pub use cli::Args;
pub use config::{AppConfig, ColorParser, ConfigManager, Theme};
pub use forms::{FormSpec, FormState};
pub use query::QueryParams;
pub use visibility::{GroupSpec, ModeSpec, Section, VisibilityController};

use form_modal::{FormFocus, FormModal};
use widgets::controls::Controls;
use widgets::debug::DebugState;
use widgets::form_view::FormView;
use widgets::text_input::TextInputEvent;

/// Application name used for config, cache and log paths
pub const APP_NAME: &str = "formvis";

/// Resolve the form to open (explicit name or the configured default) and
/// initialize it from an optional query string.
pub fn build_form(form: Option<&str>, query: Option<&str>, config: &AppConfig) -> Result<FormState> {
    let name = form.unwrap_or(config.display.default_form.as_str());
    let spec = forms::find_form(name, &config.forms)?;
    let params = query.map(QueryParams::parse).unwrap_or_default();
    FormState::from_params(spec, &params)
}

pub enum AppEvent {
    Key(KeyEvent),
    /// Mode picked on a group's selector: (group, mode)
    Select(String, String),
    Submit,
    Exit,
    Resize(u16, u16), // resized (width, height)
}

pub struct App {
    pub form: FormState,
    pub form_modal: FormModal,
    theme: Theme,
    debug: DebugState,
    radio_columns: usize,
    submitted: Option<QueryParams>,
}

impl App {
    pub fn new(form: FormState) -> App {
        Self::new_with_config(form, Theme::default(), &AppConfig::default())
    }

    pub fn new_with_config(
        mut form: FormState,
        theme: Theme,
        app_config: &AppConfig,
    ) -> App {
        form.apply_theme(&theme);
        let mut debug = DebugState::default();
        debug.enabled = app_config.debug.enabled;
        App {
            form,
            form_modal: FormModal::new(),
            theme,
            debug,
            radio_columns: app_config.display.radio_columns,
            submitted: None,
        }
    }

    pub fn enable_debug(&mut self) {
        self.debug.enabled = true;
    }

    /// Query produced by the last submit, if the user submitted the form.
    pub fn submitted(&self) -> Option<&QueryParams> {
        self.submitted.as_ref()
    }

    fn color(&self, name: &str) -> Color {
        self.theme.get(name)
    }

    fn select_event(&self, group: usize, mode: Option<String>) -> Option<AppEvent> {
        let def = self.form.group_def(group)?;
        mode.map(|mode| AppEvent::Select(def.name.clone(), mode))
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        if event.kind != KeyEventKind::Press {
            return None;
        }
        self.debug.on_key(event);

        if event.code == KeyCode::Char('c') && event.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(AppEvent::Exit);
        }

        match self.form_modal.focus {
            FormFocus::Group(group) => match event.code {
                KeyCode::Char('q') | KeyCode::Esc => Some(AppEvent::Exit),
                KeyCode::Enter => Some(AppEvent::Submit),
                KeyCode::Tab | KeyCode::Down | KeyCode::Char('j') => {
                    self.form_modal.next_focus(&self.form);
                    None
                }
                KeyCode::BackTab | KeyCode::Up | KeyCode::Char('k') => {
                    self.form_modal.prev_focus(&self.form);
                    None
                }
                KeyCode::Left | KeyCode::Char('h') => {
                    let mode = self.form.adjacent_mode(group, false);
                    self.select_event(group, mode)
                }
                KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
                    let mode = self.form.adjacent_mode(group, true);
                    self.select_event(group, mode)
                }
                KeyCode::Char(c @ '1'..='9') => {
                    let idx = c as usize - '1' as usize;
                    let mode = self
                        .form
                        .group_def(group)
                        .and_then(|def| def.modes.get(idx))
                        .map(|m| m.name.clone());
                    self.select_event(group, mode)
                }
                _ => None,
            },
            FormFocus::Section { group, index } => match event.code {
                KeyCode::Tab | KeyCode::Down => {
                    self.form_modal.next_focus(&self.form);
                    None
                }
                KeyCode::BackTab | KeyCode::Up => {
                    self.form_modal.prev_focus(&self.form);
                    None
                }
                _ => {
                    let section = self.form.section_mut(group, index)?;
                    match section.input.handle_key(event) {
                        TextInputEvent::Submit => Some(AppEvent::Submit),
                        TextInputEvent::Cancel => {
                            self.form_modal.focus_group();
                            None
                        }
                        TextInputEvent::Edited => {
                            self.debug.last_action = format!("edit {}", section.field);
                            None
                        }
                        TextInputEvent::None => None,
                    }
                }
            },
        }
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Select(group, mode) => {
                if self.form.select(group, mode) {
                    self.debug.last_action = format!("select {}={}", group, mode);
                }
                self.form_modal.revalidate(&self.form);
                None
            }
            AppEvent::Submit => {
                let query = self.form.to_query();
                tracing::info!(query = %query.encode(), "form submitted");
                self.submitted = Some(query);
                Some(AppEvent::Exit)
            }
            AppEvent::Resize(_, _) | AppEvent::Exit => None,
        }
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;

        let mut constraints = vec![Constraint::Fill(1), Constraint::Length(1)];
        if self.debug.enabled {
            constraints.push(Constraint::Length(1));
        }
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let frame = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.color("primary")))
            .title(format!(" {} ", self.form.spec().display_title()))
            .title_style(
                Style::default()
                    .fg(self.color("primary"))
                    .add_modifier(Modifier::BOLD),
            );
        let body = frame.inner(layout[0]);
        frame.render(layout[0], buf);

        let editing = matches!(self.form_modal.focus, FormFocus::Section { .. });
        FormView {
            state: &mut self.form,
            focus: self.form_modal.focus,
            theme: &self.theme,
            radio_columns: self.radio_columns,
        }
        .render(body, buf);

        let preview = format!("?{} ", self.form.to_query().encode());
        (&Controls::new()
            .with_editing(editing)
            .with_colors(self.color("controls_bg"), self.color("primary"))
            .with_status(preview))
            .render(layout[1], buf);

        if self.debug.enabled && layout.len() > 2 {
            (&self.debug).render(layout[2], buf);
        }
    }
}
