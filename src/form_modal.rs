//! Keyboard focus over an open form: mode selectors and visible sections.

use crate::forms::FormState;
use crate::visibility::Section;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFocus {
    /// Mode selector of the group at this index
    Group(usize),
    /// Section `index` of group `group`
    Section { group: usize, index: usize },
}

impl Default for FormFocus {
    fn default() -> Self {
        FormFocus::Group(0)
    }
}

impl FormFocus {
    pub fn group(&self) -> usize {
        match *self {
            FormFocus::Group(group) => group,
            FormFocus::Section { group, .. } => group,
        }
    }
}

#[derive(Default)]
pub struct FormModal {
    pub focus: FormFocus,
}

impl FormModal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Focus stops in form order: each group's selector, then its visible sections.
    pub fn focus_targets(state: &FormState) -> Vec<FormFocus> {
        let mut targets = Vec::new();
        for (group, def) in state.spec().groups.iter().enumerate() {
            targets.push(FormFocus::Group(group));
            for (index, section) in state.controller().sections(&def.name).iter().enumerate() {
                if section.is_visible() {
                    targets.push(FormFocus::Section { group, index });
                }
            }
        }
        targets
    }

    /// Position of the current focus; a section that was hidden in the meantime
    /// resolves to its group's selector.
    fn position(&self, targets: &[FormFocus]) -> Option<usize> {
        targets.iter().position(|t| *t == self.focus).or_else(|| {
            targets
                .iter()
                .position(|t| *t == FormFocus::Group(self.focus.group()))
        })
    }

    pub fn next_focus(&mut self, state: &FormState) {
        let targets = Self::focus_targets(state);
        if targets.is_empty() {
            return;
        }
        let next = match self.position(&targets) {
            Some(pos) => (pos + 1) % targets.len(),
            None => 0,
        };
        self.focus = targets[next];
    }

    pub fn prev_focus(&mut self, state: &FormState) {
        let targets = Self::focus_targets(state);
        if targets.is_empty() {
            return;
        }
        let prev = match self.position(&targets) {
            Some(pos) => (pos + targets.len() - 1) % targets.len(),
            None => targets.len() - 1,
        };
        self.focus = targets[prev];
    }

    /// Move focus back to the selector of the focused group.
    pub fn focus_group(&mut self) {
        self.focus = FormFocus::Group(self.focus.group());
    }

    /// Keep focus on something that is still visible after a mode change.
    pub fn revalidate(&mut self, state: &FormState) {
        let targets = Self::focus_targets(state);
        if !targets.contains(&self.focus) {
            self.focus_group();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{report_form, reservations_form};
    use crate::query::QueryParams;

    fn state(spec: crate::forms::FormSpec) -> FormState {
        FormState::from_params(spec, &QueryParams::new()).unwrap()
    }

    #[test]
    fn test_focus_targets_follow_visibility() {
        let mut form = state(report_form());
        assert_eq!(
            FormModal::focus_targets(&form),
            vec![
                FormFocus::Group(0),
                FormFocus::Section { group: 0, index: 0 },
                FormFocus::Section { group: 0, index: 1 },
            ]
        );
        form.select("reportPeriod", "yearly");
        assert_eq!(
            FormModal::focus_targets(&form),
            vec![FormFocus::Group(0), FormFocus::Section { group: 0, index: 1 }]
        );
    }

    #[test]
    fn test_next_and_prev_wrap() {
        let form = state(reservations_form());
        let mut modal = FormModal::new();
        modal.next_focus(&form);
        assert_eq!(modal.focus, FormFocus::Section { group: 0, index: 0 });
        modal.next_focus(&form);
        assert_eq!(modal.focus, FormFocus::Group(1));

        let mut modal = FormModal::new();
        modal.prev_focus(&form);
        assert_eq!(modal.focus, FormFocus::Section { group: 2, index: 0 });
    }

    #[test]
    fn test_revalidate_after_section_hidden() {
        let mut form = state(report_form());
        let mut modal = FormModal::new();
        modal.focus = FormFocus::Section { group: 0, index: 0 };
        form.select("reportPeriod", "custom");
        modal.revalidate(&form);
        assert_eq!(modal.focus, FormFocus::Group(0));
        modal.next_focus(&form);
        assert_eq!(modal.focus, FormFocus::Section { group: 0, index: 2 });
    }
}
