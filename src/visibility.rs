//! Table-driven visibility for mutually exclusive form modes.
//!
//! A field group declares an ordered list of modes. Each mode names the
//! section indices that are visible while it is active; every other section
//! of the group is hidden. The first declared mode is the group's default and
//! is used whenever an initial value is missing or unknown.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::collections::{BTreeSet, HashMap};

use crate::query::QueryParams;

/// A region of the form that is shown or hidden as a unit.
pub trait Section {
    fn show(&mut self);
    fn hide(&mut self);
    fn is_visible(&self) -> bool;
}

/// One selectable mode and the section indices it makes visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeSpec {
    pub name: String,
    pub visible: Vec<usize>,
}

impl ModeSpec {
    pub fn new(name: impl Into<String>, visible: impl IntoIterator<Item = usize>) -> Self {
        Self {
            name: name.into(),
            visible: visible.into_iter().collect(),
        }
    }
}

/// Static description of a field group: its name and its modes in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    pub name: String,
    pub modes: Vec<ModeSpec>,
}

impl GroupSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modes: Vec::new(),
        }
    }

    pub fn with_mode(
        mut self,
        name: impl Into<String>,
        visible: impl IntoIterator<Item = usize>,
    ) -> Self {
        self.modes.push(ModeSpec::new(name, visible));
        self
    }
}

struct Mode {
    name: String,
    visible: BTreeSet<usize>,
}

struct Group<S> {
    name: String,
    modes: Vec<Mode>,
    sections: Vec<S>,
    active: Option<usize>,
}

impl<S: Section> Group<S> {
    fn mode_index(&self, name: &str) -> Option<usize> {
        self.modes.iter().position(|m| m.name == name)
    }

    fn initialize(&mut self, external: Option<&str>) {
        if self.modes.is_empty() || self.sections.is_empty() {
            return;
        }
        let idx = match external.and_then(|value| self.mode_index(value)) {
            Some(idx) => idx,
            None => {
                tracing::debug!(
                    group = %self.name,
                    value = ?external,
                    default = %self.modes[0].name,
                    "no matching mode, using default"
                );
                0
            }
        };
        self.apply(idx);
    }

    /// Full pass over every section: shown iff its index belongs to the mode.
    fn apply(&mut self, idx: usize) {
        let visible = &self.modes[idx].visible;
        for (i, section) in self.sections.iter_mut().enumerate() {
            if visible.contains(&i) {
                section.show();
            } else {
                section.hide();
            }
        }
        self.active = Some(idx);
        tracing::debug!(group = %self.name, mode = %self.modes[idx].name, "mode applied");
    }
}

/// Owns the sections of every field group and keeps their visibility in sync
/// with the active mode of each group.
pub struct VisibilityController<S> {
    groups: Vec<Group<S>>,
    by_name: HashMap<String, usize>,
}

impl<S> Default for VisibilityController<S> {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            by_name: HashMap::new(),
        }
    }
}

impl<S: Section> VisibilityController<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`add_group`](Self::add_group).
    pub fn with_group(mut self, spec: GroupSpec, sections: Vec<S>) -> Result<Self> {
        self.add_group(spec, sections)?;
        Ok(self)
    }

    /// Register a group with its sections. An empty section list is accepted;
    /// every operation on such a group is a no-op.
    pub fn add_group(&mut self, spec: GroupSpec, sections: Vec<S>) -> Result<()> {
        if self.by_name.contains_key(&spec.name) {
            return Err(eyre!("Duplicate field group '{}'", spec.name));
        }

        let mut modes: Vec<Mode> = Vec::with_capacity(spec.modes.len());
        for mode in spec.modes {
            if modes.iter().any(|m| m.name == mode.name) {
                return Err(eyre!(
                    "Duplicate mode '{}' in field group '{}'",
                    mode.name,
                    spec.name
                ));
            }
            if !sections.is_empty() {
                if let Some(bad) = mode.visible.iter().find(|&&i| i >= sections.len()) {
                    return Err(eyre!(
                        "Mode '{}' of field group '{}' refers to section {} but the group has {} sections",
                        mode.name,
                        spec.name,
                        bad,
                        sections.len()
                    ));
                }
            }
            modes.push(Mode {
                name: mode.name,
                visible: mode.visible.into_iter().collect(),
            });
        }

        self.by_name.insert(spec.name.clone(), self.groups.len());
        self.groups.push(Group {
            name: spec.name,
            modes,
            sections,
            active: None,
        });
        Ok(())
    }

    fn group(&self, name: &str) -> Option<&Group<S>> {
        self.by_name.get(name).map(|&i| &self.groups[i])
    }

    fn group_mut(&mut self, name: &str) -> Option<&mut Group<S>> {
        match self.by_name.get(name) {
            Some(&i) => Some(&mut self.groups[i]),
            None => None,
        }
    }

    /// Apply an externally supplied mode, falling back to the group's first
    /// mode when the value is missing or does not name a declared mode.
    pub fn initialize(&mut self, group: &str, external: Option<&str>) {
        if let Some(g) = self.group_mut(group) {
            g.initialize(external);
        }
    }

    /// Initialize every group from parameters keyed by group name.
    pub fn initialize_all(&mut self, params: &QueryParams) {
        for group in &mut self.groups {
            group.initialize(params.get(&group.name));
        }
    }

    /// Switch `group` to `mode`. Unknown groups or modes and groups without
    /// sections leave everything untouched and return false.
    pub fn set_mode(&mut self, group: &str, mode: &str) -> bool {
        let Some(g) = self.group_mut(group) else {
            return false;
        };
        if g.sections.is_empty() {
            return false;
        }
        match g.mode_index(mode) {
            Some(idx) => {
                g.apply(idx);
                true
            }
            None => {
                tracing::debug!(group, mode, "ignoring unknown mode");
                false
            }
        }
    }

    /// Handler for a selection made by the user on the group's mode selector.
    pub fn on_user_select(&mut self, group: &str, mode: &str) -> bool {
        self.set_mode(group, mode)
    }

    pub fn active_mode(&self, group: &str) -> Option<&str> {
        let g = self.group(group)?;
        g.active.map(|i| g.modes[i].name.as_str())
    }

    pub fn active_index(&self, group: &str) -> Option<usize> {
        self.group(group)?.active
    }

    /// Indices of the sections of `group` that are currently visible.
    pub fn visible_indices(&self, group: &str) -> Vec<usize> {
        self.sections(group)
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_visible())
            .map(|(i, _)| i)
            .collect()
    }

    /// Declared section set of a mode.
    pub fn mode_sections(&self, group: &str, mode: &str) -> Option<&BTreeSet<usize>> {
        let g = self.group(group)?;
        g.mode_index(mode).map(|i| &g.modes[i].visible)
    }

    pub fn modes<'a>(&'a self, group: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.group(group)
            .into_iter()
            .flat_map(|g| g.modes.iter().map(|m| m.name.as_str()))
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    pub fn sections(&self, group: &str) -> &[S] {
        self.group(group).map(|g| g.sections.as_slice()).unwrap_or(&[])
    }

    /// Mutable access to a section's contents. Visibility must only be changed
    /// through the controller.
    pub fn section_mut(&mut self, group: &str, index: usize) -> Option<&mut S> {
        self.group_mut(group)?.sections.get_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Probe {
        visible: bool,
        toggles: usize,
    }

    impl Probe {
        fn shown() -> Self {
            Self {
                visible: true,
                toggles: 0,
            }
        }
    }

    impl Section for Probe {
        fn show(&mut self) {
            self.visible = true;
            self.toggles += 1;
        }

        fn hide(&mut self) {
            self.visible = false;
            self.toggles += 1;
        }

        fn is_visible(&self) -> bool {
            self.visible
        }
    }

    fn probes(n: usize) -> Vec<Probe> {
        (0..n).map(|_| Probe::shown()).collect()
    }

    fn day_group() -> GroupSpec {
        GroupSpec::new("day")
            .with_mode("exact", [0])
            .with_mode("before", [0])
            .with_mode("after", [0])
            .with_mode("range", [1, 2])
    }

    fn facility_group() -> GroupSpec {
        GroupSpec::new("facility")
            .with_mode("facility", [0])
            .with_mode("category", [1])
    }

    fn controller() -> VisibilityController<Probe> {
        VisibilityController::new()
            .with_group(day_group(), probes(3))
            .unwrap()
            .with_group(facility_group(), probes(2))
            .unwrap()
    }

    #[test]
    fn test_initialize_range_then_user_selects_exact() {
        let mut c = controller();
        c.initialize("day", Some("range"));
        assert_eq!(c.visible_indices("day"), vec![1, 2]);
        assert_eq!(c.active_mode("day"), Some("range"));

        assert!(c.on_user_select("day", "exact"));
        assert_eq!(c.visible_indices("day"), vec![0]);
        assert_eq!(c.active_mode("day"), Some("exact"));
    }

    #[test]
    fn test_initialize_missing_uses_first_mode() {
        let mut c = controller();
        c.initialize("facility", None);
        assert_eq!(c.visible_indices("facility"), vec![0]);
        assert_eq!(c.active_mode("facility"), Some("facility"));
    }

    #[test]
    fn test_initialize_unknown_and_empty_use_first_mode() {
        for value in [Some("not-a-real-mode"), Some(""), Some("RANGE"), None] {
            let mut c = controller();
            c.initialize("day", value);
            assert_eq!(c.visible_indices("day"), vec![0], "value {:?}", value);
            assert_eq!(c.active_mode("day"), Some("exact"));
        }
    }

    #[test]
    fn test_set_mode_unknown_is_noop() {
        let mut c = controller();
        c.initialize("day", Some("range"));
        assert!(!c.set_mode("day", "sideways"));
        assert_eq!(c.visible_indices("day"), vec![1, 2]);
        assert_eq!(c.active_mode("day"), Some("range"));
        assert!(!c.set_mode("nope", "exact"));
    }

    #[test]
    fn test_every_mode_shows_exactly_its_sections() {
        let mut c = controller();
        for group in ["day", "facility"] {
            let modes: Vec<String> = c.modes(group).map(str::to_string).collect();
            for mode in modes {
                assert!(c.set_mode(group, &mode));
                let expected: Vec<usize> =
                    c.mode_sections(group, &mode).unwrap().iter().copied().collect();
                assert_eq!(c.visible_indices(group), expected, "{group}/{mode}");
            }
        }
    }

    #[test]
    fn test_set_mode_is_idempotent() {
        let mut c = controller();
        c.set_mode("day", "range");
        let once = c.visible_indices("day");
        c.set_mode("day", "range");
        assert_eq!(c.visible_indices("day"), once);
    }

    #[test]
    fn test_switch_never_leaves_both_modes_visible() {
        let mut c = controller();
        for mode in ["facility", "category", "facility", "category"] {
            c.on_user_select("facility", mode);
            assert_eq!(c.visible_indices("facility").len(), 1);
        }
    }

    #[test]
    fn test_apply_recomputes_every_section() {
        let mut c = controller();
        c.set_mode("day", "exact");
        // Tamper with a section behind the controller's back.
        c.section_mut("day", 2).unwrap().visible = true;
        c.set_mode("day", "exact");
        assert_eq!(c.visible_indices("day"), vec![0]);
        assert!(c.sections("day").iter().all(|p| p.toggles == 2));
    }

    #[test]
    fn test_empty_group_is_noop() {
        let mut c: VisibilityController<Probe> = VisibilityController::new()
            .with_group(GroupSpec::new("ghost").with_mode("a", [0, 5]), Vec::new())
            .unwrap();
        c.initialize("ghost", Some("a"));
        assert!(!c.set_mode("ghost", "a"));
        assert_eq!(c.active_mode("ghost"), None);
        assert!(c.visible_indices("ghost").is_empty());
    }

    #[test]
    fn test_group_without_modes_is_noop() {
        let mut c = VisibilityController::new()
            .with_group(GroupSpec::new("bare"), probes(2))
            .unwrap();
        c.initialize("bare", Some("x"));
        assert_eq!(c.active_mode("bare"), None);
        assert_eq!(c.visible_indices("bare"), vec![0, 1]);
    }

    #[test]
    fn test_initialize_all_reads_group_keys() {
        let mut c = controller();
        let params = QueryParams::parse("day=range&facility=category");
        c.initialize_all(&params);
        assert_eq!(c.visible_indices("day"), vec![1, 2]);
        assert_eq!(c.visible_indices("facility"), vec![1]);
    }

    #[test]
    fn test_rejects_duplicate_group() {
        let result = controller().with_group(facility_group(), probes(2));
        assert!(result.is_err());
        assert!(result
            .err()
            .unwrap()
            .to_string()
            .contains("Duplicate field group"));
    }

    #[test]
    fn test_rejects_duplicate_mode() {
        let spec = GroupSpec::new("g").with_mode("a", [0]).with_mode("a", [1]);
        let result = VisibilityController::new().with_group(spec, probes(2));
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_out_of_range_index() {
        let spec = GroupSpec::new("g").with_mode("a", [0, 2]);
        let result = VisibilityController::new().with_group(spec, probes(2));
        let message = result.err().unwrap().to_string();
        assert!(message.contains("refers to section 2"));
    }

    #[test]
    fn test_group_names_keep_declaration_order() {
        let c = controller();
        assert_eq!(c.group_names().collect::<Vec<_>>(), vec!["day", "facility"]);
        assert_eq!(
            c.modes("day").collect::<Vec<_>>(),
            vec!["exact", "before", "after", "range"]
        );
        assert_eq!(c.modes("missing").count(), 0);
    }
}
