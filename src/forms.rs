//! Form definitions and the live state of an open form.
//!
//! A [`FormSpec`] is plain data (built in or read from `config.toml`). A
//! [`FormState`] turns it into a [`VisibilityController`] over editable
//! [`FormSection`]s.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::Theme;
use crate::query::QueryParams;
use crate::visibility::{GroupSpec, ModeSpec, Section, VisibilityController};
use crate::widgets::text_input::TextInput;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDef {
    /// Query parameter name of the section's value
    pub field: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Indices into the group's sections shown while this mode is active
    #[serde(default)]
    pub visible: Vec<usize>,
}

impl ModeDef {
    fn new(name: &str, label: &str, visible: &[usize]) -> Self {
        Self {
            name: name.to_string(),
            label: Some(label.to_string()),
            visible: visible.to_vec(),
        }
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDef {
    /// Group name, also the query parameter carrying the active mode
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub sections: Vec<SectionDef>,
    #[serde(default)]
    pub modes: Vec<ModeDef>,
}

impl GroupDef {
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    fn to_group_spec(&self) -> GroupSpec {
        GroupSpec {
            name: self.name.clone(),
            modes: self
                .modes
                .iter()
                .map(|m| ModeSpec::new(m.name.clone(), m.visible.iter().copied()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub groups: Vec<GroupDef>,
}

impl FormSpec {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }
}

fn section(field: &str, label: &str) -> SectionDef {
    SectionDef {
        field: field.to_string(),
        label: label.to_string(),
    }
}

fn group(name: &str, label: &str, sections: Vec<SectionDef>, modes: Vec<ModeDef>) -> GroupDef {
    GroupDef {
        name: name.to_string(),
        label: Some(label.to_string()),
        sections,
        modes,
    }
}

/// Reservation search: filter by day, price and facility.
pub fn reservations_form() -> FormSpec {
    FormSpec {
        name: "reservations".to_string(),
        title: Some("Search Reservations".to_string()),
        groups: vec![
            group(
                "searchByDay",
                "Search day by",
                vec![
                    section("day", "Day"),
                    section("dayFrom", "From"),
                    section("dayTo", "To"),
                ],
                vec![
                    ModeDef::new("exact", "Exact day", &[0]),
                    ModeDef::new("before", "Before day", &[0]),
                    ModeDef::new("after", "After day", &[0]),
                    ModeDef::new("range", "Date range", &[1, 2]),
                ],
            ),
            group(
                "searchByPrice",
                "Search price by",
                vec![
                    section("price", "Price"),
                    section("priceFrom", "From"),
                    section("priceTo", "To"),
                ],
                vec![
                    ModeDef::new("exact", "Exact amount", &[0]),
                    ModeDef::new("less", "Less than", &[0]),
                    ModeDef::new("greater", "Greater than", &[0]),
                    ModeDef::new("range", "Between", &[1, 2]),
                ],
            ),
            group(
                "searchByFacility",
                "Search by",
                vec![
                    section("facility", "Facility"),
                    section("category", "Category"),
                ],
                vec![
                    ModeDef::new("facility", "Facility", &[0]),
                    ModeDef::new("category", "Facility category", &[1]),
                ],
            ),
        ],
    }
}

/// Report chooser: monthly, yearly or a custom day range.
pub fn report_form() -> FormSpec {
    FormSpec {
        name: "report".to_string(),
        title: Some("Choose Report".to_string()),
        groups: vec![group(
            "reportPeriod",
            "Report period",
            vec![
                section("month", "Month"),
                section("year", "Year"),
                section("dayFrom", "From"),
                section("dayTo", "To"),
            ],
            vec![
                ModeDef::new("monthly", "Monthly", &[0, 1]),
                ModeDef::new("yearly", "Yearly", &[1]),
                ModeDef::new("custom", "Custom", &[2, 3]),
            ],
        )],
    }
}

pub fn builtin_forms() -> Vec<FormSpec> {
    vec![reservations_form(), report_form()]
}

/// All forms available to the user: built-ins, with same-named forms from
/// the config replacing them, followed by the remaining config forms.
pub fn available_forms(configured: &[FormSpec]) -> Vec<FormSpec> {
    let mut forms: Vec<FormSpec> = builtin_forms()
        .into_iter()
        .map(|builtin| {
            configured
                .iter()
                .find(|f| f.name == builtin.name)
                .cloned()
                .unwrap_or(builtin)
        })
        .collect();
    for form in configured {
        if !forms.iter().any(|f| f.name == form.name) {
            forms.push(form.clone());
        }
    }
    forms
}

pub fn find_form(name: &str, configured: &[FormSpec]) -> Result<FormSpec> {
    let forms = available_forms(configured);
    let names: Vec<&str> = forms.iter().map(|f| f.name.as_str()).collect();
    let names = names.join(", ");
    forms
        .iter()
        .find(|f| f.name == name)
        .cloned()
        .ok_or_else(|| eyre!("Unknown form '{}'. Available forms: {}", name, names))
}

/// A labeled input whose visibility is driven by its group's mode.
pub struct FormSection {
    pub field: String,
    pub label: String,
    pub input: TextInput,
    visible: bool,
}

impl FormSection {
    pub fn new(def: &SectionDef) -> Self {
        Self {
            field: def.field.clone(),
            label: def.label.clone(),
            input: TextInput::new().with_placeholder(def.label.clone()),
            visible: false,
        }
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }
}

impl Section for FormSection {
    fn show(&mut self) {
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Resolved visibility of one group, as printed by `--print-state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSnapshot {
    pub name: String,
    pub active_mode: Option<String>,
    pub visible: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSnapshot {
    pub form: String,
    pub groups: Vec<GroupSnapshot>,
}

/// Group names and section fields share one query string, so every one of
/// them must be distinct across the form.
fn check_parameter_names(spec: &FormSpec) -> Result<()> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    let names = spec.groups.iter().flat_map(|group| {
        std::iter::once((group.name.as_str(), "group"))
            .chain(group.sections.iter().map(|s| (s.field.as_str(), "field")))
    });
    for (name, kind) in names {
        if let Some(previous) = seen.insert(name, kind) {
            return Err(eyre!(
                "{} '{}' collides with a {} of the same name in form '{}'",
                kind,
                name,
                previous,
                spec.name
            ));
        }
    }
    Ok(())
}

/// An open form: its definition plus the controller owning its sections.
pub struct FormState {
    spec: FormSpec,
    controller: VisibilityController<FormSection>,
}

impl FormState {
    pub fn new(spec: FormSpec) -> Result<Self> {
        check_parameter_names(&spec)?;
        let mut controller = VisibilityController::new();
        for group in &spec.groups {
            let sections = group.sections.iter().map(FormSection::new).collect();
            controller.add_group(group.to_group_spec(), sections)?;
        }
        Ok(Self { spec, controller })
    }

    /// Build the form and initialize it from query parameters.
    pub fn from_params(spec: FormSpec, params: &QueryParams) -> Result<Self> {
        let mut state = Self::new(spec)?;
        state.apply_params(params);
        Ok(state)
    }

    /// Initialize every group's mode and prefill section values from `params`.
    pub fn apply_params(&mut self, params: &QueryParams) {
        self.controller.initialize_all(params);
        for group in &self.spec.groups {
            for (index, def) in group.sections.iter().enumerate() {
                if let Some(value) = params.get(&def.field) {
                    if let Some(section) = self.controller.section_mut(&group.name, index) {
                        section.input.set_value(value.to_string());
                    }
                }
            }
        }
        tracing::info!(form = %self.spec.name, params = params.len(), "form initialized");
    }

    pub fn apply_theme(&mut self, theme: &Theme) {
        for group in &self.spec.groups {
            for index in 0..group.sections.len() {
                if let Some(section) = self.controller.section_mut(&group.name, index) {
                    let input = std::mem::take(&mut section.input);
                    section.input = input.with_theme(theme);
                }
            }
        }
    }

    pub fn spec(&self) -> &FormSpec {
        &self.spec
    }

    pub fn controller(&self) -> &VisibilityController<FormSection> {
        &self.controller
    }

    pub fn group_def(&self, index: usize) -> Option<&GroupDef> {
        self.spec.groups.get(index)
    }

    pub fn section_mut(&mut self, group: usize, index: usize) -> Option<&mut FormSection> {
        let name = &self.spec.groups.get(group)?.name;
        self.controller.section_mut(name, index)
    }

    /// User picked `mode` on the group's selector.
    pub fn select(&mut self, group: &str, mode: &str) -> bool {
        let changed = self.controller.on_user_select(group, mode);
        if changed {
            tracing::debug!(group, mode, "mode selected");
        }
        changed
    }

    /// Name of the mode before/after the active one, wrapping around.
    pub fn adjacent_mode(&self, group: usize, forward: bool) -> Option<String> {
        let def = self.spec.groups.get(group)?;
        let n = def.modes.len();
        if n == 0 {
            return None;
        }
        let current = self.controller.active_index(&def.name).unwrap_or(0);
        let next = if forward {
            (current + 1) % n
        } else {
            (current + n - 1) % n
        };
        Some(def.modes[next].name.clone())
    }

    /// Mode parameters plus the non-empty values of visible sections, in form order.
    pub fn to_query(&self) -> QueryParams {
        let mut params = QueryParams::new();
        for group in &self.spec.groups {
            if let Some(mode) = self.controller.active_mode(&group.name) {
                params.insert(group.name.clone(), mode);
            }
            for section in self.controller.sections(&group.name) {
                if section.is_visible() && !section.value().is_empty() {
                    params.insert(section.field.clone(), section.value());
                }
            }
        }
        params
    }

    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            form: self.spec.name.clone(),
            groups: self
                .spec
                .groups
                .iter()
                .map(|group| GroupSnapshot {
                    name: group.name.clone(),
                    active_mode: self.controller.active_mode(&group.name).map(str::to_string),
                    visible: self
                        .controller
                        .sections(&group.name)
                        .iter()
                        .filter(|s| s.is_visible())
                        .map(|s| s.field.clone())
                        .collect(),
                })
                .collect(),
        }
    }
}
