//! Owned model of the forms on a web page.
//!
//! A [`Page`] is parsed from HTML and then mutated by the field matcher the
//! way a browser DOM would be: control values change, synthetic events are
//! recorded, and filled controls carry a highlight that expires.

pub mod detect;
pub mod matcher;
pub mod watcher;

pub use detect::{detect_forms, DetectedForm};
pub use matcher::{fill, fill_at, HIGHLIGHT_DURATION};
pub use watcher::{FormSource, FormWatcher, SharedPage};

use crate::record::ExtractedRecord;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::sync::LazyLock;
use std::time::Instant;

static FORM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("form").expect("static selector"));
static CONTROL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("input, select, textarea").expect("static selector"));
static OPTION_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("option").expect("static selector"));

/// Control types the matcher never touches.
const NON_FILLABLE_TYPES: [&str; 3] = ["submit", "button", "hidden"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlTag {
    Input,
    Select,
    TextArea,
}

/// Synthetic notifications fired after a value is written, so that reactive
/// bindings observe the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlEvent {
    Input,
    Change,
    Blur,
}

impl ControlEvent {
    pub const FILL_SEQUENCE: [ControlEvent; 3] =
        [ControlEvent::Input, ControlEvent::Change, ControlEvent::Blur];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FormControl {
    pub tag: ControlTag,
    /// The DOM `type` of the control: `text`, `email`, `hidden`,
    /// `select-one`, `textarea`, ...
    pub input_type: String,
    pub name: Option<String>,
    pub id: Option<String>,
    pub form_control_name: Option<String>,
    pub value: String,
    pub options: Vec<SelectOption>,
    #[serde(skip)]
    pub events: Vec<ControlEvent>,
    #[serde(skip)]
    pub highlighted_until: Option<Instant>,
}

impl FormControl {
    pub fn input(input_type: &str) -> Self {
        Self::with_tag(ControlTag::Input, input_type.to_lowercase())
    }

    pub fn textarea() -> Self {
        Self::with_tag(ControlTag::TextArea, "textarea".to_string())
    }

    pub fn select(options: Vec<SelectOption>) -> Self {
        let mut control = Self::with_tag(ControlTag::Select, "select-one".to_string());
        control.value = options.first().map(|o| o.value.clone()).unwrap_or_default();
        control.options = options;
        control
    }

    fn with_tag(tag: ControlTag, input_type: String) -> Self {
        Self {
            tag,
            input_type,
            name: None,
            id: None,
            form_control_name: None,
            value: String::new(),
            options: Vec::new(),
            events: Vec::new(),
            highlighted_until: None,
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_form_control_name(mut self, name: impl Into<String>) -> Self {
        self.form_control_name = Some(name.into());
        self
    }

    /// The identifying name of the control: `name`, then `id`, then the
    /// `formcontrolname` attribute. Empty attributes are skipped.
    pub fn field_name(&self) -> Option<&str> {
        [&self.name, &self.id, &self.form_control_name]
            .into_iter()
            .filter_map(|attr| attr.as_deref())
            .find(|attr| !attr.is_empty())
    }

    pub fn is_fillable(&self) -> bool {
        !NON_FILLABLE_TYPES.contains(&self.input_type.as_str())
    }

    pub fn dispatch(&mut self, event: ControlEvent) {
        self.events.push(event);
    }

    pub fn highlight_until(&mut self, until: Instant) {
        self.highlighted_until = Some(until);
    }

    pub fn is_highlighted(&self, now: Instant) -> bool {
        self.highlighted_until.is_some_and(|until| now < until)
    }

    fn from_element(element: ElementRef<'_>) -> Self {
        let attr = |name: &str| element.value().attr(name).map(str::to_string);

        let mut control = match element.value().name() {
            "select" => {
                let options: Vec<SelectOption> = element
                    .select(&OPTION_SELECTOR)
                    .map(|option| {
                        let label = collapse_whitespace(&option.text().collect::<String>());
                        let value = option
                            .value()
                            .attr("value")
                            .map(str::to_string)
                            .unwrap_or_else(|| label.clone());
                        SelectOption { value, label }
                    })
                    .collect();

                let selected = element
                    .select(&OPTION_SELECTOR)
                    .position(|option| option.value().attr("selected").is_some());

                let mut control = FormControl::select(options);
                if let Some(index) = selected {
                    control.value = control.options[index].value.clone();
                }
                if element.value().attr("multiple").is_some() {
                    control.input_type = "select-multiple".to_string();
                }
                control
            }
            "textarea" => {
                let mut control = FormControl::textarea();
                control.value = element.text().collect();
                control
            }
            _ => {
                let mut control = FormControl::input(
                    element.value().attr("type").unwrap_or("text"),
                );
                control.value = attr("value").unwrap_or_default();
                control
            }
        };

        control.name = attr("name");
        control.id = attr("id");
        control.form_control_name = attr("formcontrolname");
        control
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Form {
    pub id: Option<String>,
    pub name: Option<String>,
    pub controls: Vec<FormControl>,
}

impl Form {
    pub fn new(controls: Vec<FormControl>) -> Self {
        Self {
            id: None,
            name: None,
            controls,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Names of the controls a fill could target, in document order.
    pub fn field_names(&self) -> Vec<String> {
        self.controls
            .iter()
            .filter(|c| c.is_fillable())
            .filter_map(|c| c.field_name().map(str::to_string))
            .collect()
    }

    pub fn control(&self, field_name: &str) -> Option<&FormControl> {
        self.controls
            .iter()
            .find(|c| c.field_name() == Some(field_name))
    }

    pub fn value_of(&self, field_name: &str) -> Option<&str> {
        self.control(field_name).map(|c| c.value.as_str())
    }

    fn from_element(element: ElementRef<'_>) -> Self {
        Self {
            id: element.value().attr("id").map(str::to_string),
            name: element.value().attr("name").map(str::to_string),
            controls: element
                .select(&CONTROL_SELECTOR)
                .map(FormControl::from_element)
                .collect(),
        }
    }
}

/// All forms on a page, in document order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Page {
    pub forms: Vec<Form>,
}

impl Page {
    pub fn new(forms: Vec<Form>) -> Self {
        Self { forms }
    }

    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);
        Self {
            forms: document
                .select(&FORM_SELECTOR)
                .map(Form::from_element)
                .collect(),
        }
    }

    /// Resolves a detection snapshot entry against the current page. Returns
    /// `None` when the form at that position is gone or is a different form.
    pub fn form(&self, detected: &DetectedForm) -> Option<&Form> {
        self.forms
            .get(detected.index)
            .filter(|form| detected.refers_to(form))
    }

    pub fn form_mut(&mut self, detected: &DetectedForm) -> Option<&mut Form> {
        self.forms
            .get_mut(detected.index)
            .filter(|form| detected.refers_to(form))
    }

    /// Fills the form a snapshot entry refers to. A stale entry fills nothing.
    pub fn fill(&mut self, detected: &DetectedForm, record: &ExtractedRecord) -> usize {
        self.form_mut(detected)
            .map(|form| matcher::fill(form, record))
            .unwrap_or(0)
    }

    /// Drops highlights that have expired by `now`.
    pub fn clear_expired_highlights(&mut self, now: Instant) {
        for control in self.forms.iter_mut().flat_map(|f| f.controls.iter_mut()) {
            if !control.is_highlighted(now) {
                control.highlighted_until = None;
            }
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
