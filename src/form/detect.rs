use super::{Form, Page};
use serde::Serialize;

/// A fillable form found on a page.
///
/// `index` is the form's position on the page at detection time. It is a
/// reference into the page, not ownership: [`Page::form`] re-resolves it and
/// rejects the entry if the page has changed underneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectedForm {
    pub id: String,
    pub name: String,
    pub index: usize,
    pub fields: Vec<String>,
}

impl DetectedForm {
    fn from_form(form: &Form, index: usize) -> Option<Self> {
        let fields = form.field_names();
        if fields.is_empty() {
            return None;
        }

        let id = form_id(form, index);
        let name = non_empty(&form.name)
            .or_else(|| non_empty(&form.id))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Form {}", index + 1));

        Some(Self {
            id,
            name,
            index,
            fields,
        })
    }

    pub(crate) fn refers_to(&self, form: &Form) -> bool {
        form_id(form, self.index) == self.id
    }
}

/// Finds every form on the page that has at least one fillable field.
pub fn detect_forms(page: &Page) -> Vec<DetectedForm> {
    page.forms
        .iter()
        .enumerate()
        .filter_map(|(index, form)| DetectedForm::from_form(form, index))
        .collect()
}

fn form_id(form: &Form, index: usize) -> String {
    non_empty(&form.id)
        .map(str::to_string)
        .unwrap_or_else(|| format!("form-{}", index))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
