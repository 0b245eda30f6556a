//! Best-effort mapping of an [`ExtractedRecord`] onto a form's controls.

use super::{ControlEvent, ControlTag, Form, SelectOption};
use crate::alias;
use crate::record::ExtractedRecord;
use log::debug;
use std::time::{Duration, Instant};

/// How long a filled control stays highlighted.
pub const HIGHLIGHT_DURATION: Duration = Duration::from_millis(2000);

/// Fills every control whose name resolves to a field present in `record`.
///
/// Returns the number of controls that were assigned a value. Unknown names,
/// missing values and selects without a matching option are skipped silently.
pub fn fill(form: &mut Form, record: &ExtractedRecord) -> usize {
    fill_at(form, record, Instant::now())
}

/// [`fill`] with an explicit clock for the highlight expiry.
pub fn fill_at(form: &mut Form, record: &ExtractedRecord, now: Instant) -> usize {
    let mut filled = 0;

    for control in form.controls.iter_mut() {
        if !control.is_fillable() {
            continue;
        }

        let Some(key) = control.field_name().and_then(alias::resolve) else {
            continue;
        };

        let Some(value) = record.get(key) else {
            continue;
        };

        let assigned = match control.tag {
            ControlTag::Select => match match_option(&control.options, value) {
                Some(option) => {
                    control.value = option.value.clone();
                    true
                }
                None => {
                    debug!("No option of select '{}' matches '{}'", key, value);
                    false
                }
            },
            ControlTag::Input | ControlTag::TextArea => {
                control.value = value.to_string();
                true
            }
        };

        for event in ControlEvent::FILL_SEQUENCE {
            control.dispatch(event);
        }
        control.highlight_until(now + HIGHLIGHT_DURATION);

        if assigned {
            filled += 1;
        }
    }

    debug!("Filled {} field(s)", filled);
    filled
}

/// Picks the option for `value`: an exact case-insensitive match on value or
/// label first, then containment in either direction. First match wins.
pub fn match_option<'a>(options: &'a [SelectOption], value: &str) -> Option<&'a SelectOption> {
    let wanted = value.to_lowercase();

    let exact = options.iter().find(|option| {
        option.value.to_lowercase() == wanted || option.label.to_lowercase() == wanted
    });

    exact.or_else(|| {
        options.iter().find(|option| {
            [&option.value, &option.label]
                .into_iter()
                .map(|text| text.to_lowercase())
                // An empty text is contained in every value.
                .filter(|text| !text.is_empty())
                .any(|text| text.contains(&wanted) || wanted.contains(&text))
        })
    })
}
