//! `<textarea>` editing surface.

use weft_core::{EditingSurface, Selection, char_to_utf16_offset, utf16_to_char_offset};

/// An [`EditingSurface`] backed by an `HtmlTextAreaElement`.
///
/// The DOM selection API works in UTF-16 code units; offsets are converted
/// against the element's current value on every call.
#[derive(Debug, Clone)]
pub struct TextAreaSurface {
    element: web_sys::HtmlTextAreaElement,
}

impl TextAreaSurface {
    pub fn new(element: web_sys::HtmlTextAreaElement) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &web_sys::HtmlTextAreaElement {
        &self.element
    }
}

impl EditingSurface for TextAreaSurface {
    fn value(&self) -> String {
        self.element.value()
    }

    fn set_value(&mut self, value: &str) {
        self.element.set_value(value);
    }

    fn selection(&self) -> Option<Selection> {
        let start = self.element.selection_start().ok().flatten()?;
        let end = self.element.selection_end().ok().flatten()?;
        let value = self.element.value();
        let start = utf16_to_char_offset(&value, start as usize);
        let end = utf16_to_char_offset(&value, end as usize);

        let backward = matches!(
            self.element.selection_direction().ok().flatten().as_deref(),
            Some("backward")
        );
        Some(if backward {
            Selection::new(end, start)
        } else {
            Selection::new(start, end)
        })
    }

    fn set_selection(&mut self, selection: Selection) {
        let value = self.element.value();
        let start = char_to_utf16_offset(&value, selection.start()) as u32;
        let end = char_to_utf16_offset(&value, selection.end()) as u32;
        let direction = if selection.is_backwards() {
            "backward"
        } else {
            "forward"
        };
        if let Err(e) = self
            .element
            .set_selection_range_with_direction(start, end, direction)
        {
            tracing::warn!(error = ?e, "failed to set textarea selection");
        }
    }

    fn data_attribute(&self, name: &str) -> Option<String> {
        self.element.get_attribute(&format!("data-{name}"))
    }

    fn focus(&mut self) {
        if let Err(e) = self.element.focus() {
            tracing::debug!(error = ?e, "textarea refused focus");
        }
    }
}
