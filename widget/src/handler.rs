use crate::errors::WidgetError;
use crate::params::WidgetParams;
use crate::render::Template;
use crate::view::{self, Difference, ThresholdState};
use serde_json::Value;

/// Hook invoked for every changed payload. Concrete widget variants must
/// implement this; there is no default.
pub trait WidgetHandler: Send {
    fn handle_response(&mut self, payload: &Value) -> Result<(), WidgetError>;
}

/// Tile showing a single numeric reading: renders the template, tracks the
/// delta against the previous reading, and derives the threshold state.
pub struct SingleValueWidget {
    value_field: String,
    params: WidgetParams,
    template: Template,
    last_value: Option<f64>,
    rendered: String,
    difference: Option<Difference>,
    threshold: ThresholdState,
}

impl SingleValueWidget {
    pub fn new(value_field: impl Into<String>, params: WidgetParams, template: Template) -> Self {
        let rendered = template.render(None);
        SingleValueWidget {
            value_field: value_field.into(),
            params,
            template,
            last_value: None,
            rendered,
            difference: None,
            threshold: ThresholdState::Ok,
        }
    }

    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    pub fn difference(&self) -> Option<&Difference> {
        self.difference.as_ref()
    }

    pub fn threshold(&self) -> ThresholdState {
        self.threshold
    }

    /// State classes currently applied to the tile, in render order.
    pub fn state_classes(&self) -> Vec<&'static str> {
        let mut classes = Vec::new();
        if let Some(diff) = &self.difference {
            classes.push(diff.arrow_class);
        }
        if let Some(class) = self.threshold.class() {
            classes.push(class);
        }
        classes
    }
}

impl WidgetHandler for SingleValueWidget {
    fn handle_response(&mut self, payload: &Value) -> Result<(), WidgetError> {
        let current = payload
            .get(&self.value_field)
            .and_then(Value::as_f64)
            .ok_or_else(|| {
                WidgetError::InvalidPayload(format!(
                    "payload field {} is missing or not a number",
                    self.value_field
                ))
            })?;

        self.difference = self
            .last_value
            .and_then(|previous| view::set_difference(previous, current));
        self.threshold = view::check_thresholds(current, &self.params);
        self.rendered = self.template.render(Some(payload));
        self.last_value = Some(current);

        Ok(())
    }
}
