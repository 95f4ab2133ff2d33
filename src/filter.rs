use crate::error::{DashError, Result};
use egui::{RichText, Slider, TextEdit};
use serde::{Serialize, Serializer};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterMode {
    Text,
    Range,
}

/// Inputs shown for a range filter. Columns with a known upper bound get
/// sliders over `[0, bound]`, everything else gets two free number fields.
#[derive(Clone, Debug, PartialEq)]
pub enum RangeInput {
    Bounded { bound: f64, min: f64, max: f64 },
    Free { min: String, max: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum FilterValue {
    Text(String),
    Range(RangeInput),
}

/// One filter unit per selected column.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterBlock {
    pub column: String,
    pub value: FilterValue,
}

/// A number as it goes over the wire: integral values are written without
/// a fractional part so `10` stays `10`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangeBound(pub f64);

impl Serialize for RangeBound {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        const MAX_SAFE: f64 = 9_007_199_254_740_992.0;
        let v = self.0;
        if v.is_finite() && v.fract() == 0.0 && v.abs() < MAX_SAFE {
            serializer.serialize_i64(v as i64)
        } else {
            serializer.serialize_f64(v)
        }
    }
}

/// Wire form of a single column filter: `{"text": ..}` or `{"range": [min, max]}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterSpec {
    Text(String),
    Range([RangeBound; 2]),
}

impl FilterBlock {
    pub fn new(column: &str) -> Self {
        Self {
            column: column.to_owned(),
            value: FilterValue::Text(String::new()),
        }
    }

    pub fn mode(&self) -> FilterMode {
        match self.value {
            FilterValue::Text(_) => FilterMode::Text,
            FilterValue::Range(_) => FilterMode::Range,
        }
    }

    /// Switches the input kind. Whatever was typed for the previous mode is
    /// dropped; picking the current mode again keeps the value.
    pub fn set_mode(&mut self, mode: FilterMode, bound: Option<f64>) {
        if self.mode() == mode {
            return;
        }
        self.value = match mode {
            FilterMode::Text => FilterValue::Text(String::new()),
            FilterMode::Range => FilterValue::Range(match bound {
                Some(bound) => RangeInput::Bounded {
                    bound,
                    min: 0.0,
                    max: bound,
                },
                None => RangeInput::Free {
                    min: String::new(),
                    max: String::new(),
                },
            }),
        };
        log::debug!("filter '{}' switched to {:?}", self.column, mode);
    }

    /// What this block contributes to a search. `Ok(None)` means the block
    /// is left out of the request.
    pub fn to_spec(&self) -> Result<Option<FilterSpec>> {
        match &self.value {
            FilterValue::Text(text) if text.is_empty() => Ok(None),
            FilterValue::Text(text) => Ok(Some(FilterSpec::Text(text.clone()))),
            FilterValue::Range(RangeInput::Bounded { min, max, .. }) => Ok(Some(
                FilterSpec::Range([RangeBound(*min), RangeBound(*max)]),
            )),
            FilterValue::Range(RangeInput::Free { min, max }) => {
                if min.trim().is_empty() || max.trim().is_empty() {
                    return Ok(None);
                }
                let min = parse_number(&self.column, min)?;
                let max = parse_number(&self.column, max)?;
                Ok(Some(FilterSpec::Range([RangeBound(min), RangeBound(max)])))
            }
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, bound: Option<f64>) {
        ui.label(format!("Select filter type for '{}':", self.column));
        ui.horizontal(|ui| {
            let mode = self.mode();
            if ui.radio(mode == FilterMode::Text, "Text Search").clicked() {
                self.set_mode(FilterMode::Text, bound);
            }
            if ui.radio(mode == FilterMode::Range, "Range Search").clicked() {
                self.set_mode(FilterMode::Range, bound);
            }
        });
        let column = self.column.clone();
        match &mut self.value {
            FilterValue::Text(text) => {
                ui.add(TextEdit::singleline(text).hint_text(format!("Search by {}", column)));
            }
            FilterValue::Range(RangeInput::Bounded { bound, min, max }) => {
                ui.horizontal(|ui| {
                    ui.label("Min: ");
                    ui.add(Slider::new(min, 0.0..=*bound).show_value(false));
                    ui.label(RichText::new(format_number(*min)).monospace());
                });
                ui.horizontal(|ui| {
                    ui.label("Max: ");
                    ui.add(Slider::new(max, 0.0..=*bound).show_value(false));
                    ui.label(RichText::new(format_number(*max)).monospace());
                });
            }
            FilterValue::Range(RangeInput::Free { min, max }) => {
                ui.horizontal(|ui| {
                    ui.add(
                        TextEdit::singleline(min)
                            .hint_text(format!("Min {}", column))
                            .desired_width(100.0),
                    );
                    ui.add(
                        TextEdit::singleline(max)
                            .hint_text(format!("Max {}", column))
                            .desired_width(100.0),
                    );
                });
            }
        }
    }
}

fn parse_number(column: &str, raw: &str) -> Result<f64> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(DashError::InvalidNumber {
            column: column.to_owned(),
            raw: raw.to_owned(),
        }),
    }
}

/// Slider readout, integral values without a trailing `.0`.
pub fn format_number(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{:.2}", v)
    }
}
