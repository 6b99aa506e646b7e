//! Plain-text rendering for the command line.

use crate::logic::calculations::{bar, chart_metrics};
use crate::logic::planning::{ConnectionStatus, RefreshOutcome};
use crate::logic::ApplyReport;
use crate::models::{
    FarmParameters, GeocodeResult, NumericField, SuggestionResult, TextField,
};
use std::fmt;

const BAR_WIDTH: usize = 20;

pub struct ParametersView<'a> {
    params: &'a FarmParameters,
}

impl<'a> ParametersView<'a> {
    pub fn new(params: &'a FarmParameters) -> Self {
        Self { params }
    }
}

impl fmt::Display for ParametersView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.params;
        writeln!(f, "Farm Parameters")?;
        writeln!(f, "  {:<22} {}", "Location", or_dash(Some(p.location.trim())))?;
        writeln!(
            f,
            "  {:<22} {}",
            "Desired Crops",
            or_dash(p.text(TextField::DesiredCrops))
        )?;
        writeln!(f, "  {:<22} {}", "Soil Type", or_dash(p.text(TextField::SoilType)))?;

        for field in NumericField::ALL {
            let value = p.get(field);
            let formatted = if field == NumericField::Ph {
                format!("{:.2}", value)
            } else {
                format!("{} {}", value, field.unit())
            };
            writeln!(f, "  {:<22} {}", field.label(), formatted)?;
        }

        writeln!(
            f,
            "  {:<22} {}",
            "Historical Yield",
            or_dash(p.text(TextField::HistoricalYieldData))
        )?;
        write!(
            f,
            "  {:<22} {}",
            "Other Parameters",
            or_dash(p.text(TextField::OtherRelevantParameters))
        )
    }
}

fn or_dash(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => "-",
    }
}

pub struct SuggestionsView<'a> {
    result: &'a SuggestionResult,
    charts: bool,
}

impl<'a> SuggestionsView<'a> {
    pub fn new(result: &'a SuggestionResult) -> Self {
        Self {
            result,
            charts: true,
        }
    }

    pub fn with_charts(mut self, charts: bool) -> Self {
        self.charts = charts;
        self
    }
}

impl fmt::Display for SuggestionsView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.result.is_empty() {
            return write!(f, "No crop suggestions were returned.");
        }

        writeln!(
            f,
            "Crop Suggestions ({})  generated {}",
            self.result.suggestions.len(),
            self.result.generated_at.format("%Y-%m-%d %H:%M UTC")
        )?;

        for (i, suggestion) in self.result.suggestions.iter().enumerate() {
            let confidence = suggestion.confidence();
            writeln!(f)?;
            writeln!(
                f,
                "{}. {}  {} {} confidence",
                i + 1,
                suggestion.crop,
                confidence.symbol(),
                confidence
            )?;

            if !suggestion.reasons.is_empty() {
                writeln!(f, "   Reasons:")?;
                for reason in &suggestion.reasons {
                    writeln!(f, "     - {}", reason)?;
                }
            }
            if !suggestion.suggested_actions.is_empty() {
                writeln!(f, "   Suggested actions:")?;
                for action in &suggestion.suggested_actions {
                    writeln!(f, "     - {}", action)?;
                }
            }

            if self.charts {
                writeln!(f, "   Illustrative metrics:")?;
                let metrics = chart_metrics(&suggestion.crop);
                for (label, value) in metrics.rows() {
                    // scale each row against the top of its band
                    let max = match label {
                        "Est. Profit ($/acre)" => 2000,
                        _ => 100,
                    };
                    writeln!(
                        f,
                        "     {:<24} {} {}",
                        label,
                        bar(value, max, BAR_WIDTH),
                        value
                    )?;
                }
            }
        }
        Ok(())
    }
}

pub fn apply_summary(label: &str, outcome: &crate::error::Result<ApplyReport>) -> String {
    match outcome {
        Ok(report) if report.discarded => {
            format!("{}: discarded (location changed)", label)
        }
        Ok(report) if report.already_running => format!("{}: already in progress", label),
        Ok(report) => {
            let mut line = format!("{}: updated {} field(s)", label, report.applied.len());
            if !report.skipped.is_empty() {
                let kept: Vec<&str> = report.skipped.iter().map(|f| f.as_str()).collect();
                line.push_str(&format!(", kept your {}", kept.join(", ")));
            }
            line
        }
        Err(e) => format!("{}: failed ({})", label, e.user_message()),
    }
}

pub fn refresh_summary(outcome: &RefreshOutcome) -> String {
    format!(
        "{}\n{}",
        apply_summary("Climate", &outcome.climate),
        apply_summary("Soil", &outcome.soil)
    )
}

pub fn geocode_summary(query: &str, result: Option<&GeocodeResult>) -> String {
    match result {
        Some(place) => format!(
            "{}\n  {:.4}, {:.4}",
            place.display_name, place.latitude, place.longitude
        ),
        None => format!("No match found for {:?}", query),
    }
}

pub fn connection_summary(status: &ConnectionStatus) -> String {
    let state = |ok: bool| if ok { "OK" } else { "OFFLINE" };
    format!(
        "Geocoding: {} | Language model: {}",
        state(status.geocoding),
        state(status.llm)
    )
}
