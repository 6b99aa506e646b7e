use crate::error::{CropWiseError, Result};
use crate::models::{NumericField, TextField};
use clap::{Args, Parser, Subcommand};
use dialoguer::Input;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cropwise", version, about = "Farm planning and crop suggestions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Collect farm parameters and ask for crop suggestions
    Plan(PlanArgs),
    /// Look up coordinates for a place name
    Locate {
        /// Place name, or a "lat, lon" pair
        text: String,
    },
    /// Use a device position as the farm location and estimate conditions
    Here {
        #[arg(long, allow_hyphen_values = true, requires = "lon")]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true, requires = "lat")]
        lon: Option<f64>,
        /// Reported accuracy in meters
        #[arg(long)]
        accuracy: Option<f64>,
    },
    /// Estimate climate and soil conditions for a location
    Estimate {
        location: String,
    },
    /// Re-run interactive setup
    Init,
    /// Validate config and test connections
    Check,
}

#[derive(Args, Debug, Clone, Default)]
pub struct PlanArgs {
    /// Farm location, e.g. "Sacramento, California"
    #[arg(short, long)]
    pub location: Option<String>,

    /// Comma-separated crops to evaluate; leave empty for open suggestions
    #[arg(long)]
    pub crops: Option<String>,

    #[arg(long)]
    pub soil_type: Option<String>,

    /// Average temperature (°C)
    #[arg(long, allow_hyphen_values = true)]
    pub temperature: Option<f64>,

    /// Average relative humidity (%)
    #[arg(long)]
    pub humidity: Option<f64>,

    /// Average monthly rainfall (mm)
    #[arg(long)]
    pub rainfall: Option<f64>,

    /// Nitrogen (kg/ha)
    #[arg(long)]
    pub nitrogen: Option<f64>,

    /// Phosphorus (kg/ha)
    #[arg(long)]
    pub phosphorus: Option<f64>,

    /// Potassium (kg/ha)
    #[arg(long)]
    pub potassium: Option<f64>,

    #[arg(long)]
    pub ph: Option<f64>,

    #[arg(long)]
    pub historical_yield: Option<String>,

    #[arg(long)]
    pub other_parameters: Option<String>,

    /// Prompt for any text fields not given as flags
    #[arg(short, long)]
    pub interactive: bool,

    /// Estimate climate and soil for the location before submitting
    #[arg(short, long)]
    pub refresh: bool,

    /// Leave out the illustrative metric charts
    #[arg(long)]
    pub no_charts: bool,
}

impl PlanArgs {
    pub fn numeric_values(&self) -> Vec<(NumericField, f64)> {
        [
            (NumericField::Temperature, self.temperature),
            (NumericField::Humidity, self.humidity),
            (NumericField::Rainfall, self.rainfall),
            (NumericField::Nitrogen, self.nitrogen),
            (NumericField::Phosphorus, self.phosphorus),
            (NumericField::Potassium, self.potassium),
            (NumericField::Ph, self.ph),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }

    pub fn text_values(&self) -> Vec<(TextField, &str)> {
        [
            (TextField::DesiredCrops, &self.crops),
            (TextField::SoilType, &self.soil_type),
            (TextField::HistoricalYieldData, &self.historical_yield),
            (TextField::OtherRelevantParameters, &self.other_parameters),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }

    /// Ask for the location and any text fields not already supplied.
    /// Blank answers leave the field unset.
    pub fn prompt_missing(&mut self) -> Result<()> {
        if self.location.is_none() {
            let location: String = Input::new()
                .with_prompt("Farm location")
                .interact_text()
                .map_err(|e| CropWiseError::Config(format!("Input error: {}", e)))?;
            self.location = Some(location);
        }

        let prompts = [
            ("Desired crops (comma-separated, blank for suggestions)", &mut self.crops),
            ("Soil type", &mut self.soil_type),
            ("Historical yield data", &mut self.historical_yield),
            ("Other relevant parameters", &mut self.other_parameters),
        ];
        for (label, slot) in prompts {
            if slot.is_some() {
                continue;
            }
            let answer: String = Input::new()
                .with_prompt(label)
                .allow_empty(true)
                .interact_text()
                .map_err(|e| CropWiseError::Config(format!("Input error: {}", e)))?;
            if !answer.trim().is_empty() {
                *slot = Some(answer);
            }
        }
        Ok(())
    }
}
