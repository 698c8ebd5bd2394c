//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use diarisk_model::{ClinicalField, SatisfactionRating};

#[derive(Parser)]
#[command(
    name = "diarisk",
    version,
    about = "Diabetes risk screening from eight clinical measurements",
    long_about = "Score a patient's diabetes risk with a fitted classifier.\n\n\
                  Results can be exported as PDF or CSV and are appended to a\n\
                  shared results log that leaders and professionals can review."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Prefix log lines with a timestamp (pretty and compact formats).
    #[arg(long = "log-timestamps", global = true)]
    pub log_timestamps: bool,

    /// Include the module target in log lines.
    #[arg(long = "log-target", global = true)]
    pub log_target: bool,

    /// Allow patient names and email addresses in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Settings file (default: DIARISK_CONFIG, then the platform config dir).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Evaluate one patient's diabetes risk.
    Evaluate(EvaluateArgs),

    /// Download the results log visible to an email address.
    Records(RecordsArgs),

    /// List the clinical fields with their ranges and defaults.
    Fields,
}

#[derive(Parser)]
pub struct EvaluateArgs {
    /// Insulin (µU/ml).
    #[arg(long, value_parser = field_parser(ClinicalField::Insulin))]
    pub insulin: Option<f64>,

    /// Diabetes pedigree function.
    #[arg(long = "dpf", value_parser = field_parser(ClinicalField::DiabetesPedigreeFunction))]
    pub diabetes_pedigree_function: Option<f64>,

    /// Age in years.
    #[arg(long, value_parser = field_parser(ClinicalField::Age))]
    pub age: Option<f64>,

    /// Number of pregnancies.
    #[arg(long, value_parser = field_parser(ClinicalField::Pregnancies))]
    pub pregnancies: Option<f64>,

    /// Plasma glucose (mg/dl).
    #[arg(long, value_parser = field_parser(ClinicalField::Glucose))]
    pub glucose: Option<f64>,

    /// Diastolic blood pressure (mm Hg).
    #[arg(long = "blood-pressure", value_parser = field_parser(ClinicalField::BloodPressure))]
    pub blood_pressure: Option<f64>,

    /// Triceps skin fold thickness (mm).
    #[arg(long = "skin-thickness", value_parser = field_parser(ClinicalField::SkinThickness))]
    pub skin_thickness: Option<f64>,

    /// Body mass index.
    #[arg(long, value_parser = field_parser(ClinicalField::Bmi))]
    pub bmi: Option<f64>,

    /// Patient name.
    #[arg(long = "name", value_name = "NAME")]
    pub patient_name: Option<String>,

    /// Professional or centre.
    #[arg(long, value_name = "NAME")]
    pub professional: Option<String>,

    /// Professional email, used to filter the results log later.
    #[arg(long, value_name = "EMAIL")]
    pub email: Option<String>,

    /// Satisfaction with the tool.
    #[arg(long, value_enum)]
    pub satisfaction: Option<SatisfactionArg>,

    /// How well the result was understood, 0 to 10.
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub comprehension: Option<u8>,

    /// Write a PDF report to this path.
    #[arg(long, value_name = "PATH")]
    pub pdf: Option<PathBuf>,

    /// Write the eight input values as CSV to this path.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Do not append the evaluation to the results log.
    #[arg(long = "no-record")]
    pub no_record: bool,

    /// Decision threshold in [0, 1] (overrides settings and the model's own).
    #[arg(long, value_parser = parse_threshold)]
    pub threshold: Option<f64>,

    /// Print the stored evaluation as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

impl EvaluateArgs {
    /// Supplied field values, in [`ClinicalField::ALL`] order.
    pub fn field_values(&self) -> [Option<f64>; 8] {
        ClinicalField::ALL.map(|field| match field {
            ClinicalField::Insulin => self.insulin,
            ClinicalField::DiabetesPedigreeFunction => self.diabetes_pedigree_function,
            ClinicalField::Age => self.age,
            ClinicalField::Pregnancies => self.pregnancies,
            ClinicalField::Glucose => self.glucose,
            ClinicalField::BloodPressure => self.blood_pressure,
            ClinicalField::SkinThickness => self.skin_thickness,
            ClinicalField::Bmi => self.bmi,
        })
    }
}

#[derive(Parser)]
pub struct RecordsArgs {
    /// Email address requesting access.
    #[arg(long, value_name = "EMAIL")]
    pub email: String,

    /// Write the CSV here instead of stdout.
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SatisfactionArg {
    VeryDissatisfied,
    Dissatisfied,
    Neutral,
    Satisfied,
    VerySatisfied,
}

impl From<SatisfactionArg> for SatisfactionRating {
    fn from(arg: SatisfactionArg) -> Self {
        match arg {
            SatisfactionArg::VeryDissatisfied => SatisfactionRating::VeryDissatisfied,
            SatisfactionArg::Dissatisfied => SatisfactionRating::Dissatisfied,
            SatisfactionArg::Neutral => SatisfactionRating::Neutral,
            SatisfactionArg::Satisfied => SatisfactionRating::Satisfied,
            SatisfactionArg::VerySatisfied => SatisfactionRating::VerySatisfied,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

/// Parser enforcing the field's range and integer constraint.
fn field_parser(
    field: ClinicalField,
) -> impl Fn(&str) -> Result<f64, String> + Clone + Send + Sync + 'static {
    move |raw: &str| {
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| format!("'{raw}' is not a number"))?;
        field.spec().check(value).map_err(|e| e.to_string())
    }
}

fn parse_threshold(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not a number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("threshold must be between 0 and 1, got {value}"))
    }
}
