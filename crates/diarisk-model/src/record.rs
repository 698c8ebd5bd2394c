use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::field::ClinicalField;

/// The eight clinical measurements of one patient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClinicalRecord {
    pub insulin: f64,
    pub diabetes_pedigree_function: f64,
    pub age: u32,
    pub pregnancies: u32,
    pub glucose: u32,
    pub blood_pressure: u32,
    pub skin_thickness: u32,
    pub bmi: f64,
}

impl Default for ClinicalRecord {
    fn default() -> Self {
        Self {
            insulin: 30.5,
            diabetes_pedigree_function: 0.37,
            age: 29,
            pregnancies: 3,
            glucose: 117,
            blood_pressure: 72,
            skin_thickness: 23,
            bmi: 32.0,
        }
    }
}

impl ClinicalRecord {
    pub fn get(&self, field: ClinicalField) -> f64 {
        match field {
            ClinicalField::Insulin => self.insulin,
            ClinicalField::DiabetesPedigreeFunction => self.diabetes_pedigree_function,
            ClinicalField::Age => f64::from(self.age),
            ClinicalField::Pregnancies => f64::from(self.pregnancies),
            ClinicalField::Glucose => f64::from(self.glucose),
            ClinicalField::BloodPressure => f64::from(self.blood_pressure),
            ClinicalField::SkinThickness => f64::from(self.skin_thickness),
            ClinicalField::Bmi => self.bmi,
        }
    }

    /// Values in [`ClinicalField::ALL`] order.
    pub fn values(&self) -> [f64; 8] {
        ClinicalField::ALL.map(|field| self.get(field))
    }

    /// Build a record from values in [`ClinicalField::ALL`] order, checking
    /// every value against its field spec.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails [`crate::FieldSpec::check`].
    pub fn from_values(values: [f64; 8]) -> Result<Self> {
        for field in ClinicalField::ALL {
            field.spec().check(values[field.index()])?;
        }
        // Integer fields are range-checked above, so the casts are lossless.
        let int = |field: ClinicalField| values[field.index()] as u32;
        Ok(Self {
            insulin: values[ClinicalField::Insulin.index()],
            diabetes_pedigree_function: values[ClinicalField::DiabetesPedigreeFunction.index()],
            age: int(ClinicalField::Age),
            pregnancies: int(ClinicalField::Pregnancies),
            glucose: int(ClinicalField::Glucose),
            blood_pressure: int(ClinicalField::BloodPressure),
            skin_thickness: int(ClinicalField::SkinThickness),
            bmi: values[ClinicalField::Bmi.index()],
        })
    }

    /// `(column, formatted value)` pairs in canonical order.
    pub fn formatted_values(&self) -> Vec<(&'static str, String)> {
        ClinicalField::ALL
            .iter()
            .map(|field| (field.column(), field.spec().format_value(self.get(*field))))
            .collect()
    }
}
