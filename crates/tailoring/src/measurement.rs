use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use shoploom_core::{CustomerId, DomainError, DomainResult, Entity, MeasurementId, TenantId};
use shoploom_tenancy::{TenantScoped, TenantStamped};

/// Garment the measurements (or a task) are for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GarmentType {
    MensShirt,
    MensTrousers,
    MensSuit,
    WomensDress,
    WomensBlouse,
    WomensSkirt,
    Traditional,
    Other,
}

/// Body dimensions, in the unit the business works in. Only the fields
/// relevant to the garment are filled in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub neck: Option<f64>,
    pub chest: Option<f64>,
    pub waist: Option<f64>,
    pub hips: Option<f64>,
    pub shoulder: Option<f64>,
    pub sleeve_length: Option<f64>,
    pub inseam: Option<f64>,
    pub length: Option<f64>,
}

impl Dimensions {
    fn validate(&self) -> DomainResult<()> {
        let fields = [
            ("neck", self.neck),
            ("chest", self.chest),
            ("waist", self.waist),
            ("hips", self.hips),
            ("shoulder", self.shoulder),
            ("sleeve_length", self.sleeve_length),
            ("inseam", self.inseam),
            ("length", self.length),
        ];
        for (name, value) in fields {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(DomainError::validation(format!(
                        "measurement '{name}' must be a non-negative number"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Creation payload for a measurement record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMeasurement {
    pub customer_id: CustomerId,
    pub garment_type: GarmentType,
    #[serde(default)]
    pub dimensions: Dimensions,
    #[serde(default)]
    pub notes: String,
    pub date_taken: NaiveDate,
}

/// A customer's recorded measurements for one garment type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    id: MeasurementId,
    tenant_id: TenantId,
    customer_id: CustomerId,
    garment_type: GarmentType,
    dimensions: Dimensions,
    notes: String,
    date_taken: NaiveDate,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Measurement {
    pub fn create(
        id: MeasurementId,
        tenant_id: TenantId,
        new: NewMeasurement,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        new.dimensions.validate()?;

        Ok(Self {
            id,
            tenant_id,
            customer_id: new.customer_id,
            garment_type: new.garment_type,
            dimensions: new.dimensions,
            notes: new.notes,
            date_taken: new.date_taken,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn garment_type(&self) -> GarmentType {
        self.garment_type
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn date_taken(&self) -> NaiveDate {
        self.date_taken
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Re-take measurements: replaces the dimensions wholesale.
    pub fn update_dimensions(
        &mut self,
        dimensions: Dimensions,
        date_taken: NaiveDate,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        dimensions.validate()?;
        self.dimensions = dimensions;
        self.date_taken = date_taken;
        self.updated_at = now;
        Ok(())
    }

    pub fn set_notes(&mut self, notes: impl Into<String>, now: DateTime<Utc>) {
        self.notes = notes.into();
        self.updated_at = now;
    }
}

impl Entity for Measurement {
    type Id = MeasurementId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl TenantScoped for Measurement {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

impl TenantStamped for Measurement {
    fn set_tenant_id(&mut self, tenant_id: TenantId) {
        self.tenant_id = tenant_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_measurement(dimensions: Dimensions) -> NewMeasurement {
        NewMeasurement {
            customer_id: CustomerId::new(),
            garment_type: GarmentType::MensShirt,
            dimensions,
            notes: String::new(),
            date_taken: date(2026, 3, 14),
        }
    }

    #[test]
    fn create_accepts_partial_dimensions() {
        let dims = Dimensions {
            neck: Some(15.5),
            chest: Some(40.0),
            ..Dimensions::default()
        };
        let m = Measurement::create(
            MeasurementId::new(),
            TenantId::new(),
            new_measurement(dims),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(m.dimensions().chest, Some(40.0));
        assert_eq!(m.dimensions().waist, None);
    }

    #[test]
    fn negative_dimension_is_rejected() {
        let dims = Dimensions {
            waist: Some(-1.0),
            ..Dimensions::default()
        };
        let err = Measurement::create(
            MeasurementId::new(),
            TenantId::new(),
            new_measurement(dims),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn update_replaces_dimensions_and_date() {
        let mut m = Measurement::create(
            MeasurementId::new(),
            TenantId::new(),
            new_measurement(Dimensions::default()),
            Utc::now(),
        )
        .unwrap();

        let dims = Dimensions {
            hips: Some(38.0),
            ..Dimensions::default()
        };
        m.update_dimensions(dims, date(2026, 4, 1), Utc::now()).unwrap();
        assert_eq!(m.dimensions().hips, Some(38.0));
        assert_eq!(m.date_taken(), date(2026, 4, 1));
    }
}
