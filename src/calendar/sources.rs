use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::{Error, FixedHoliday, FixedHolidaySource};

/// Peruvian national holidays that fall on the same day every year.
pub fn peru_fixed_holidays() -> Vec<FixedHoliday> {
    vec![
        FixedHoliday::new(1, 1, "Año Nuevo"),
        FixedHoliday::new(1, 5, "Día del Trabajo"),
        FixedHoliday::new(29, 6, "San Pedro y San Pablo"),
        FixedHoliday::new(23, 7, "Día de la Fuerza Aérea"),
        FixedHoliday::new(28, 7, "Fiestas Patrias"),
        FixedHoliday::new(29, 7, "Fiestas Patrias"),
        FixedHoliday::new(6, 8, "Batalla de Junín"),
        FixedHoliday::new(30, 8, "Santa Rosa de Lima"),
        FixedHoliday::new(8, 10, "Combate de Angamos"),
        FixedHoliday::new(1, 11, "Todos los Santos"),
        FixedHoliday::new(8, 12, "Inmaculada Concepción"),
        FixedHoliday::new(9, 12, "Batalla de Ayacucho"),
        FixedHoliday::new(25, 12, "Navidad"),
    ]
}

#[derive(Debug, Clone)]
pub struct StaticFixedHolidays {
    holidays: Vec<FixedHoliday>,
}

impl StaticFixedHolidays {
    pub fn new(holidays: Vec<FixedHoliday>) -> Self {
        Self { holidays }
    }
}

impl Default for StaticFixedHolidays {
    fn default() -> Self {
        Self::new(peru_fixed_holidays())
    }
}

#[async_trait]
impl FixedHolidaySource for StaticFixedHolidays {
    async fn load(&self) -> Result<Vec<FixedHoliday>, Error> {
        Ok(self.holidays.clone())
    }
}

/// Reads a JSON array of `{"day", "month", "name"}` documents from disk.
#[derive(Debug, Clone)]
pub struct JsonFileHolidays {
    path: PathBuf,
}

impl JsonFileHolidays {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FixedHolidaySource for JsonFileHolidays {
    async fn load(&self) -> Result<Vec<FixedHoliday>, Error> {
        let raw = tokio::fs::read(&self.path).await.map_err(|e| {
            Error::Upstream(format!(
                "Failed to read fixed holidays from {}: {}",
                self.path.display(),
                e
            ))
        })?;
        let holidays: Vec<FixedHoliday> = serde_json::from_slice(&raw).map_err(|e| {
            Error::Upstream(format!(
                "Malformed fixed holidays in {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(holidays)
    }
}
