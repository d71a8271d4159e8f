pub mod distribution;
pub mod due_date;
pub mod error;
pub mod holiday;
pub mod money;
pub mod taxpayer;
pub mod traits;

pub use distribution::Distribution;
pub use due_date::{DueDate, MonthKey};
pub use error::Error;
pub use holiday::{FixedHoliday, Holiday};
pub use money::Money;
pub use taxpayer::{RegistryRecord, TaxpayerProfile};
pub use traits::{Clock, FixedHolidaySource, RegistryCache, RegistryClient, SystemClock};
