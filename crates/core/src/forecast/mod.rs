pub mod engine;
pub mod error;
pub mod horizon;
pub mod model;
pub mod normalize;
pub mod validate;

pub use engine::{forecast, ForecastEngine, ForecastOptions};
pub use error::ForecastError;
pub use horizon::{resolve_horizon, HorizonError};
pub use model::WeekdayProfile;
pub use normalize::DuplicatePolicy;
