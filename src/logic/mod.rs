pub mod calculations;
pub mod debounce;
pub mod estimators;
pub mod geocoding;
pub mod planning;
pub mod prompts;
pub mod request_builder;
pub mod session;
pub mod suggestions;

pub use debounce::Debouncer;
pub use estimators::Estimator;
pub use geocoding::Geocoder;
pub use planning::{ConnectionStatus, PlanningService};
pub use session::{ApplyReport, ParameterSession};
pub use suggestions::SuggestionGenerator;
