pub mod estimates;
pub mod farm_parameters;
pub mod location;
pub mod suggestion;

pub use estimates::*;
pub use farm_parameters::*;
pub use location::*;
pub use suggestion::*;
