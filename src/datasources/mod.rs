pub mod geolocation;
pub mod llm;
pub mod nominatim;

pub use geolocation::{acquire_position, FixedPosition, PositionOptions, PositionProvider};
pub use llm::{generate_structured, GeminiClient, LanguageModel, Prompt};
pub use nominatim::{NominatimClient, PlaceSearch};
