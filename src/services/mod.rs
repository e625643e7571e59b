pub mod suggestion;

pub use suggestion::{SuggestionClient, SuggestionError};
