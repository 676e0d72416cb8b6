pub mod error;
pub mod outcome;

// Re-export the model types so code outside can do
// "use monitron::models::{ClassifiedError, HttpExchange};"
pub use error::ClassifiedError;
pub use outcome::{EventTxn, HttpExchange, MessageKind};
