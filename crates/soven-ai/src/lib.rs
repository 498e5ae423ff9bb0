pub mod classify;
pub mod client;
pub mod deadlines;
pub mod negotiate;
pub mod requirements;
pub mod scanner;

pub use classify::QueryClassifier;
pub use client::{GeminiClient, GenerativeModel, ModelError, ModelRequest};
pub use deadlines::DeadlineGenerator;
pub use negotiate::NegotiationAssistant;
pub use requirements::RequirementResolver;
pub use scanner::DocumentScanner;
