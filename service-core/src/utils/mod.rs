pub mod json;

pub use json::TypedJson;
