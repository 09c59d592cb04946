pub mod chat;
pub mod gemini;
pub mod normalizer;
