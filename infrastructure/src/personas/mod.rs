//! Agent persona loading.

mod loader;

pub use loader::PersonaLoader;
