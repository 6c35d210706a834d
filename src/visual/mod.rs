pub mod components;
pub mod fx;
pub mod player;
pub mod plugin;
pub mod setup;
pub mod shatter;
pub mod sync;

pub use plugin::GlitchPlugin;
