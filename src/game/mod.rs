mod level;
mod session;
mod zones;

pub use level::DemoLevel;
pub use session::{FrameReport, GlitchSession, PlayerPose};
pub use zones::{TriggerZone, ZoneTransition, Zones};
