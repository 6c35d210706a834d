mod scene;
mod session;

pub use scene::{AVATAR_LIFT, ShatterAssets, setup_scene};
pub use session::setup_session;
