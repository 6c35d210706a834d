use crate::config::GlitchConfig;
use crate::game::GlitchSession;
use crate::wire::BoardLibrary;
use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// System: load tuning and boards, then build the session and its level
pub fn setup_session(mut commands: Commands) {
    let config = match GlitchConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config, using defaults: {}", e);
            GlitchConfig::default()
        }
    };

    let boards = match BoardLibrary::load() {
        Ok(boards) => {
            info!("✓ Wire board library loaded: {:?}", boards.names());
            boards
        }
        Err(e) => {
            error!("Failed to load wire board library: {}", e);
            panic!("Cannot continue without wire boards");
        }
    };

    let rng = StdRng::from_rng(&mut rand::rng());
    let mut session = match GlitchSession::new(config, &boards, rng) {
        Ok(session) => session,
        Err(e) => {
            error!("Failed to build mirror race: {}", e);
            panic!("Cannot continue without the race board");
        }
    };

    let level = session.spawn_level();
    info!(
        "Session ready: {} hackables, {} guards, race board '{}'",
        session.world().len(),
        level.guards.len(),
        session.config().race.board
    );
    commands.insert_resource(session);
}
