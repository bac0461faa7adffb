use rcheevos_api::GameId;
use serde::Serialize;
use std::collections::BTreeSet;

/// Per-session state machine.
///
/// Moves forward one step at a time while a session starts. A failed step
/// leaves the machine at the last state it reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
    GameIdentified { game_id: GameId },
    CatalogLoaded { game_id: GameId },
    Active(ActiveSession),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveSession {
    pub game_id: GameId,
    pub game_hash: String,
    pub for_hardcore_mode: bool,
    pub rich_presence_patch: Option<String>,
    /// Achievements whose trigger is armed. Never persisted.
    pub primed_achievements: BTreeSet<i64>,
}

impl SessionState {
    pub fn initial(is_authenticated: bool) -> Self {
        if is_authenticated {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        }
    }

    pub fn game_id(&self) -> Option<GameId> {
        match self {
            SessionState::Unauthenticated | SessionState::Authenticated => None,
            SessionState::GameIdentified { game_id } | SessionState::CatalogLoaded { game_id } => {
                Some(*game_id)
            }
            SessionState::Active(session) => Some(session.game_id),
        }
    }

    pub fn active(&self) -> Option<&ActiveSession> {
        match self {
            SessionState::Active(session) => Some(session),
            _ => None,
        }
    }

    pub fn active_mut(&mut self) -> Option<&mut ActiveSession> {
        match self {
            SessionState::Active(session) => Some(session),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Authenticated => "authenticated",
            SessionState::GameIdentified { .. } => "game-identified",
            SessionState::CatalogLoaded { .. } => "catalog-loaded",
            SessionState::Active(_) => "active",
        }
    }
}
