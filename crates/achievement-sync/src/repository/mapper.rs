use crate::models::{GameHashEntry, UserAchievementSet, UserGameData};
use rcheevos_api::{Game, GameId};
use std::collections::{HashMap, HashSet};

pub(crate) fn hash_library_entries(library: &HashMap<String, GameId>) -> Vec<GameHashEntry> {
    library
        .iter()
        .map(|(hash, game_id)| GameHashEntry {
            game_hash: hash.to_ascii_lowercase(),
            game_id: game_id.0,
        })
        .collect()
}

pub(crate) fn user_game_data(
    game: Game,
    unlocked: &HashSet<i64>,
    for_hardcore_mode: bool,
) -> UserGameData {
    UserGameData {
        game_id: game.id,
        title: game.title,
        icon_url: game.icon_url,
        rich_presence_patch: game.rich_presence_patch,
        sets: game
            .sets
            .into_iter()
            .map(|set| UserAchievementSet::from_set(set, unlocked, for_hardcore_mode))
            .collect(),
    }
}
