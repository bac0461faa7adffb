//! Fixtures shared by unit tests

use rcheevos_api::{
    Achievement, AchievementSet, AchievementSetType, AchievementType, Game, GameId, Leaderboard,
    SetId,
};

pub fn achievement(id: i64, game_id: i64, set_id: i64, display_order: i32) -> Achievement {
    Achievement {
        id,
        game_id: GameId(game_id),
        set_id: SetId(set_id),
        total_awards_casual: 10,
        total_awards_hardcore: 5,
        title: format!("Achievement {}", id),
        description: format!("Description {}", id),
        points: 5,
        display_order,
        badge_url_unlocked: format!("https://media.example/Badge/{}.png", id),
        badge_url_locked: format!("https://media.example/Badge/{}_lock.png", id),
        memory_address: "0xH0001=1".to_string(),
        achievement_type: AchievementType::Core,
    }
}

pub fn leaderboard(id: i64, game_id: i64, set_id: i64) -> Leaderboard {
    Leaderboard {
        id,
        game_id: GameId(game_id),
        set_id: SetId(set_id),
        memory_address: "STA:0xH0001=1::CAN:0=1::SUB:0=1::VAL:0xH0002".to_string(),
        format: "SCORE".to_string(),
        lower_is_better: false,
        title: format!("Leaderboard {}", id),
        description: String::new(),
        hidden: false,
    }
}

pub fn achievement_set(
    id: i64,
    game_id: i64,
    set_type: AchievementSetType,
    achievement_ids: &[i64],
    leaderboard_ids: &[i64],
) -> AchievementSet {
    AchievementSet {
        id: SetId(id),
        game_id: GameId(game_id),
        title: None,
        set_type,
        icon_url: String::new(),
        achievements: achievement_ids
            .iter()
            .enumerate()
            .map(|(order, a)| achievement(*a, game_id, id, order as i32))
            .collect(),
        leaderboards: leaderboard_ids
            .iter()
            .map(|l| leaderboard(*l, game_id, id))
            .collect(),
    }
}

pub fn game(id: i64, sets: Vec<AchievementSet>) -> Game {
    Game {
        id: GameId(id),
        title: format!("Game {}", id),
        icon_url: format!("https://media.example/Images/{}.png", id),
        rich_presence_patch: None,
        sets,
    }
}
