//! The simulation engine — the heart of Sink.
//!
//! TICK ORDER (fixed, documented, never reordered):
//!   1. Turn counter
//!   2. Storm             (storm_chance)
//!   3. New leak          (leak_chance, independent of the storm)
//!   4. Flooding          (leak inflow against pump output)
//!   5. Pump decay
//!   6. Termination check
//!
//! RULES:
//!   - The simulation only advances when a crew member acts. There is no
//!     wall-clock tick; an idle channel never changes.
//!   - Every precondition is checked before the first mutation, so a
//!     rejected action leaves the game exactly as it was.
//!   - All randomness flows through the `SinkRng` handed in by the caller.
//!   - Every state change is recorded as a `GameEvent` and logged.

use crate::{
    command::Action,
    config::{Difficulty, ScenarioConfig},
    error::{ActionError, ActionResult},
    event::GameEvent,
    game::{Game, Leak, Outcome, Resource},
    rng::SinkRng,
    types::{Turn, UserId},
};

/// Turn from which a stabilized ship counts as saved.
pub const WIN_TURN: Turn = 20;
/// Water at or below this level counts as stabilized.
pub const SAFE_WATER: i32 = 15;
/// Water at or above this level costs morale every tick.
pub const FLOOD_MORALE_LINE: i32 = 70;
/// Water at or above this level also strains the hull every tick.
pub const FLOOD_HULL_LINE: i32 = 85;
/// Water at which the ship founders.
pub const SUNK_WATER: i32 = 100;

pub const LEAK_LOCATIONS: [&str; 6] = [
    "Cargo hold",
    "Galley",
    "Cabin deck",
    "Engine room",
    "Starboard hull",
    "Port hull",
];

const FIRST_LEAK_LOCATION: &str = "Engine room";

/// Base chance that a patch holds, before the morale bonus.
const PATCH_BASE_CHANCE: f64 = 0.65;

pub struct SinkEngine {
    config: ScenarioConfig,
}

impl SinkEngine {
    /// Build an engine over `config`. Rejects tables the tick could not
    /// roll against, such as an empty leak-rate range.
    pub fn new(config: ScenarioConfig) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Start a new scenario with `captain_id` as the only crew member and a
    /// single leak already open in the engine room.
    pub fn create(
        &self,
        difficulty: Difficulty,
        captain_id: impl Into<UserId>,
        rng: &mut impl SinkRng,
    ) -> Game {
        let params = self.config.params(difficulty);
        let rate = rng.range_inclusive(params.leak_rate_min, params.leak_rate_min + 2);
        let first_leak = Leak {
            id: 1,
            location: FIRST_LEAK_LOCATION.to_string(),
            rate,
            patched: false,
        };
        let game = Game::new(difficulty, params, captain_id.into(), first_leak);
        log::info!(
            "New game: difficulty={} captain={} first leak rate={rate}",
            difficulty,
            game.captain_id()
        );
        game
    }

    /// Apply one crew action. On success returns every event the action
    /// produced, in order; each one has also been appended to the log.
    pub fn apply_action(
        &self,
        game: &mut Game,
        action: Action,
        user_id: &str,
        rng: &mut impl SinkRng,
    ) -> ActionResult<Vec<GameEvent>> {
        check_can_act(game, user_id)?;
        Ok(resolve(game, action, user_id, rng))
    }

    /// String entry point for hosts that forward raw button ids or command
    /// tokens. Checks run in the same order as `apply_action`, so an unknown
    /// token on an ended game still reports that the game is not running.
    pub fn apply_action_str(
        &self,
        game: &mut Game,
        action: &str,
        user_id: &str,
        rng: &mut impl SinkRng,
    ) -> ActionResult<Vec<GameEvent>> {
        check_can_act(game, user_id)?;
        let action: Action = action.parse()?;
        Ok(resolve(game, action, user_id, rng))
    }
}

impl Default for SinkEngine {
    fn default() -> Self {
        Self { config: ScenarioConfig::default() }
    }
}

/// Advisory crew check for hosts deciding which controls to show.
/// `apply_action` always re-checks.
pub fn is_crew_member(game: &Game, user_id: &str) -> bool {
    game.is_crew(user_id)
}

/// Chance that a patch holds at the given morale. Ranges from 0.65 to 0.9.
pub fn patch_success_chance(morale: i32) -> f64 {
    PATCH_BASE_CHANCE + f64::from(morale) / 400.0
}

/// Water removed by the pumps this tick: pumps/10, rounded half up.
pub fn pump_output(pumps: i32) -> i32 {
    (pumps + 5) / 10
}

fn check_can_act(game: &Game, user_id: &str) -> ActionResult<()> {
    if !game.is_running() {
        return Err(ActionError::NotRunning);
    }
    if !game.is_crew(user_id) {
        log::debug!("Rejected action from non-crew user {user_id}");
        return Err(ActionError::NotCrew);
    }
    Ok(())
}

/// Everything after validation. Infallible by construction.
fn resolve(game: &mut Game, action: Action, user_id: &str, rng: &mut impl SinkRng) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let user = user_id.to_string();

    match action {
        Action::Patch   => patch(game, user, rng, &mut events),
        Action::Bail    => bail(game, user, rng, &mut events),
        Action::Brace   => {
            game.adjust(Resource::Morale, 4);
            game.adjust(Resource::Pumps, 2);
            emit(game, &mut events, GameEvent::Braced { user });
        }
        Action::Tick    => emit(game, &mut events, GameEvent::Waited { user }),
        Action::Abandon => {
            game.finish(Outcome::Abandoned);
            emit(game, &mut events, GameEvent::Abandoned { user });
            log::info!("Game abandoned at turn {}", game.turn());
        }
    }

    if action.advances_turn() {
        tick(game, rng, &mut events);
    }
    end_if_needed(game, &mut events);
    events
}

fn emit(game: &mut Game, events: &mut Vec<GameEvent>, event: GameEvent) {
    game.record(&event);
    events.push(event);
}

/// Always targets the oldest unpatched leak; players cannot choose.
fn patch(game: &mut Game, user: UserId, rng: &mut impl SinkRng, events: &mut Vec<GameEvent>) {
    let Some(idx) = game.leaks.iter().position(|l| !l.patched) else {
        emit(game, events, GameEvent::NoLeaksFound { user });
        return;
    };

    let leak_id = game.leaks[idx].id;
    if rng.chance(patch_success_chance(game.morale())) {
        game.leaks[idx].patched = true;
        game.adjust(Resource::Morale, 2);
        let location = game.leaks[idx].location.clone();
        emit(game, events, GameEvent::LeakPatched { user, leak_id, location });
    } else {
        game.adjust(Resource::Morale, -2);
        game.adjust(Resource::Hull, -1);
        emit(game, events, GameEvent::PatchFailed { user, leak_id });
    }
}

fn bail(game: &mut Game, user: UserId, rng: &mut impl SinkRng, events: &mut Vec<GameEvent>) {
    let attempt = game.params().bail_power + rng.range_inclusive(-3, 3);
    let amount = -game.adjust(Resource::Water, -attempt);
    game.adjust(Resource::Morale, -1);
    let pump_repair = rng.range_inclusive(0, 3);
    game.adjust(Resource::Pumps, pump_repair);
    emit(game, events, GameEvent::Bailed { user, amount });
}

fn tick(game: &mut Game, rng: &mut impl SinkRng, events: &mut Vec<GameEvent>) {
    game.turn += 1;
    let turn = game.turn;
    let params = *game.params();

    // Storm: one combined hit.
    if rng.chance(params.storm_chance) {
        let hit = rng.range_inclusive(4, 10);
        let hull_damage = -game.adjust(Resource::Hull, -hit);
        let pump_damage = rng.range_inclusive(2, 8);
        game.adjust(Resource::Pumps, -pump_damage);
        let morale_loss = rng.range_inclusive(3, 7);
        game.adjust(Resource::Morale, -morale_loss);
        emit(game, events, GameEvent::StormHit { turn, hull_damage });
    }

    // New leak.
    if rng.chance(params.leak_chance) {
        let leak_id = game.next_leak_id();
        let location = LEAK_LOCATIONS[rng.pick_index(LEAK_LOCATIONS.len())].to_string();
        let rate = rng.range_inclusive(params.leak_rate_min, params.leak_rate_max);
        game.leaks.push(Leak { id: leak_id, location: location.clone(), rate, patched: false });
        let strain = rng.range_inclusive(1, 4);
        game.adjust(Resource::Hull, -strain);
        emit(game, events, GameEvent::LeakOpened { turn, leak_id, location, rate });
    }

    // Flooding.
    let inflow = game.inflow();
    let drained = pump_output(game.pumps());
    game.adjust(Resource::Water, inflow - drained);
    if game.water() >= FLOOD_MORALE_LINE {
        game.adjust(Resource::Morale, -2);
    }
    if game.water() >= FLOOD_HULL_LINE {
        game.adjust(Resource::Hull, -2);
    }

    // Pump decay.
    if game.pumps() > 0 {
        let wear = rng.range_inclusive(1, 3);
        game.adjust(Resource::Pumps, -wear);
    }

    log::debug!(
        "turn={turn} hull={} water={} pumps={} morale={} inflow={inflow} drained={drained} open_leaks={}",
        game.hull(),
        game.water(),
        game.pumps(),
        game.morale(),
        game.active_leaks().count()
    );
}

/// Loss is checked before the win, so a ship that founders on turn 20
/// is lost even with every leak sealed.
fn end_if_needed(game: &mut Game, events: &mut Vec<GameEvent>) {
    if !game.is_running() {
        return;
    }
    let turn = game.turn();

    if game.hull() <= 0 || game.water() >= SUNK_WATER || game.morale() <= 0 {
        game.finish(Outcome::Lost);
        emit(game, events, GameEvent::ShipLost { turn });
        log::info!(
            "Ship lost at turn {turn} (hull={} water={} morale={})",
            game.hull(),
            game.water(),
            game.morale()
        );
        return;
    }

    if turn >= WIN_TURN && game.water() <= SAFE_WATER && game.all_leaks_patched() {
        game.finish(Outcome::Saved);
        emit(game, events, GameEvent::ShipSaved { turn });
        log::info!("Ship saved at turn {turn}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::DifficultyParams,
        game::GameStatus,
        rng::{FixedRng, Pick},
    };

    fn engine() -> SinkEngine {
        SinkEngine::default()
    }

    #[test]
    fn patch_chance_scales_with_morale() {
        assert!((patch_success_chance(0) - 0.65).abs() < 1e-12);
        assert!((patch_success_chance(100) - 0.9).abs() < 1e-12);
        assert!(patch_success_chance(80) > patch_success_chance(40));
    }

    #[test]
    fn pump_output_rounds_half_up() {
        assert_eq!(pump_output(75), 8);
        assert_eq!(pump_output(74), 7);
        assert_eq!(pump_output(5), 1);
        assert_eq!(pump_output(4), 0);
        assert_eq!(pump_output(0), 0);
        assert_eq!(pump_output(100), 10);
    }

    #[test]
    fn seeded_leak_rate_uses_narrow_range() {
        let e = engine();
        let low = e.create(Difficulty::Hard, "cap", &mut FixedRng::new(0.5, Pick::Min));
        let high = e.create(Difficulty::Hard, "cap", &mut FixedRng::new(0.5, Pick::Max));
        assert_eq!(low.leaks()[0].rate, 6);
        assert_eq!(high.leaks()[0].rate, 8);
        assert_eq!(high.leaks()[0].location, "Engine room");
    }

    #[test]
    fn calm_tick_only_moves_water_and_pumps() {
        let e = engine();
        let mut rng = FixedRng::calm_seas();
        let mut game = e.create(Difficulty::Normal, "cap", &mut rng);
        // Normal, mid pick: first leak rate 5.
        let events = e.apply_action(&mut game, Action::Tick, "cap", &mut rng).unwrap();

        assert_eq!(events, vec![GameEvent::Waited { user: "cap".into() }]);
        assert_eq!(game.turn(), 1);
        assert_eq!(game.hull(), 100);
        assert_eq!(game.morale(), 80);
        // 5 in, 8 out from a floor of 0.
        assert_eq!(game.water(), 0);
        assert_eq!(game.pumps(), 73);
    }

    #[test]
    fn failed_patch_costs_morale_and_hull() {
        let e = engine();
        // 0.99 beats every chance: patches fail, no storms, no leaks.
        let mut rng = FixedRng::new(0.99, Pick::Min);
        let mut game = e.create(Difficulty::Normal, "cap", &mut rng);
        let events = e.apply_action(&mut game, Action::Patch, "cap", &mut rng).unwrap();

        assert_eq!(events[0], GameEvent::PatchFailed { user: "cap".into(), leak_id: 1 });
        assert!(!game.leaks()[0].patched);
        assert_eq!(game.morale(), 78);
        assert_eq!(game.hull(), 99);
    }

    #[test]
    fn patch_with_nothing_to_patch_only_logs() {
        let e = engine();
        let mut rng = FixedRng::calm_seas();
        let mut game = e.create(Difficulty::Easy, "cap", &mut rng);
        e.apply_action(&mut game, Action::Patch, "cap", &mut rng).unwrap();
        let morale = game.morale();
        let hull = game.hull();

        let events = e.apply_action(&mut game, Action::Patch, "cap", &mut rng).unwrap();
        assert_eq!(events[0], GameEvent::NoLeaksFound { user: "cap".into() });
        assert_eq!(game.morale(), morale);
        assert_eq!(game.hull(), hull);
        assert!(game.log().iter().any(|l| l.contains("none remain")));
    }

    #[test]
    fn bail_reports_water_actually_removed() {
        let e = engine();
        let mut rng = FixedRng::new(0.99, Pick::Max);
        let mut game = e.create(Difficulty::Normal, "cap", &mut rng);
        let events = e.apply_action(&mut game, Action::Bail, "cap", &mut rng).unwrap();
        // The ship starts dry, so nothing comes out.
        assert_eq!(events[0], GameEvent::Bailed { user: "cap".into(), amount: 0 });
        assert_eq!(game.morale(), 79);
    }

    #[test]
    fn brace_lifts_morale_and_pumps() {
        let e = engine();
        let mut rng = FixedRng::new(0.99, Pick::Min);
        let mut game = e.create(Difficulty::Normal, "cap", &mut rng);
        e.apply_action(&mut game, Action::Brace, "cap", &mut rng).unwrap();
        assert_eq!(game.morale(), 84);
        // +2 from bracing, -1 pump wear.
        assert_eq!(game.pumps(), 76);
    }

    #[test]
    fn worst_case_tick_hits_every_hazard() {
        let e = engine();
        let mut rng = FixedRng::worst_case();
        let mut game = e.create(Difficulty::Normal, "cap", &mut rng);
        let events = e.apply_action(&mut game, Action::Tick, "cap", &mut rng).unwrap();

        assert!(matches!(events[1], GameEvent::StormHit { turn: 1, hull_damage: 10 }));
        assert!(matches!(events[2], GameEvent::LeakOpened { leak_id: 2, rate: 10, .. }));
        // 10 storm + 4 leak strain.
        assert_eq!(game.hull(), 86);
        assert_eq!(game.leaks().len(), 2);
        assert_eq!(game.leaks()[1].location, "Port hull");
    }

    #[test]
    fn abandon_skips_tick_and_randomness() {
        struct NoDraws;
        impl SinkRng for NoDraws {
            fn next_f64(&mut self) -> f64 {
                panic!("abandon must not roll")
            }
            fn range_inclusive(&mut self, _: i32, _: i32) -> i32 {
                panic!("abandon must not roll")
            }
        }

        let e = engine();
        let mut game = e.create(Difficulty::Easy, "cap", &mut FixedRng::calm_seas());
        let events = e.apply_action(&mut game, Action::Abandon, "cap", &mut NoDraws).unwrap();

        assert_eq!(events, vec![GameEvent::Abandoned { user: "cap".into() }]);
        assert_eq!(game.status(), GameStatus::Ended);
        assert_eq!(game.outcome(), Some(Outcome::Abandoned));
        assert_eq!(game.turn(), 0);
    }

    #[test]
    fn string_entry_point_checks_state_before_token() {
        let e = engine();
        let mut rng = FixedRng::calm_seas();
        let mut game = e.create(Difficulty::Easy, "cap", &mut rng);

        assert_eq!(
            e.apply_action_str(&mut game, "dance", "cap", &mut rng),
            Err(ActionError::UnknownAction("dance".into()))
        );
        assert_eq!(
            e.apply_action_str(&mut game, "dance", "stranger", &mut rng),
            Err(ActionError::NotCrew)
        );

        e.apply_action_str(&mut game, "abandon", "cap", &mut rng).unwrap();
        assert_eq!(
            e.apply_action_str(&mut game, "dance", "cap", &mut rng),
            Err(ActionError::NotRunning)
        );
    }

    fn quiet_hard_engine() -> SinkEngine {
        let mut config = ScenarioConfig::default();
        config.hard = DifficultyParams { storm_chance: 0.0, leak_chance: 0.0, ..DifficultyParams::HARD };
        SinkEngine::new(config).unwrap()
    }

    #[test]
    fn flooding_penalties_kick_in_at_their_lines() {
        let e = quiet_hard_engine();
        // One leak at rate 8; the pumps lose 3 a turn and fall behind.
        let mut rng = FixedRng::new(0.99, Pick::Max);
        let mut game = e.create(Difficulty::Hard, "cap", &mut rng);
        for _ in 0..20 {
            e.apply_action(&mut game, Action::Tick, "cap", &mut rng).unwrap();
        }
        assert_eq!(game.water(), 66);
        assert_eq!((game.morale(), game.hull()), (80, 100));

        // Turn 21: water crosses 70, morale only.
        let events = e.apply_action(&mut game, Action::Tick, "cap", &mut rng).unwrap();
        assert_eq!(events, vec![GameEvent::Waited { user: "cap".into() }]);
        assert_eq!(game.water(), 72);
        assert_eq!((game.morale(), game.hull()), (78, 100));

        e.apply_action(&mut game, Action::Tick, "cap", &mut rng).unwrap();
        assert_eq!(game.water(), 79);
        assert_eq!((game.morale(), game.hull()), (76, 100));

        // Turn 23: past 85, both penalties land in the same tick.
        e.apply_action(&mut game, Action::Tick, "cap", &mut rng).unwrap();
        assert_eq!(game.water(), 86);
        assert_eq!((game.morale(), game.hull()), (74, 98));

        // Turn 25: the pumps give out as the ship fills.
        e.apply_action(&mut game, Action::Tick, "cap", &mut rng).unwrap();
        let events = e.apply_action(&mut game, Action::Tick, "cap", &mut rng).unwrap();
        assert_eq!(game.pumps(), 0);
        assert_eq!(game.water(), 100);
        assert_eq!(events.last(), Some(&GameEvent::ShipLost { turn: 25 }));
    }

    #[test]
    fn dead_pumps_do_not_decay_further() {
        struct FloatsOnly;
        impl SinkRng for FloatsOnly {
            fn next_f64(&mut self) -> f64 {
                0.99
            }
            fn range_inclusive(&mut self, min: i32, max: i32) -> i32 {
                panic!("unexpected range roll [{min}, {max}]")
            }
        }

        let e = quiet_hard_engine();
        let mut game = e.create(Difficulty::Hard, "cap", &mut FixedRng::calm_seas());
        game.leaks[0].patched = true;
        game.pumps = 0;

        for _ in 0..3 {
            e.apply_action(&mut game, Action::Tick, "cap", &mut FloatsOnly).unwrap();
        }
        assert_eq!(game.pumps(), 0);
        assert_eq!(game.water(), 0);
        assert_eq!(game.turn(), 3);
    }

    #[test]
    fn engine_rejects_an_empty_leak_rate_range() {
        let mut config = ScenarioConfig::default();
        config.normal = DifficultyParams {
            leak_rate_min: 8,
            leak_rate_max: 5,
            leak_chance: 1.0,
            ..DifficultyParams::NORMAL
        };
        let err = SinkEngine::new(config).err().expect("invalid config accepted");
        assert!(err.to_string().contains("leak_rate_min"));
    }
}
