//! Crew management: joining, leaving, and the captain's right to end a game.
//!
//! None of these advance the simulation.

use crate::{
    error::CrewError,
    event::GameEvent,
    game::{Game, Outcome},
};

pub fn join_crew(game: &mut Game, user_id: &str) -> Result<GameEvent, CrewError> {
    if !game.is_running() {
        return Err(CrewError::GameEnded);
    }
    if game.is_crew(user_id) {
        return Err(CrewError::AlreadyCrew);
    }
    game.crew.push(user_id.to_string());
    let event = GameEvent::CrewJoined { user: user_id.to_string() };
    game.record(&event);
    Ok(event)
}

/// The captain stays aboard for the whole game.
pub fn leave_crew(game: &mut Game, user_id: &str) -> Result<GameEvent, CrewError> {
    if !game.is_crew(user_id) {
        return Err(CrewError::NotInCrew);
    }
    if user_id == game.captain_id() {
        return Err(CrewError::CaptainCannotLeave);
    }
    game.crew.retain(|c| c != user_id);
    let event = GameEvent::CrewLeft { user: user_id.to_string() };
    game.record(&event);
    Ok(event)
}

pub fn end_game(game: &mut Game, user_id: &str) -> Result<GameEvent, CrewError> {
    if !game.is_running() {
        return Err(CrewError::NotRunning);
    }
    if user_id != game.captain_id() {
        return Err(CrewError::NotCaptain);
    }
    game.finish(Outcome::EndedByCaptain);
    let event = GameEvent::EndedByCaptain;
    game.record(&event);
    log::info!("Game ended by captain at turn {}", game.turn());
    Ok(event)
}
