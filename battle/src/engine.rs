//! Battle state machine.
//!
//! The engine is driven from outside: a presentation layer calls
//! [`BattleEngine::step`] repeatedly and supplies actions with
//! [`BattleEngine::submit_action`] whenever the engine sits in
//! [`Phase::SelectAction`]. Nothing here blocks; waiting for input just means
//! `step` does not advance.
//!
//! ```text
//! Start -> SelectAction -> Attack -> BetweenRounds -> SelectAction ...
//!                 |            |            |
//!                 +------------+------------+--> End
//! ```

use alloc::boxed::Box;
use alloc::string::ToString;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::channel::EventChannel;
use crate::error::{BattleError, BattleResult};
use crate::events::EngineEvent;
use crate::mechanics::BattleMechanics;
use crate::rng::{BattleRng, XorShiftRng};
use crate::types::UnitInstance;
use crate::view::{BattleView, TeamView, UnitView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Start,
    SelectAction,
    Attack,
    BetweenRounds,
    /// Terminal
    End,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Start => "start",
            Phase::SelectAction => "select_action",
            Phase::Attack => "attack",
            Phase::BetweenRounds => "between_rounds",
            Phase::End => "end",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a team does in [`Phase::SelectAction`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Keep the seating
    Attack,
    /// Back unit moves to the front
    RotateClock,
    /// Front unit moves to the back
    RotateCounter,
    Surrender,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Attack => "attack",
            Action::RotateClock => "rotate_clock",
            Action::RotateCounter => "rotate_counter",
            Action::Surrender => "surrender",
        }
    }
}

impl FromStr for Action {
    type Err = BattleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attack" => Ok(Action::Attack),
            "rotate_clock" => Ok(Action::RotateClock),
            "rotate_counter" => Ok(Action::RotateCounter),
            "surrender" => Ok(Action::Surrender),
            _ => Err(BattleError::UnknownAction {
                name: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BattleOutcome {
    /// The only team left with a seated unit
    Victory { team: u32 },
    /// Nobody is left standing
    Draw,
    /// A team gave up
    Surrender { team: u32 },
}

pub struct BattleEngine {
    mechanics: Option<BattleMechanics>,
    phase: Option<Phase>,
    events: EventChannel<EngineEvent>,
    seed: u64,
    outcome: Option<BattleOutcome>,
    finished: bool,
}

impl BattleEngine {
    /// An idle engine. `seed` feeds the turn-order tie-break of every battle
    /// set on it.
    pub fn new(seed: u64) -> Self {
        Self {
            mechanics: None,
            phase: None,
            events: EventChannel::new(),
            seed,
            outcome: None,
            finished: false,
        }
    }

    /// Start a new battle, one team per roster, in turn order
    pub fn set_battle(&mut self, rosters: &[Vec<UnitInstance>]) -> BattleResult<()> {
        let rng = Box::new(XorShiftRng::seed_from_u64(self.seed));
        self.set_battle_with_rng(rosters, rng)
    }

    pub fn set_battle_with_rng(
        &mut self,
        rosters: &[Vec<UnitInstance>],
        rng: Box<dyn BattleRng>,
    ) -> BattleResult<()> {
        let mut mechanics = BattleMechanics::new(rng);
        for roster in rosters {
            mechanics.make_team(roster)?;
        }
        log::debug!("battle set with {} teams", rosters.len());

        self.mechanics = Some(mechanics);
        self.phase = Some(Phase::Start);
        self.outcome = None;
        self.finished = false;
        Ok(())
    }

    pub fn phase(&self) -> Option<Phase> {
        self.phase
    }

    pub fn outcome(&self) -> Option<&BattleOutcome> {
        self.outcome.as_ref()
    }

    pub fn mechanics(&self) -> Option<&BattleMechanics> {
        self.mechanics.as_ref()
    }

    /// Access to the internal channels, e.g. to observe unit events
    pub fn mechanics_mut(&mut self) -> Option<&mut BattleMechanics> {
        self.mechanics.as_mut()
    }

    pub fn events(&self) -> &EventChannel<EngineEvent> {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventChannel<EngineEvent> {
        &mut self.events
    }

    pub fn snapshot(&self) -> BattleView {
        match &self.mechanics {
            Some(mechanics) => BattleView {
                phase: self.phase,
                round: mechanics.round(),
                turn: mechanics.turn() as u32,
                teams: mechanics.teams().iter().map(TeamView::from).collect(),
            },
            None => BattleView {
                phase: None,
                round: 0,
                turn: 0,
                teams: Vec::new(),
            },
        }
    }

    /// Run the current phase once
    pub fn step(&mut self) {
        let (Some(phase), Some(mechanics)) = (self.phase, self.mechanics.as_mut()) else {
            log::warn!("step called with no battle set");
            return;
        };
        mechanics.limits_mut().reset_phase_counters();

        match phase {
            Phase::Start => self.start(),
            Phase::SelectAction => self.select_action(),
            Phase::Attack => self.attack(),
            Phase::BetweenRounds => self.between_rounds(),
            Phase::End => self.end(),
        }
    }

    /// Submit an action by name, as a text front end would
    pub fn submit(&mut self, team: usize, action: &str) -> BattleResult<()> {
        let action = action.parse::<Action>().inspect_err(|err| {
            log::warn!("team {}: {}", team, err);
        })?;
        self.submit_action(team, action)
    }

    /// Resolve `team`'s choice and move on to the attack.
    ///
    /// Rejected actions leave the engine untouched.
    pub fn submit_action(&mut self, team: usize, action: Action) -> BattleResult<()> {
        let (Some(phase), Some(mechanics)) = (self.phase, self.mechanics.as_mut()) else {
            return Err(BattleError::NoBattle);
        };
        if phase != Phase::SelectAction {
            log::warn!("team {}: {} rejected during {}", team, action.as_str(), phase);
            return Err(BattleError::WrongPhase { phase });
        }
        if team >= mechanics.teams().len() {
            log::warn!("{} submitted for unknown team {}", action.as_str(), team);
            return Err(BattleError::InvalidTeam { index: team as u32 });
        }

        log::debug!("team {} chose {}", team, action.as_str());
        match action {
            Action::Attack => {}
            Action::RotateClock => {
                mechanics.rotate_right(team);
            }
            Action::RotateCounter => {
                mechanics.rotate_left(team);
            }
            Action::Surrender => {
                self.outcome = Some(BattleOutcome::Surrender { team: team as u32 });
                self.advance(Phase::End);
                return Ok(());
            }
        }
        self.advance(Phase::Attack);
        Ok(())
    }

    // ==========================================
    // PHASES
    // ==========================================

    fn start(&mut self) {
        self.events.publish(&EngineEvent::BattleStart);
        if let Some(mechanics) = self.mechanics.as_mut() {
            mechanics.create_handlers();
            mechanics.announce_roster();
        }
        self.advance(Phase::SelectAction);
    }

    fn select_action(&mut self) {
        self.events.publish(&EngineEvent::BattleSelectAction);
        self.events.publish(&EngineEvent::RequestInput);
    }

    fn attack(&mut self) {
        self.events.publish(&EngineEvent::BattleAttack);
        let Some(mechanics) = self.mechanics.as_mut() else {
            return;
        };

        mechanics.calculate_turn();
        strike(mechanics, &mut self.events);
        mechanics.cleanup();

        let next = if mechanics.battle_over() {
            Phase::End
        } else {
            // The unit now seated opposite strikes back straight away
            mechanics.flip_turn();
            strike(mechanics, &mut self.events);
            mechanics.cleanup();
            if mechanics.battle_over() {
                Phase::End
            } else {
                Phase::BetweenRounds
            }
        };
        self.advance(next);
    }

    fn between_rounds(&mut self) {
        self.events.publish(&EngineEvent::BattleBetweenRounds);
        let Some(mechanics) = self.mechanics.as_mut() else {
            return;
        };

        mechanics.tick();
        mechanics.cleanup();
        let next = if mechanics.battle_over() {
            Phase::End
        } else {
            mechanics.next_round();
            Phase::SelectAction
        };
        self.advance(next);
    }

    fn end(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        log::debug!("battle ended: {:?}", self.outcome);
        self.events.publish(&EngineEvent::BattleEnd {
            outcome: self.outcome.clone(),
        });
        self.events.publish(&EngineEvent::EndPhase { phase: Phase::End });
    }

    /// Close the current phase and enter `next`
    fn advance(&mut self, next: Phase) {
        if let Some(current) = self.phase {
            self.events.publish(&EngineEvent::EndPhase { phase: current });
            log::debug!("phase {} -> {}", current, next);
        }
        if next == Phase::End && self.outcome.is_none() {
            self.outcome = self.mechanics.as_ref().map(decide_outcome);
        }
        self.phase = Some(next);
    }
}

/// One attack, reported to observers with snapshots taken before cleanup
fn strike(mechanics: &mut BattleMechanics, events: &mut EventChannel<EngineEvent>) {
    let Some(report) = mechanics.attack() else {
        return;
    };
    if let (Some(unit), Some(target)) = (
        mechanics.unit(report.attacker),
        mechanics.unit(report.defender),
    ) {
        events.publish(&EngineEvent::Attack {
            unit: UnitView::from(unit),
            target: UnitView::from(target),
        });
    }
}

fn decide_outcome(mechanics: &BattleMechanics) -> BattleOutcome {
    let mut alive = mechanics.teams().iter().filter(|team| team.is_alive());
    match (alive.next(), alive.next()) {
        (Some(team), None) => BattleOutcome::Victory {
            team: team.index as u32,
        },
        _ => BattleOutcome::Draw,
    }
}
