//! Turn-by-turn planning loop over the skirmish game.

use anyhow::{Context, Result};
use games_skirmish::{render_map, Action, Skirmish, State};
use mcts::{rng_from_seed, ElasticSearch, ForwardModel, MctsSearch, Plan};
use rand_chacha::ChaCha20Rng;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{Agent, Config};

/// Result of one planning run plus the replayed game state.
#[derive(Debug, Clone)]
pub struct Turn {
    /// 1-based run number
    pub run: u32,
    pub plan: Plan<Action>,
    /// State stored at the plan's final node
    pub predicted: State,
    /// State after replaying the plan on the real game
    pub state: State,
    /// Rendered search tree, only kept in debug mode
    pub tree: Option<String>,
}

/// Aggregated stats for a planning session.
#[derive(Debug, Default, Clone)]
pub struct SessionStats {
    /// Number of planning runs performed
    pub runs: u32,
    /// Search iterations across all runs
    pub iterations: u64,
    /// Wall-clock time spent searching
    pub search_time: Duration,
    /// Actions replayed on the real game
    pub actions_applied: usize,
}

impl SessionStats {
    fn add(&mut self, turn: &Turn) {
        self.runs += 1;
        self.iterations += turn.plan.iterations;
        self.search_time += turn.plan.elapsed;
        self.actions_applied += turn.plan.len();
    }

    /// Log a summary of the session.
    pub fn log_summary(&self, agent: Agent, final_state: &State) {
        let avg_iterations = if self.runs > 0 {
            self.iterations as f64 / self.runs as f64
        } else {
            0.0
        };

        info!(
            agent = %agent,
            runs = self.runs,
            iterations = self.iterations,
            avg_iterations = format!("{:.1}", avg_iterations),
            search_ms = self.search_time.as_millis() as u64,
            actions = self.actions_applied,
            final_turn = final_state.turn,
            final_reward = format!("{:.2}", final_state.reward()),
            "Planning session finished"
        );
    }
}

/// Plans the player's moves until the game ends or the run cap is hit.
pub struct Planner {
    config: Config,
    agent: Agent,
    game: Skirmish,
    rng: ChaCha20Rng,
    state: State,
    stats: SessionStats,
}

impl Planner {
    pub fn new(config: Config) -> Result<Self> {
        let game = Skirmish::new()
            .with_map_size(config.map_size)
            .with_max_turns(config.max_turns);
        let mut rng = rng_from_seed(config.fixed_seed());

        let state = if config.random_init {
            game.random_state(&mut rng)
        } else {
            game.initial_state()
        };

        Self::from_parts(config, game, rng, state)
    }

    /// Start from an explicit state instead of the configured start.
    pub fn with_state(config: Config, state: State) -> Result<Self> {
        let game = Skirmish::new()
            .with_map_size(config.map_size)
            .with_max_turns(config.max_turns);
        let rng = rng_from_seed(config.fixed_seed());
        Self::from_parts(config, game, rng, state)
    }

    fn from_parts(config: Config, game: Skirmish, rng: ChaCha20Rng, state: State) -> Result<Self> {
        let agent = config.agent_kind()?;

        info!(
            agent = %agent,
            random_init = config.random_init,
            map_size = game.map_size(),
            max_turns = game.max_turns(),
            time_limit_ms = config.time_limit().as_millis() as u64,
            "Planner initialized"
        );
        if agent == Agent::Emcts {
            info!(
                alpha_abs = config.alpha_abs,
                batch_size = config.batch_size,
                eta_r = config.eta_r,
                eta_t = config.eta_t,
                "Elastic abstraction enabled"
            );
        }

        Ok(Self {
            config,
            agent,
            game,
            rng,
            state,
            stats: SessionStats::default(),
        })
    }

    pub fn agent(&self) -> Agent {
        self.agent
    }

    pub fn game(&self) -> &Skirmish {
        &self.game
    }

    /// Current real game state.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Whether the game has ended or the configured run cap is reached.
    pub fn is_finished(&self) -> bool {
        let capped = self.config.max_runs != 0 && self.stats.runs >= self.config.max_runs;
        capped || self.game.is_terminal(&self.state)
    }

    /// Search from the current state with a fresh tree.
    ///
    /// Returns the plan, the state at its final node and, in debug mode,
    /// the rendered tree.
    pub fn plan(&mut self) -> Result<(Plan<Action>, State, Option<String>)> {
        let search_config = self.config.search_config();

        match self.agent {
            Agent::Mcts => {
                let mut search = MctsSearch::with_rollouts(&self.game, search_config, self.state);
                let plan = search.run(&mut self.rng)?;
                let predicted = search.tree().get(plan.final_node).state;
                let tree = self.config.debug.then(|| search.tree().render());
                Ok((plan, predicted, tree))
            }
            Agent::Emcts => {
                let mut search = ElasticSearch::with_rollouts(
                    &self.game,
                    search_config,
                    self.config.elastic_config(),
                    self.state,
                );
                let plan = search.run(&mut self.rng)?;
                let predicted = search.tree().get(plan.final_node).state;
                let tree = self.config.debug.then(|| search.tree().render());
                Ok((plan, predicted, tree))
            }
        }
    }

    /// Plan once and replay the plan on the real game.
    ///
    /// Returns `None` when the session is finished or the search found no
    /// action to take.
    pub fn step(&mut self) -> Result<Option<Turn>> {
        if self.is_finished() {
            return Ok(None);
        }

        let run = self.stats.runs + 1;
        let (plan, predicted, tree) = self.plan()?;

        if plan.is_empty() {
            warn!(run, turn = self.state.turn, "Search returned an empty plan, stopping");
            return Ok(None);
        }

        let state = self
            .game
            .apply_sequence(&self.state, &plan.actions)
            .with_context(|| format!("replaying plan {:?}", plan.actions))?;

        info!(
            run,
            iterations = plan.iterations,
            elapsed_ms = plan.elapsed.as_millis() as u64,
            plan = ?plan.actions,
            final_node = %predicted,
            "Planning run complete"
        );
        debug!(
            run,
            live_nodes = plan.stats.live_nodes,
            max_depth = plan.stats.max_depth,
            root_visits = plan.stats.root_visits,
            "Search tree shape"
        );

        let turn = Turn {
            run,
            plan,
            predicted,
            state,
            tree,
        };
        self.stats.add(&turn);
        self.state = state;
        Ok(Some(turn))
    }

    /// Run until finished, handing every turn to `on_turn`.
    pub fn run<F>(&mut self, mut on_turn: F) -> Result<&SessionStats>
    where
        F: FnMut(&Turn, &Skirmish),
    {
        while let Some(turn) = self.step()? {
            on_turn(&turn, &self.game);
        }

        self.stats.log_summary(self.agent, &self.state);
        Ok(&self.stats)
    }
}

/// Human-readable report for one turn, printed by the binary.
pub fn format_turn(turn: &Turn, game: &Skirmish) -> String {
    let actions: Vec<&str> = turn.plan.actions.iter().map(Action::name).collect();
    let mut out = format!("=============== RUN {} ===============\n", turn.run);
    if let Some(tree) = &turn.tree {
        out.push_str(tree);
        out.push('\n');
    }
    out.push_str(&format!("Best action sequence: {:?}\n", actions));
    out.push_str(&format!("Best final node: {}\n", turn.predicted));
    out.push_str(&format!("New state: {}\n", turn.state));
    out.push_str(&render_map(&turn.state, game.map_size()));
    out
}
