//! Q-learning on a simple 4x4 grid world
//!
//! The agent starts at (0, 0) and must reach the goal at (3, 3). Each step
//! costs -1.0, reaching the goal pays +10.0 and ends the episode. After
//! training, the learned greedy path is printed and the agent is saved to
//! disk and reloaded.

use qlearn::{QAgent, QAgentConfig};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
enum Move {
    Up,
    Down,
    Left,
    Right,
}

const ALL_MOVES: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

struct GridWorld {
    size: i32,
    pos: (i32, i32),
}

impl GridWorld {
    const MAX_STEPS_PER_EPISODE: u32 = 100;

    fn new(size: i32) -> Self {
        Self { size, pos: (0, 0) }
    }

    fn reset(&mut self) -> (i32, i32) {
        self.pos = (0, 0);
        self.pos
    }

    /// Apply a move, returning `(next_state, reward, done)`
    ///
    /// Moves into a wall leave the position unchanged but still cost a step.
    fn step(&mut self, action: Move) -> ((i32, i32), f64, bool) {
        let (row, col) = self.pos;
        self.pos = match action {
            Move::Up => ((row - 1).max(0), col),
            Move::Down => ((row + 1).min(self.size - 1), col),
            Move::Left => (row, (col - 1).max(0)),
            Move::Right => (row, (col + 1).min(self.size - 1)),
        };
        if self.pos == (self.size - 1, self.size - 1) {
            (self.pos, 10.0, true)
        } else {
            (self.pos, -1.0, false)
        }
    }
}

const NUM_EPISODES: u32 = 500;

fn main() -> qlearn::Result<()> {
    env_logger::init();

    let mut env = GridWorld::new(4);
    let mut agent = QAgent::new(QAgentConfig {
        learning_rate: 0.1,
        discount_factor: 0.95,
        epsilon: 1.0,
        epsilon_decay: 0.995,
        epsilon_min: 0.01,
    })?;

    for episode in 0..NUM_EPISODES {
        let mut state = env.reset();
        let mut total_reward = 0.0;
        for _ in 0..GridWorld::MAX_STEPS_PER_EPISODE {
            let action = agent.choose_action(&state, &ALL_MOVES)?;
            let (next_state, reward, done) = env.step(action);
            agent.update(state, action, reward, &next_state, &ALL_MOVES, done);
            total_reward += reward;
            state = next_state;
            if done {
                break;
            }
        }
        agent.decay_epsilon();

        if (episode + 1) % 100 == 0 {
            println!(
                "episode {:>3}: total reward {:>6.1}, epsilon {:.3}",
                episode + 1,
                total_reward,
                agent.epsilon()
            );
        }
    }

    println!("\ntrained: {agent}");
    let stats = agent.stats();
    println!(
        "visited {} states, {} state-action pairs, {} updates ({} explore / {} exploit)",
        stats.states_visited,
        stats.state_action_pairs,
        stats.updates,
        stats.explorations,
        stats.exploitations
    );

    // Walk the greedy policy from the start
    let mut state = env.reset();
    let mut path = vec![state];
    for _ in 0..GridWorld::MAX_STEPS_PER_EPISODE {
        let action = agent.best_action(&state, &ALL_MOVES)?;
        let (next_state, _, done) = env.step(action);
        state = next_state;
        path.push(state);
        if done {
            break;
        }
    }
    println!("greedy path ({} steps): {path:?}", path.len() - 1);

    let snapshot = std::env::temp_dir().join("grid_world_agent.json");
    agent.save(&snapshot)?;
    let mut restored: QAgent<(i32, i32), Move> = QAgent::new(QAgentConfig::default())?;
    restored.load(&snapshot)?;
    println!("reloaded from {snapshot:?}: {restored}");

    Ok(())
}
