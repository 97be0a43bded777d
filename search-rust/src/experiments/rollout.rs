//! Single-episode evaluation of a weight matrix.

use super::env::Environment;
use super::error::SearchError;
use super::policy::{LinearPolicy, Matrix};

/// Outcome of one rollout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Episode {
    pub total_reward: f64,
    pub steps: usize,
}

/// Runs one episode from `reset` until the environment reports done or its
/// step limit is reached, and returns the summed reward.
///
/// With `render` the environment draws once after reset and once after every
/// step, and is closed when the episode ends.
pub fn run_episode<E>(env: &mut E, weights: &Matrix, render: bool) -> Result<Episode, SearchError>
where
    E: Environment + ?Sized,
{
    let step_limit = env.config().max_steps;
    let policy = LinearPolicy::new(weights);

    let mut obs = env.reset(None);
    let mut total_reward = 0.0;
    let mut steps = 0;
    let mut done = false;

    if render {
        env.render();
    }
    while steps < step_limit && !done {
        steps += 1;
        let action = policy.act(&obs)?;
        let result = env.step(&action)?;
        if render {
            env.render();
        }
        total_reward += result.reward;
        done = result.done();
        obs = result.observation;
    }
    if render {
        env.close();
    }

    Ok(Episode { total_reward, steps })
}
