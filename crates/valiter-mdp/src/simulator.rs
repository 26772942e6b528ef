use log::debug;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use valiter_core::{MarkovDecisionProcess, Policy};

use crate::{CompiledMdp, MdpError, StateKey};

#[derive(Debug, Clone)]
/// Seeded simulator over a compiled MDP.
pub struct MdpSimulator {
    mdp: CompiledMdp,
    rng: ChaCha8Rng,
}

/// Monte-Carlo estimate of a policy's discounted return from the start state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyEvaluation {
    pub episodes: usize,
    pub mean_return: f64,
    /// Episodes cut off by `max_steps` before reaching a terminal state.
    pub truncated: usize,
}

impl MdpSimulator {
    /// Create a simulator with deterministic RNG seed.
    pub fn new(mdp: CompiledMdp, seed: u64) -> Self {
        Self {
            mdp,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Sample one `(next_state, next_reward, terminal)` transition.
    /// Invalid state/action inputs are treated as a no-op terminal transition.
    pub fn step(&mut self, state_key: StateKey, action_id: usize) -> (StateKey, f64, bool) {
        let sample = (self.rng.next_u64() as f64) / ((u64::MAX as f64) + 1.0);
        self.mdp
            .sample_transition(state_key, action_id, sample)
            .unwrap_or((state_key, 0.0, true))
    }

    /// Roll `policy` out from the start state `episodes` times.
    ///
    /// Each episode earns the start state's reward, then `gamma^t` times the reward of the
    /// state reached at step `t`, matching the utility the solver computes. An episode ends
    /// at a terminal state, at a state the policy leaves undecided, or after `max_steps`.
    pub fn evaluate_policy(
        &mut self,
        policy: &Policy<StateKey, String>,
        episodes: usize,
        max_steps: usize,
        gamma: f64,
    ) -> Result<PolicyEvaluation, MdpError> {
        if episodes == 0 {
            return Err(MdpError::NoEpisodes);
        }

        let start = self.mdp.start();
        let start_reward = self.mdp.reward(&start);
        let mut total = 0.0;
        let mut truncated = 0;

        for _ in 0..episodes {
            let mut state = start;
            let mut discount = 1.0;
            let mut episode_return = start_reward;
            let mut finished = self.mdp.is_terminal(state).unwrap_or(true);

            for _ in 0..max_steps {
                if finished {
                    break;
                }
                let Some(action_id) = policy
                    .action(&state)
                    .and_then(|action| self.mdp.action_index(state, action))
                else {
                    finished = true;
                    break;
                };

                let (next, reward, terminal) = self.step(state, action_id);
                discount *= gamma;
                episode_return += discount * reward;
                state = next;
                finished = terminal;
            }

            if !finished {
                truncated += 1;
            }
            total += episode_return;
        }

        let evaluation = PolicyEvaluation {
            episodes,
            mean_return: total / episodes as f64,
            truncated,
        };
        debug!(
            "evaluated policy over {} episodes: mean return {:.6}, {} truncated",
            evaluation.episodes, evaluation.mean_return, evaluation.truncated
        );
        Ok(evaluation)
    }
}
