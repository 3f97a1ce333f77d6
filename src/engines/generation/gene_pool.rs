use crate::config::search::TournamentOrder;
use crate::error::{Result, SynthesisError};
use crate::types::{FitnessResult, ProgramNode};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Duration;

/// Acceptance gate and capacity of a gene pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolRequirements {
    /// Candidates must be strictly more correct than this
    pub min_correct: f64,
    pub max_pool_size: usize,
    /// Latency ceiling in microseconds. Only enforced when ceilings are on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_latency_us: Option<u64>,
    /// Node count ceiling. Only enforced when ceilings are on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<usize>,
}

impl PoolRequirements {
    pub fn new(min_correct: f64, max_pool_size: usize) -> Self {
        Self {
            min_correct,
            max_pool_size,
            max_latency_us: None,
            max_size: None,
        }
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(0.0..=1.0).contains(&self.min_correct) {
            return Err(format!("min_correct {} outside [0, 1]", self.min_correct));
        }
        if self.max_pool_size == 0 {
            return Err("max_pool_size must be positive".to_string());
        }
        Ok(())
    }

    /// Whether a candidate with `result` may enter a pool with these
    /// requirements.
    pub fn admits(&self, result: &FitnessResult, enforce_ceilings: bool) -> bool {
        if result.correctness <= self.min_correct {
            return false;
        }
        if enforce_ceilings {
            if let Some(max_us) = self.max_latency_us {
                if result.latency > Duration::from_micros(max_us) {
                    return false;
                }
            }
            if let Some(max_size) = self.max_size {
                if result.size > max_size {
                    return false;
                }
            }
        }
        true
    }
}

/// Bounded collection of accepted candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenePool {
    pub requirements: PoolRequirements,
    #[serde(default)]
    members: Vec<ProgramNode>,
}

impl GenePool {
    pub fn new(requirements: PoolRequirements) -> Self {
        Self {
            requirements,
            members: Vec::new(),
        }
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        self.requirements.validate()?;
        if self.members.len() > self.requirements.max_pool_size {
            return Err(format!(
                "{} members exceed max_pool_size {}",
                self.members.len(),
                self.requirements.max_pool_size
            ));
        }
        Ok(())
    }

    pub fn members(&self) -> &[ProgramNode] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.requirements.max_pool_size
    }

    pub fn push(&mut self, node: ProgramNode) -> Result<()> {
        if self.is_full() {
            return Err(SynthesisError::Pool(format!(
                "pool is at capacity ({})",
                self.requirements.max_pool_size
            )));
        }
        self.members.push(node);
        Ok(())
    }

    /// Swap the member at `index` for `node`, returning the old member.
    pub fn replace_at(&mut self, index: usize, node: ProgramNode) -> Result<ProgramNode> {
        let len = self.members.len();
        let slot = self.members.get_mut(index).ok_or_else(|| {
            SynthesisError::Pool(format!("index {} out of bounds for pool of {}", index, len))
        })?;
        Ok(std::mem::replace(slot, node))
    }
}

/// Result of a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Rejected,
    Inserted { pool: usize },
    Replaced { pool: usize, incumbent: ProgramNode },
}

/// True when `candidate` strictly beats `incumbent` under `order`.
pub fn outranks(
    order: TournamentOrder,
    candidate: &FitnessResult,
    incumbent: &FitnessResult,
) -> bool {
    let correctness = candidate
        .correctness
        .partial_cmp(&incumbent.correctness)
        .unwrap_or(Ordering::Equal);
    let ordering = match order {
        TournamentOrder::Lexicographic => correctness
            .then(candidate.latency.cmp(&incumbent.latency))
            .then(candidate.size.cmp(&incumbent.size)),
        TournamentOrder::Parsimonious => correctness
            .then(incumbent.latency.cmp(&candidate.latency))
            .then(incumbent.size.cmp(&candidate.size)),
    };
    ordering == Ordering::Greater
}

/// Routes scored candidates into gene pools, running a one-on-one
/// tournament when the target pool is full.
pub struct PoolManager<R: Rng> {
    rng: R,
    order: TournamentOrder,
    enforce_ceilings: bool,
}

impl<R: Rng> PoolManager<R> {
    pub fn new(rng: R, order: TournamentOrder, enforce_ceilings: bool) -> Self {
        Self {
            rng,
            order,
            enforce_ceilings,
        }
    }

    /// Index of the first pool admitting `result`.
    pub fn route(&self, result: &FitnessResult, pools: &[GenePool]) -> Option<usize> {
        pools
            .iter()
            .position(|pool| pool.requirements.admits(result, self.enforce_ceilings))
    }

    /// Submit `node`, scored as `result`. When the chosen pool is full a
    /// random incumbent is re-scored through `retest` and replaced only on
    /// strict improvement.
    pub fn submit<F>(
        &mut self,
        node: ProgramNode,
        result: &FitnessResult,
        pools: &mut [GenePool],
        mut retest: F,
    ) -> Result<SubmitOutcome>
    where
        F: FnMut(&ProgramNode) -> Result<FitnessResult>,
    {
        let Some(index) = self.route(result, pools) else {
            return Ok(SubmitOutcome::Rejected);
        };
        let pool = &mut pools[index];

        if !pool.is_full() {
            pool.push(node)?;
            return Ok(SubmitOutcome::Inserted { pool: index });
        }

        let slot = self.rng.gen_range(0..pool.len());
        let incumbent = &pool.members()[slot];
        let incumbent_result = match retest(incumbent) {
            Ok(r) => r,
            Err(e) => {
                log::debug!("Incumbent {} no longer compiles: {}", incumbent, e);
                FitnessResult::failed(incumbent.size())
            }
        };

        if outranks(self.order, result, &incumbent_result) {
            let incumbent = pool.replace_at(slot, node)?;
            Ok(SubmitOutcome::Replaced {
                pool: index,
                incumbent,
            })
        } else {
            Ok(SubmitOutcome::Rejected)
        }
    }
}
