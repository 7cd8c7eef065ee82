use super::brain::Brain;
use crate::model::EvolutionConfig;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::cmp::Ordering;

/// A generation of genomes and their fitness slots.
///
/// All randomness comes from one seeded `ChaCha8Rng`, so a run with a fixed
/// seed reproduces the same sequence of populations.
pub struct Population {
    members: Vec<Brain>,
    fitness: Vec<f64>,
    config: EvolutionConfig,
    rng: ChaCha8Rng,
    generation: u64,
    seed: u64,
}

impl Population {
    pub fn new(config: &EvolutionConfig, inputs: usize, outputs: usize) -> Self {
        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let members = (0..config.population_size)
            .map(|_| Brain::new_random_with_rng(inputs, outputs, &mut rng))
            .collect();
        tracing::info!(seed, size = config.population_size, inputs, outputs, "Population seeded");
        Self {
            members,
            fitness: vec![0.0; config.population_size],
            config: config.clone(),
            rng,
            generation: 0,
            seed,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn members(&self) -> &[Brain] {
        &self.members
    }

    #[must_use]
    pub fn fitness(&self) -> &[f64] {
        &self.fitness
    }

    /// Controllers and fitness slots, borrowed together for one evaluation.
    pub fn evaluation_slots(&mut self) -> (&mut [Brain], &mut [f64]) {
        (&mut self.members, &mut self.fitness)
    }

    /// Member indices sorted by fitness, best first; ties keep index order.
    fn ranking(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.members.len()).collect();
        order.sort_by(|&a, &b| {
            self.fitness[b]
                .partial_cmp(&self.fitness[a])
                .unwrap_or(Ordering::Equal)
                .then(a.cmp(&b))
        });
        order
    }

    #[must_use]
    pub fn best(&self) -> Option<(&Brain, f64)> {
        self.ranking()
            .first()
            .map(|&i| (&self.members[i], self.fitness[i]))
    }

    fn tournament(&mut self) -> usize {
        let size = self.config.tournament_size.max(1);
        let mut winner = self.rng.gen_range(0..self.members.len());
        for _ in 1..size {
            let challenger = self.rng.gen_range(0..self.members.len());
            if self.fitness[challenger] > self.fitness[winner] {
                winner = challenger;
            }
        }
        winner
    }

    /// Replaces the members with the next generation.
    ///
    /// The top `elite_count` genomes are copied unchanged; the rest are
    /// children of two tournament winners, mutated.
    pub fn evolve(&mut self) {
        if self.members.is_empty() {
            return;
        }
        let ranking = self.ranking();
        let size = self.members.len();
        let elites = self.config.elite_count.min(size);

        let mut next: Vec<Brain> = ranking[..elites]
            .iter()
            .map(|&i| self.members[i].clone())
            .collect();
        while next.len() < size {
            let a = self.tournament();
            let b = self.tournament();
            let (fitter, other) = if self.fitness[b] > self.fitness[a] { (b, a) } else { (a, b) };
            let mut child = self.members[fitter].crossover_with_rng(&self.members[other], &mut self.rng);
            child.mutate_with_config(&self.config, &mut self.rng);
            next.push(child);
        }

        self.members = next;
        self.fitness.iter_mut().for_each(|f| *f = 0.0);
        self.generation += 1;
    }
}
