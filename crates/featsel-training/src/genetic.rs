//! Genetic search over feature masks.
//!
//! # Algorithm Overview
//!
//! Each generation goes through the same cycle:
//!
//! 1. **Evaluate** - Every individual without a score is scored by the fitness function
//!    (in parallel, one scoped thread per individual)
//! 2. **Rank** - Individuals are sorted by fitness, best first
//! 3. **Select** - The [`SelectionMethod`] decides how many top individuals survive
//!    unchanged and which individuals become parents
//! 4. **Crossover** - Parents are paired in pool order; each pair exchanges tails at a
//!    random point with probability `crossover_rate`
//! 5. **Mutate** - Every offspring flips each bit with probability `mutation_rate`
//!
//! Survivors keep their score and are not re-evaluated, so under [`EliteSelection`] the
//! best score of generation `g + 1` is never below that of generation `g`.
//!
//! A run evaluates the initial population, then performs a fixed number of generations
//! of the cycle above. There is no convergence test.
//!
//! # Key Components
//!
//! - [`Individual`] - A chromosome and its last fitness score
//! - [`Population`] - Individuals of one generation
//! - [`SelectionMethod`] - Elite and rank selection strategies
//! - [`PopulationEvolver`] - Crossover and mutation parameters
//! - [`GeneticEngine`] - Runs the generation loop

use std::{
    fmt,
    sync::atomic::{AtomicBool, Ordering},
    thread,
};

use featsel_data::chromosome::Chromosome;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::{fitness::FitnessFunction, statistics::FitnessStats};

/// A candidate feature mask and its fitness.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    chromosome: Chromosome,
    fitness: Option<f64>,
}

impl Individual {
    /// Creates an individual that has not been evaluated yet.
    #[must_use]
    pub fn new(chromosome: Chromosome) -> Self {
        Self {
            chromosome,
            fitness: None,
        }
    }

    #[must_use]
    pub fn chromosome(&self) -> Chromosome {
        self.chromosome
    }

    /// Last computed fitness, or `None` if not evaluated yet.
    #[must_use]
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    fn score(&self) -> f64 {
        self.fitness.unwrap_or(f64::NEG_INFINITY)
    }
}

/// Individuals of one generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    /// Creates a population of `count` random chromosomes of `len` bits.
    pub fn random<R>(count: usize, len: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let individuals = (0..count)
            .map(|_| Individual::new(Chromosome::random(len, rng)))
            .collect();
        Self { individuals }
    }

    /// Creates a population whose first member is `ancestor`; the others are random
    /// chromosomes of the same length.
    pub fn seeded<R>(ancestor: Chromosome, count: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut individuals = vec![Individual::new(ancestor)];
        individuals.extend(
            (1..count).map(|_| Individual::new(Chromosome::random(ancestor.len(), rng))),
        );
        individuals.truncate(count);
        Self { individuals }
    }

    #[must_use]
    pub fn from_individuals(individuals: Vec<Individual>) -> Self {
        Self { individuals }
    }

    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Evaluates every unscored individual in parallel, then sorts best first.
    pub fn evaluate_fitness<F>(&mut self, fitness: &F)
    where
        F: FitnessFunction + ?Sized,
    {
        thread::scope(|s| {
            for ind in self.individuals.iter_mut().filter(|ind| ind.fitness.is_none()) {
                s.spawn(move || {
                    ind.fitness = Some(fitness.evaluate(&ind.chromosome));
                });
            }
        });

        // sort by fitness descending; stable, so survivors stay ahead of equal offspring
        self.individuals
            .sort_by(|a, b| b.score().total_cmp(&a.score()));
    }

    /// Whether every individual has a score and they are sorted best first.
    #[must_use]
    pub fn is_ranked(&self) -> bool {
        self.individuals.iter().all(|ind| ind.fitness.is_some())
            && self
                .individuals
                .is_sorted_by(|a, b| a.score() >= b.score())
    }

    /// Best individual of a ranked population.
    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.individuals.first()
    }

    #[must_use]
    pub fn compute_fitness_stats(&self) -> Option<FitnessStats> {
        FitnessStats::new(self.individuals.iter().filter_map(|ind| ind.fitness))
    }
}

/// Chooses survivors and parents from a ranked population.
pub trait SelectionMethod: fmt::Debug + Send + Sync {
    /// Number of top individuals copied unchanged into the next generation.
    fn elite_count(&self) -> usize;

    /// Picks `count` parent indices from `ranked` (sorted best first).
    fn select_parents(
        &self,
        ranked: &[Individual],
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Vec<usize>;
}

/// Keeps the best individual and breeds from the top of the ranking.
///
/// Parents are taken in rank order (best first), wrapping around when more parents
/// than individuals are needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EliteSelection {
    pub elite_count: usize,
}

impl Default for EliteSelection {
    fn default() -> Self {
        Self { elite_count: 1 }
    }
}

impl SelectionMethod for EliteSelection {
    fn elite_count(&self) -> usize {
        self.elite_count
    }

    fn select_parents(
        &self,
        ranked: &[Individual],
        count: usize,
        _rng: &mut dyn RngCore,
    ) -> Vec<usize> {
        if ranked.is_empty() {
            return vec![];
        }
        (0..count).map(|i| i % ranked.len()).collect()
    }
}

/// Roulette selection over ranks: with `n` individuals the best gets weight `n`, the
/// worst weight `1`. No individual survives unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankSelection;

impl SelectionMethod for RankSelection {
    fn elite_count(&self) -> usize {
        0
    }

    fn select_parents(
        &self,
        ranked: &[Individual],
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Vec<usize> {
        let n = ranked.len();
        if n == 0 {
            return vec![];
        }
        let total = n * (n + 1) / 2;
        (0..count)
            .map(|_| {
                let mut ticket = rng.random_range(0..total);
                for (i, weight) in (1..=n).rev().enumerate() {
                    if ticket < weight {
                        return i;
                    }
                    ticket -= weight;
                }
                n - 1
            })
            .collect()
    }
}

/// Crossover and mutation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationEvolver {
    /// Probability that a parent pair exchanges tails
    pub crossover_rate: f64,
    /// Per-bit flip probability for every offspring
    pub mutation_rate: f64,
}

impl PopulationEvolver {
    /// Creates the next generation.
    ///
    /// 1. Copies the top `selection.elite_count()` individuals, keeping their scores
    /// 2. Fills the remaining slots with mutated (and possibly crossed-over) offspring
    ///    of the parents chosen by `selection`
    ///
    /// # Panics
    ///
    /// Panics if `population` is not ranked.
    #[must_use]
    pub fn evolve<R>(
        &self,
        population: &Population,
        selection: &dyn SelectionMethod,
        rng: &mut R,
    ) -> Population
    where
        R: RngCore,
    {
        assert!(population.is_ranked(), "population must be evaluated and sorted");
        let ranked = &population.individuals;
        let size = ranked.len();
        let elite = selection.elite_count().min(size);

        let mut next = ranked[..elite].to_vec();
        let parents = selection.select_parents(ranked, size - elite, rng);
        for pair in parents.chunks(2) {
            let mut children = match *pair {
                [a, b] => {
                    let a = ranked[a].chromosome;
                    let b = ranked[b].chromosome;
                    if a.len() > 1 && rng.random_bool(self.crossover_rate) {
                        let point = rng.random_range(1..a.len());
                        let (c1, c2) = a.crossover(b, point);
                        vec![c1, c2]
                    } else {
                        vec![a, b]
                    }
                }
                [a] => vec![ranked[a].chromosome],
                _ => unreachable!(),
            };
            for child in &mut children {
                *child = child.mutate(self.mutation_rate, rng);
            }
            next.extend(children.into_iter().map(Individual::new));
        }
        next.truncate(size);

        Population { individuals: next }
    }
}

/// Per-generation summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub generation: usize,
    pub best: Chromosome,
    pub best_fitness: f64,
    pub stats: FitnessStats,
}

/// Result of a genetic run.
#[derive(Debug, Clone)]
pub struct EngineOutcome {
    /// Last evaluated generation, ranked
    pub population: Population,
    pub history: Vec<GenerationSummary>,
    /// Whether the run stopped early on request
    pub cancelled: bool,
}

/// Runs the generation loop.
#[derive(Debug)]
pub struct GeneticEngine<'a, F: ?Sized> {
    fitness: &'a F,
    selection: &'a dyn SelectionMethod,
    evolver: PopulationEvolver,
    generations: usize,
}

impl<'a, F> GeneticEngine<'a, F>
where
    F: FitnessFunction + ?Sized,
{
    #[must_use]
    pub fn new(
        fitness: &'a F,
        selection: &'a dyn SelectionMethod,
        evolver: PopulationEvolver,
        generations: usize,
    ) -> Self {
        Self {
            fitness,
            selection,
            evolver,
            generations,
        }
    }

    /// Evaluates `population`, then runs the configured number of generations, each
    /// one breeding offspring from the previous ranking and evaluating them.
    ///
    /// `history[0]` describes the initial population and `history[g]` the population
    /// bred in generation `g`. When `cancel` is set, it is checked after every
    /// evaluation; a cancelled run returns the last evaluated population.
    ///
    /// # Panics
    ///
    /// Panics if `population` is empty.
    pub fn run<R>(
        &self,
        mut population: Population,
        rng: &mut R,
        cancel: Option<&AtomicBool>,
    ) -> EngineOutcome
    where
        R: RngCore,
    {
        assert!(!population.is_empty(), "population must not be empty");
        let mut history = Vec::with_capacity(self.generations + 1);
        let mut cancelled = false;

        for generation in 0..=self.generations {
            if generation > 0 {
                population = self.evolver.evolve(&population, self.selection, rng);
            }
            population.evaluate_fitness(self.fitness);
            history.push(Self::summarize(generation, &population));

            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                log::info!("cancelled after generation {generation}");
                cancelled = true;
                break;
            }
        }

        EngineOutcome {
            population,
            history,
            cancelled,
        }
    }

    fn summarize(generation: usize, population: &Population) -> GenerationSummary {
        let best = population.best().expect("population is not empty");
        let stats = population
            .compute_fitness_stats()
            .expect("population is evaluated");
        log::info!(
            "generation {generation}: best {:.2} mean {:.2} min {:.2}",
            stats.max,
            stats.mean,
            stats.min
        );
        GenerationSummary {
            generation,
            best: best.chromosome,
            best_fitness: best.score(),
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    /// Fitness = percentage of set bits among the low `width` bits.
    #[derive(Debug)]
    struct OnesFitness {
        width: usize,
    }

    impl FitnessFunction for OnesFitness {
        #[expect(clippy::cast_precision_loss)]
        fn evaluate(&self, chromosome: &Chromosome) -> f64 {
            chromosome.popcount_below(self.width) as f64 * 100.0 / self.width as f64
        }
    }

    fn ranked(scores: &[f64]) -> Population {
        let mut individuals = scores
            .iter()
            .enumerate()
            .map(|(i, &s)| Individual {
                chromosome: Chromosome::new(i as u64, 8),
                fitness: Some(s),
            })
            .collect::<Vec<_>>();
        individuals.sort_by(|a, b| b.score().total_cmp(&a.score()));
        Population { individuals }
    }

    #[test]
    fn test_evaluate_sorts_descending() {
        let mut population = Population::from_individuals(vec![
            Individual::new(Chromosome::new(0b0001, 4)),
            Individual::new(Chromosome::new(0b1111, 4)),
            Individual::new(Chromosome::new(0b0011, 4)),
        ]);
        population.evaluate_fitness(&OnesFitness { width: 4 });
        let scores: Vec<_> = population
            .individuals()
            .iter()
            .map(|ind| ind.fitness().unwrap())
            .collect();
        assert_eq!(scores, vec![100.0, 50.0, 25.0]);
        assert!(population.is_ranked());
    }

    #[test]
    fn test_survivors_not_reevaluated() {
        #[derive(Debug)]
        struct Constant;
        impl FitnessFunction for Constant {
            fn evaluate(&self, _: &Chromosome) -> f64 {
                1.0
            }
        }
        let mut population = ranked(&[90.0, 10.0]);
        population.individuals[1].fitness = None;
        population.evaluate_fitness(&Constant);
        assert_eq!(population.individuals()[0].fitness(), Some(90.0));
        assert_eq!(population.individuals()[1].fitness(), Some(1.0));
    }

    #[test]
    fn test_seeded_population_starts_with_ancestor() {
        let mut rng = Pcg64::seed_from_u64(0);
        let ancestor = Chromosome::new(0xdead_beef, 64);
        let population = Population::seeded(ancestor, 5, &mut rng);
        assert_eq!(population.len(), 5);
        assert_eq!(population.individuals()[0].chromosome(), ancestor);
        assert!(population.individuals().iter().all(|i| i.chromosome().len() == 64));

        let single = Population::seeded(ancestor, 1, &mut rng);
        assert_eq!(single.individuals(), &[Individual::new(ancestor)]);
    }

    #[test]
    fn test_elite_selection_keeps_best() {
        let population = ranked(&[10.0, 80.0, 40.0, 60.0]);
        let best = population.best().unwrap().clone();
        let evolver = PopulationEvolver {
            crossover_rate: 1.0,
            mutation_rate: 0.5,
        };
        let mut rng = Pcg64::seed_from_u64(1);
        let next = evolver.evolve(&population, &EliteSelection::default(), &mut rng);
        assert_eq!(next.len(), 4);
        assert_eq!(next.individuals()[0], best);
        assert!(next.individuals()[1..].iter().all(|i| i.fitness().is_none()));
    }

    #[test]
    fn test_elite_parents_in_rank_order() {
        let population = ranked(&[1.0, 2.0, 3.0]);
        let mut rng = Pcg64::seed_from_u64(0);
        let parents = EliteSelection::default().select_parents(population.individuals(), 5, &mut rng);
        assert_eq!(parents, vec![0, 1, 2, 0, 1]);
    }

    #[test]
    fn test_rank_selection_prefers_better() {
        let population = ranked(&[1.0, 2.0, 3.0, 4.0]);
        let mut rng = Pcg64::seed_from_u64(2);
        let parents = RankSelection.select_parents(population.individuals(), 10_000, &mut rng);
        let mut counts = [0_usize; 4];
        for p in parents {
            counts[p] += 1;
        }
        // expected shares 4:3:2:1
        assert!(counts[0] > counts[1] && counts[1] > counts[2] && counts[2] > counts[3]);
        assert_eq!(RankSelection.elite_count(), 0);
    }

    #[test]
    fn test_evolve_without_variation_copies_parents() {
        let population = ranked(&[5.0, 4.0, 3.0]);
        let evolver = PopulationEvolver {
            crossover_rate: 0.0,
            mutation_rate: 0.0,
        };
        let mut rng = Pcg64::seed_from_u64(3);
        let next = evolver.evolve(&population, &EliteSelection::default(), &mut rng);
        let chromosomes: Vec<_> = next.individuals().iter().map(Individual::chromosome).collect();
        let expected: Vec<_> = [0, 0, 1]
            .iter()
            .map(|&i| population.individuals()[i].chromosome())
            .collect();
        assert_eq!(chromosomes, expected);
    }

    #[test]
    fn test_elitism_is_monotonic() {
        let fitness = OnesFitness { width: 16 };
        let mut rng = Pcg64::seed_from_u64(4);
        let population = Population::random(8, 16, &mut rng);
        let selection = EliteSelection::default();
        let engine = GeneticEngine::new(
            &fitness,
            &selection,
            PopulationEvolver {
                crossover_rate: 0.75,
                mutation_rate: 0.2,
            },
            30,
        );
        let outcome = engine.run(population, &mut rng, None);
        assert_eq!(outcome.history.len(), 31);
        for w in outcome.history.windows(2) {
            assert!(w[1].best_fitness >= w[0].best_fitness);
        }
        assert!(!outcome.cancelled);
    }

    #[test]
    fn test_single_individual_single_generation() {
        let fitness = OnesFitness { width: 8 };
        let ancestor = Chromosome::new(0b1010, 64);
        let mut rng = Pcg64::seed_from_u64(5);
        let population = Population::seeded(ancestor, 1, &mut rng);
        let selection = EliteSelection::default();
        let engine = GeneticEngine::new(
            &fitness,
            &selection,
            PopulationEvolver {
                crossover_rate: 0.75,
                mutation_rate: 0.1,
            },
            1,
        );
        let outcome = engine.run(population, &mut rng, None);
        assert_eq!(outcome.population.best().unwrap().chromosome(), ancestor);
        assert_eq!(outcome.history.len(), 2);
        assert!(outcome.history.iter().all(|s| s.best == ancestor));
    }

    #[test]
    fn test_each_generation_breeds_and_evaluates() {
        #[derive(Debug, Default)]
        struct Counting {
            calls: std::sync::atomic::AtomicUsize,
        }
        impl FitnessFunction for Counting {
            #[expect(clippy::cast_precision_loss)]
            fn evaluate(&self, chromosome: &Chromosome) -> f64 {
                self.calls.fetch_add(1, Ordering::Relaxed);
                chromosome.popcount() as f64
            }
        }

        let selection = EliteSelection::default();
        let evolver = PopulationEvolver {
            crossover_rate: 0.75,
            mutation_rate: 0.1,
        };
        for generations in [0, 1, 2, 20] {
            let fitness = Counting::default();
            let mut rng = Pcg64::seed_from_u64(7);
            let engine = GeneticEngine::new(&fitness, &selection, evolver, generations);
            let outcome = engine.run(Population::random(4, 8, &mut rng), &mut rng, None);

            // initial population, then 3 new offspring per generation (1 elite survives)
            assert_eq!(
                fitness.calls.load(Ordering::Relaxed),
                4 + 3 * generations,
                "{generations} generations"
            );
            assert_eq!(outcome.history.len(), generations + 1);
            let numbers: Vec<_> = outcome.history.iter().map(|s| s.generation).collect();
            assert_eq!(numbers, (0..=generations).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_cancel_stops_after_first_generation() {
        let fitness = OnesFitness { width: 8 };
        let mut rng = Pcg64::seed_from_u64(6);
        let selection = RankSelection;
        let engine = GeneticEngine::new(
            &fitness,
            &selection,
            PopulationEvolver {
                crossover_rate: 0.75,
                mutation_rate: 0.1,
            },
            10,
        );
        let cancel = AtomicBool::new(true);
        let outcome = engine.run(Population::random(4, 8, &mut rng), &mut rng, Some(&cancel));
        assert!(outcome.cancelled);
        assert_eq!(outcome.history.len(), 1);
        assert!(outcome.population.is_ranked());
    }
}
