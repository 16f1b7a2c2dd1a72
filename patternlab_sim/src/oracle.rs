//! Seeded input oracle for simulation.
//!
//! The Oracle produces every input a scenario feeds to an engine, and owns
//! the ground-truth checks those engines are held to:
//! - Random sequences for the sorting strategies (values 1..=100)
//! - Edit scripts for the command history, with a plain `String` model
//! - Orders, condiment stacks and payments for the smaller engines

use patternlab_core::{Command, Condiment, Crust, DeleteText, InsertText, PizzaSize, SortOutcome, TextBuffer};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Fragments the edit script inserts.
const FRAGMENTS: [&str; 6] = ["Hello", " world", "!", "Rust", " ", "draft"];

/// Toppings offered to the builder.
pub const TOPPINGS: [&str; 4] = ["Pepperoni", "Mushrooms", "Olives", "Onions"];

/// Currencies offered to the adapter.
pub const CURRENCIES: [&str; 4] = ["USD", "EUR", "GBP", "JPY"];

/// One step of a seeded edit script. Positions count characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    Insert { text: String, position: usize },
    Delete { position: usize, length: usize },
}

impl EditOp {
    /// Builds the command for this step against the buffer's current text.
    pub fn command(&self, buffer: &TextBuffer) -> Box<dyn Command> {
        match self {
            EditOp::Insert { text, position } => Box::new(InsertText::new(text.clone(), *position)),
            EditOp::Delete { position, length } => {
                Box::new(DeleteText::new(buffer, *position, *length))
            }
        }
    }

    /// Applies the step to a plain string model.
    pub fn apply_to(&self, model: &mut String) {
        let mut chars: Vec<char> = model.chars().collect();
        match self {
            EditOp::Insert { text, position } => {
                let at = (*position).min(chars.len());
                chars.splice(at..at, text.chars());
            }
            EditOp::Delete { position, length } => {
                let start = (*position).min(chars.len());
                let end = (start + length).min(chars.len());
                chars.drain(start..end);
            }
        }
        *model = chars.into_iter().collect();
    }
}

/// A seeded pizza order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PizzaOrder {
    pub size: PizzaSize,
    pub crust: Crust,
    pub toppings: Vec<String>,
    pub cheese: bool,
}

impl PizzaOrder {
    /// Price by the published rules, independent of the builder.
    pub fn expected_price(&self) -> u32 {
        let cheese = if self.cheese { 1 } else { 0 };
        self.size.price() + self.crust.price() + 2 * self.toppings.len() as u32 + cheese
    }
}

/// The Oracle - seeded inputs and ground-truth verifiers.
pub struct Oracle {
    /// Seed this oracle was built from
    seed: u64,

    /// RNG for every generated input
    rng: ChaCha8Rng,
}

impl Oracle {
    /// Creates a new Oracle with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// A sequence of `len` integers, each in 1..=100.
    pub fn random_sequence(&mut self, len: usize) -> Vec<i64> {
        (0..len).map(|_| self.rng.gen_range(1..=100)).collect()
    }

    /// An edit script of `ops` steps starting from an empty buffer.
    ///
    /// Deletes are only emitted when there is text, and always target a
    /// range that exists at that point in the script.
    pub fn edit_script(&mut self, ops: usize) -> Vec<EditOp> {
        let mut len = 0usize;
        let mut script = Vec::with_capacity(ops);
        for _ in 0..ops {
            let delete = len > 0 && self.rng.gen_bool(0.3);
            if delete {
                let position = self.rng.gen_range(0..len);
                let length = self.rng.gen_range(1..=len - position);
                len -= length;
                script.push(EditOp::Delete { position, length });
            } else {
                let text = FRAGMENTS[self.rng.gen_range(0..FRAGMENTS.len())].to_string();
                // Some inserts aim past the end and land there
                let position = if self.rng.gen_bool(0.2) {
                    self.rng.gen_range(len + 1..=len + 8)
                } else {
                    self.rng.gen_range(0..=len)
                };
                len += text.chars().count();
                script.push(EditOp::Insert { text, position });
            }
        }
        script
    }

    /// Up to `max` condiments, repeats allowed, in application order.
    pub fn condiments(&mut self, max: usize) -> Vec<Condiment> {
        let count = self.rng.gen_range(0..=max);
        (0..count)
            .map(|_| Condiment::all()[self.rng.gen_range(0..3)])
            .collect()
    }

    /// A complete pizza order.
    pub fn pizza_order(&mut self) -> PizzaOrder {
        let size = [PizzaSize::Small, PizzaSize::Medium, PizzaSize::Large][self.rng.gen_range(0..3)];
        let crust = [Crust::Thin, Crust::Thick, Crust::Stuffed][self.rng.gen_range(0..3)];
        let topping_count = self.rng.gen_range(0..=TOPPINGS.len());
        let toppings = TOPPINGS
            .choose_multiple(&mut self.rng, topping_count)
            .map(|t| t.to_string())
            .collect();
        PizzaOrder {
            size,
            crust,
            toppings,
            cheese: self.rng.gen_bool(0.5),
        }
    }

    /// A payment amount in whole cents, as a decimal.
    pub fn payment_amount(&mut self) -> f64 {
        self.rng.gen_range(100..100_000) as f64 / 100.0
    }

    pub fn currency(&mut self) -> &'static str {
        CURRENCIES[self.rng.gen_range(0..CURRENCIES.len())]
    }

    /// Image size a lazily loaded image reports once loaded.
    pub fn image_size(&mut self) -> u64 {
        self.rng.gen_range(1000..6000)
    }

    /// Picks `true` with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.gen_bool(p)
    }

    /// Shuffles `items` in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

// ============================================================================
// VERIFIERS
// ============================================================================

/// True if `a` and `b` hold the same multiset of values.
pub fn is_permutation(a: &[i64], b: &[i64]) -> bool {
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

/// Checks a sort run against its input.
///
/// The result must be the sorted input, every snapshot must be a
/// permutation of the input with in-range indices, and the trace must end
/// with exactly one terminal "all sorted" frame.
pub fn verify_sort_trace(input: &[i64], outcome: &SortOutcome) -> Result<(), String> {
    let mut expected = input.to_vec();
    expected.sort();
    if outcome.array != expected {
        return Err(format!("result {:?} is not the sorted input", outcome.array));
    }

    let last = outcome
        .steps
        .last()
        .ok_or_else(|| "trace is empty".to_string())?;
    if !last.is_terminal() || last.array != expected {
        return Err("trace does not end with the sorted marker".to_string());
    }

    for (index, step) in outcome.steps.iter().enumerate() {
        if !is_permutation(&step.array, input) {
            return Err(format!("step {} is not a permutation of the input", index));
        }
        let in_range = |pair: Option<(usize, usize)>| {
            pair.map_or(true, |(a, b)| a < input.len() && b < input.len())
        };
        if !in_range(step.comparing) || !in_range(step.swapping) {
            return Err(format!("step {} references an index out of range", index));
        }
        if step.is_terminal() && index + 1 != outcome.steps.len() {
            return Err(format!("step {} marks everything sorted too early", index));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use patternlab_core::{SortAlgorithm, SortContext};
    use proptest::prelude::*;

    #[test]
    fn test_oracle_is_deterministic() {
        let mut oracle1 = Oracle::new(42);
        let mut oracle2 = Oracle::new(42);

        assert_eq!(oracle1.random_sequence(10), oracle2.random_sequence(10));
        assert_eq!(oracle1.edit_script(8), oracle2.edit_script(8));
        assert_eq!(oracle1.pizza_order(), oracle2.pizza_order());
    }

    #[test]
    fn test_edit_op_model() {
        let mut model = String::new();
        EditOp::Insert { text: "Hello".into(), position: 0 }.apply_to(&mut model);
        EditOp::Insert { text: " world".into(), position: 5 }.apply_to(&mut model);
        EditOp::Delete { position: 0, length: 1 }.apply_to(&mut model);
        assert_eq!(model, "ello world");
    }

    #[test]
    fn test_expected_pizza_price() {
        let order = PizzaOrder {
            size: PizzaSize::Large,
            crust: Crust::Stuffed,
            toppings: vec!["Pepperoni".into()],
            cheese: false,
        };
        assert_eq!(order.expected_price(), 21);
    }

    #[test]
    fn test_verifier_rejects_unsorted_result() {
        let input = vec![3, 1, 2];
        let mut outcome = SortContext::with_algorithm(SortAlgorithm::Bubble).execute(&input);
        outcome.array = vec![3, 1, 2];
        assert!(verify_sort_trace(&input, &outcome).is_err());
    }

    #[test]
    fn test_verifier_rejects_missing_terminal_step() {
        let input = vec![3, 1, 2];
        let mut outcome = SortContext::with_algorithm(SortAlgorithm::Merge).execute(&input);
        outcome.steps.pop();
        assert!(verify_sort_trace(&input, &outcome).is_err());
    }

    #[test]
    fn test_edit_scripts_include_inserts_past_the_end() {
        let past_end = (0..20u64).any(|seed| {
            let mut len = 0;
            Oracle::new(seed).edit_script(30).iter().any(|op| {
                let beyond = matches!(op, EditOp::Insert { position, .. } if *position > len);
                match op {
                    EditOp::Insert { text, .. } => len += text.chars().count(),
                    EditOp::Delete { length, .. } => len -= length,
                }
                beyond
            })
        });
        assert!(past_end);
    }

    proptest! {
        #[test]
        fn prop_sequences_stay_in_range(seed in any::<u64>(), len in 0usize..40) {
            let values = Oracle::new(seed).random_sequence(len);
            prop_assert_eq!(values.len(), len);
            prop_assert!(values.iter().all(|v| (1..=100).contains(v)));
        }

        #[test]
        fn prop_edit_scripts_only_delete_existing_text(seed in any::<u64>(), ops in 0usize..30) {
            let mut model = String::new();
            for op in Oracle::new(seed).edit_script(ops) {
                let len = model.chars().count();
                match &op {
                    EditOp::Insert { position, .. } => prop_assert!(*position <= len + 8),
                    EditOp::Delete { position, length } => {
                        prop_assert!(*length > 0);
                        prop_assert!(position + length <= len);
                    }
                }
                op.apply_to(&mut model);
            }
        }
    }
}
