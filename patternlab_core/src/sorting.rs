//! The Strategy Engine - Sorting with Replayable Traces
//!
//! Three interchangeable algorithms sit behind the [`SortStrategy`] trait.
//! Each one sorts a copy of its input and records every comparison and swap
//! as a [`SortStep`], so a visualization can play the run back frame by
//! frame:
//! - **Bubble sort**: adjacent comparisons, no early exit
//! - **Quicksort**: Lomuto partition, pivot = last element of the range
//! - **Merge sort**: midpoint split, stable merge favoring the left run
//!
//! Every trace ends with one step that marks all indices as sorted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One recorded frame of a sorting run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortStep {
    /// Full snapshot of the sequence at this point
    pub array: Vec<i64>,

    /// Indices being compared
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparing: Option<(usize, usize)>,

    /// Indices that were just exchanged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swapping: Option<(usize, usize)>,

    /// Indices known to be in their final position
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorted: Option<Vec<usize>>,
}

impl SortStep {
    fn snapshot(array: &[i64]) -> Self {
        Self {
            array: array.to_vec(),
            comparing: None,
            swapping: None,
            sorted: None,
        }
    }

    /// Returns true if this is the terminal "everything sorted" frame.
    pub fn is_terminal(&self) -> bool {
        match &self.sorted {
            Some(indices) => indices.len() == self.array.len(),
            None => false,
        }
    }
}

/// Result of running a strategy: the sorted sequence plus its trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOutcome {
    pub array: Vec<i64>,
    pub steps: Vec<SortStep>,
}

impl SortOutcome {
    /// Counts the comparison and swap frames in the trace.
    pub fn summary(&self) -> TraceSummary {
        let mut summary = TraceSummary {
            total_steps: self.steps.len(),
            ..Default::default()
        };
        for step in &self.steps {
            if step.comparing.is_some() {
                summary.comparisons += 1;
            }
            if step.swapping.is_some() {
                summary.swaps += 1;
            }
        }
        summary
    }
}

/// Frame counts for a recorded trace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceSummary {
    pub total_steps: usize,
    pub comparisons: usize,
    pub swaps: usize,
}

/// Capability shared by every sorting algorithm.
pub trait SortStrategy: Send + Sync {
    /// Human-readable algorithm name.
    fn name(&self) -> &'static str;

    /// Sorts a copy of `input` ascending and returns it with its trace.
    fn sort(&self, input: &[i64]) -> SortOutcome;
}

// =============================================================================
// STEP RECORDER
// =============================================================================

/// Accumulates frames while an algorithm runs.
#[derive(Debug, Default)]
struct TraceRecorder {
    steps: Vec<SortStep>,
}

impl TraceRecorder {
    fn compare(&mut self, array: &[i64], a: usize, b: usize) {
        self.steps.push(SortStep {
            comparing: Some((a, b)),
            ..SortStep::snapshot(array)
        });
    }

    fn swap(&mut self, array: &[i64], a: usize, b: usize) {
        self.steps.push(SortStep {
            swapping: Some((a, b)),
            ..SortStep::snapshot(array)
        });
    }

    fn frame(&mut self, array: &[i64]) {
        self.steps.push(SortStep::snapshot(array));
    }

    fn finish(mut self, array: Vec<i64>) -> SortOutcome {
        self.steps.push(SortStep {
            sorted: Some((0..array.len()).collect()),
            ..SortStep::snapshot(&array)
        });
        SortOutcome {
            array,
            steps: self.steps,
        }
    }
}

// =============================================================================
// BUBBLE SORT
// =============================================================================

/// Adjacent-exchange sort. Always performs every pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct BubbleSort;

impl SortStrategy for BubbleSort {
    fn name(&self) -> &'static str {
        "Bubble Sort"
    }

    fn sort(&self, input: &[i64]) -> SortOutcome {
        let mut array = input.to_vec();
        let mut trace = TraceRecorder::default();
        let n = array.len();

        for pass in 0..n.saturating_sub(1) {
            for j in 0..n - pass - 1 {
                trace.compare(&array, j, j + 1);

                if array[j] > array[j + 1] {
                    array.swap(j, j + 1);
                    trace.swap(&array, j, j + 1);
                }
            }
        }

        trace.finish(array)
    }
}

// =============================================================================
// QUICKSORT (LOMUTO)
// =============================================================================

/// In-place recursive quicksort using the last element as pivot.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuickSort;

impl QuickSort {
    fn quick_sort(array: &mut [i64], low: usize, high: usize, trace: &mut TraceRecorder) {
        if low < high {
            let pivot_index = Self::partition(array, low, high, trace);
            if pivot_index > low {
                Self::quick_sort(array, low, pivot_index - 1, trace);
            }
            Self::quick_sort(array, pivot_index + 1, high, trace);
        }
    }

    /// Lomuto partition of `array[low..=high]`; returns the pivot's final index.
    fn partition(array: &mut [i64], low: usize, high: usize, trace: &mut TraceRecorder) -> usize {
        let pivot = array[high];
        // Next slot for an element smaller than the pivot
        let mut store = low;

        for j in low..high {
            trace.compare(array, j, high);

            if array[j] < pivot {
                array.swap(store, j);
                if store != j {
                    trace.swap(array, store, j);
                }
                store += 1;
            }
        }

        array.swap(store, high);
        trace.swap(array, store, high);
        store
    }
}

impl SortStrategy for QuickSort {
    fn name(&self) -> &'static str {
        "Quick Sort"
    }

    fn sort(&self, input: &[i64]) -> SortOutcome {
        let mut array = input.to_vec();
        let mut trace = TraceRecorder::default();

        if !array.is_empty() {
            let high = array.len() - 1;
            Self::quick_sort(&mut array, 0, high, &mut trace);
        }

        trace.finish(array)
    }
}

// =============================================================================
// MERGE SORT
// =============================================================================

/// Top-down merge sort. Stable: ties are taken from the left run first.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeSort;

impl MergeSort {
    fn merge_sort(array: &mut [i64], left: usize, right: usize, trace: &mut TraceRecorder) {
        if left < right {
            let mid = left + (right - left) / 2;
            Self::merge_sort(array, left, mid, trace);
            Self::merge_sort(array, mid + 1, right, trace);
            Self::merge(array, left, mid, right, trace);
        }
    }

    /// Merges `array[left..=mid]` with `array[mid + 1..=right]`.
    ///
    /// Between placements the window holds
    /// `merged prefix ++ rest of left run ++ rest of right run`, so every
    /// recorded frame is a permutation of the input. With that layout the
    /// left head sits at the write cursor and the right head at `mid + 1 + j`.
    fn merge(array: &mut [i64], left: usize, mid: usize, right: usize, trace: &mut TraceRecorder) {
        let left_run = array[left..=mid].to_vec();
        let right_run = array[mid + 1..=right].to_vec();

        let (mut i, mut j, mut k) = (0, 0, left);

        while i < left_run.len() && j < right_run.len() {
            trace.compare(array, k, mid + 1 + j);

            if left_run[i] <= right_run[j] {
                array[k] = left_run[i];
                i += 1;
            } else {
                array[k] = right_run[j];
                j += 1;
            }
            k += 1;
            Self::lay_out_pending(array, k, &left_run[i..], &right_run[j..]);
            trace.frame(array);
        }

        while i < left_run.len() {
            array[k] = left_run[i];
            i += 1;
            k += 1;
            trace.frame(array);
        }

        while j < right_run.len() {
            array[k] = right_run[j];
            j += 1;
            k += 1;
            trace.frame(array);
        }
    }

    fn lay_out_pending(array: &mut [i64], start: usize, left_rest: &[i64], right_rest: &[i64]) {
        let split = start + left_rest.len();
        array[start..split].copy_from_slice(left_rest);
        array[split..split + right_rest.len()].copy_from_slice(right_rest);
    }
}

impl SortStrategy for MergeSort {
    fn name(&self) -> &'static str {
        "Merge Sort"
    }

    fn sort(&self, input: &[i64]) -> SortOutcome {
        let mut array = input.to_vec();
        let mut trace = TraceRecorder::default();

        if !array.is_empty() {
            let right = array.len() - 1;
            Self::merge_sort(&mut array, 0, right, &mut trace);
        }

        trace.finish(array)
    }
}

// =============================================================================
// ALGORITHM SELECTION
// =============================================================================

/// Closed set of the available sorting algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortAlgorithm {
    Bubble,
    Quick,
    Merge,
}

impl SortAlgorithm {
    /// Returns every algorithm.
    pub fn all() -> [SortAlgorithm; 3] {
        [SortAlgorithm::Bubble, SortAlgorithm::Quick, SortAlgorithm::Merge]
    }

    /// Returns the short identifier used on the command line.
    pub fn key(&self) -> &'static str {
        match self {
            SortAlgorithm::Bubble => "bubble",
            SortAlgorithm::Quick => "quick",
            SortAlgorithm::Merge => "merge",
        }
    }

    /// Creates the strategy implementing this algorithm.
    pub fn strategy(&self) -> Box<dyn SortStrategy> {
        match self {
            SortAlgorithm::Bubble => Box::new(BubbleSort),
            SortAlgorithm::Quick => Box::new(QuickSort),
            SortAlgorithm::Merge => Box::new(MergeSort),
        }
    }

    /// Returns true if equal elements keep their relative order.
    pub fn is_stable(&self) -> bool {
        matches!(self, SortAlgorithm::Merge)
    }
}

impl fmt::Display for SortAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for SortAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bubble" | "bubble_sort" | "bubblesort" => Ok(SortAlgorithm::Bubble),
            "quick" | "quick_sort" | "quicksort" => Ok(SortAlgorithm::Quick),
            "merge" | "merge_sort" | "mergesort" => Ok(SortAlgorithm::Merge),
            _ => Err(format!("Unknown sort algorithm: {}", s)),
        }
    }
}

// =============================================================================
// SORT CONTEXT
// =============================================================================

/// Holds the active strategy and runs it on demand.
///
/// Switching strategy never re-sorts anything; it only changes what the next
/// [`SortContext::execute`] call uses.
pub struct SortContext {
    strategy: Box<dyn SortStrategy>,
}

impl SortContext {
    /// Creates a context with the given strategy.
    pub fn new(strategy: Box<dyn SortStrategy>) -> Self {
        Self { strategy }
    }

    /// Creates a context for a named algorithm.
    pub fn with_algorithm(algorithm: SortAlgorithm) -> Self {
        Self::new(algorithm.strategy())
    }

    pub fn set_strategy(&mut self, strategy: Box<dyn SortStrategy>) {
        self.strategy = strategy;
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Sorts `input` with the active strategy.
    pub fn execute(&self, input: &[i64]) -> SortOutcome {
        self.strategy.sort(input)
    }
}

impl fmt::Debug for SortContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortContext")
            .field("strategy", &self.strategy.name())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn is_permutation(a: &[i64], b: &[i64]) -> bool {
        let mut a = a.to_vec();
        let mut b = b.to_vec();
        a.sort_unstable();
        b.sort_unstable();
        a == b
    }

    #[test]
    fn test_bubble_sort_sorts() {
        let outcome = BubbleSort.sort(&[5, 2, 8, 1, 9]);
        assert_eq!(outcome.array, vec![1, 2, 5, 8, 9]);
        assert!(!outcome.steps.is_empty());
    }

    #[test]
    fn test_bubble_sort_no_early_exit() {
        // n = 4 -> 3 + 2 + 1 comparisons even though nothing moves
        let outcome = BubbleSort.sort(&[1, 2, 3, 4]);
        let summary = outcome.summary();
        assert_eq!(summary.comparisons, 6);
        assert_eq!(summary.swaps, 0);
        assert_eq!(summary.total_steps, 7);
    }

    #[test]
    fn test_empty_and_single_inputs() {
        for algorithm in SortAlgorithm::all() {
            let strategy = algorithm.strategy();

            let empty = strategy.sort(&[]);
            assert!(empty.array.is_empty());
            assert_eq!(empty.steps.len(), 1);
            assert!(empty.steps[0].is_terminal());

            let single = strategy.sort(&[7]);
            assert_eq!(single.array, vec![7]);
            assert_eq!(single.steps.len(), 1);
            assert_eq!(single.steps[0].sorted, Some(vec![0]));
        }
    }

    #[test]
    fn test_quick_sort_pivot_trace() {
        // Pivot 2 is compared against every other element of the range
        let outcome = QuickSort.sort(&[3, 1, 2]);
        assert_eq!(outcome.array, vec![1, 2, 3]);
        assert_eq!(outcome.steps[0].comparing, Some((0, 2)));
        assert_eq!(outcome.steps[1].comparing, Some((1, 2)));
        // 1 < 2 moves into slot 0
        assert_eq!(outcome.steps[2].swapping, Some((0, 1)));
        assert_eq!(outcome.steps[2].array, vec![1, 3, 2]);
        // Pivot placement is always recorded
        assert_eq!(outcome.steps[3].swapping, Some((1, 2)));
        assert_eq!(outcome.steps[3].array, vec![1, 2, 3]);
    }

    #[test]
    fn test_quick_sort_handles_duplicates() {
        let outcome = QuickSort.sort(&[4, 4, 1, 4, 0, 4]);
        assert_eq!(outcome.array, vec![0, 1, 4, 4, 4, 4]);
    }

    #[test]
    fn test_merge_sort_comparisons_use_live_positions() {
        let outcome = MergeSort.sort(&[2, 1]);
        assert_eq!(outcome.steps[0].comparing, Some((0, 1)));
        assert_eq!(outcome.array, vec![1, 2]);
    }

    #[test]
    fn test_merge_sort_snapshots_are_permutations() {
        let input = [9, 3, 7, 3, 1, 8, 2, 2];
        let outcome = MergeSort.sort(&input);
        for step in &outcome.steps {
            assert!(is_permutation(&step.array, &input), "frame {:?}", step.array);
        }
    }

    #[test]
    fn test_merge_sort_ties_favor_left_run() {
        // Taking the left head on ties drains the left run first, so the
        // second merge of [1, 1] with [1] needs two comparisons instead of one.
        let outcome = MergeSort.sort(&[1, 1, 1]);
        assert_eq!(outcome.summary().comparisons, 3);
        assert!(SortAlgorithm::Merge.is_stable());
        assert!(!SortAlgorithm::Quick.is_stable());
    }

    #[test]
    fn test_context_switching_does_not_resort() {
        let mut context = SortContext::with_algorithm(SortAlgorithm::Bubble);
        assert_eq!(context.strategy_name(), "Bubble Sort");

        context.set_strategy(Box::new(QuickSort));
        assert_eq!(context.strategy_name(), "Quick Sort");

        let outcome = context.execute(&[5, 2, 8, 1, 9]);
        assert_eq!(outcome.array, vec![1, 2, 5, 8, 9]);
    }

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!("bubble".parse::<SortAlgorithm>(), Ok(SortAlgorithm::Bubble));
        assert_eq!("QuickSort".parse::<SortAlgorithm>(), Ok(SortAlgorithm::Quick));
        assert_eq!("merge_sort".parse::<SortAlgorithm>(), Ok(SortAlgorithm::Merge));
        assert!("bogo".parse::<SortAlgorithm>().is_err());
    }

    #[test]
    fn test_step_serialization_skips_empty_markers() {
        let outcome = BubbleSort.sort(&[2, 1]);
        let json = serde_json::to_value(&outcome.steps[0]).unwrap();
        assert!(json.get("comparing").is_some());
        assert!(json.get("swapping").is_none());
        assert!(json.get("sorted").is_none());
    }

    proptest! {
        #[test]
        fn prop_every_algorithm_sorts_with_valid_trace(
            input in proptest::collection::vec(-50i64..50, 0..40)
        ) {
            let mut expected = input.clone();
            expected.sort();

            for algorithm in SortAlgorithm::all() {
                let outcome = algorithm.strategy().sort(&input);
                prop_assert_eq!(&outcome.array, &expected);

                let last = outcome.steps.last().unwrap();
                prop_assert!(last.is_terminal());
                prop_assert_eq!(&last.array, &expected);

                for step in &outcome.steps {
                    prop_assert!(is_permutation(&step.array, &input));
                }
            }
        }
    }
}
