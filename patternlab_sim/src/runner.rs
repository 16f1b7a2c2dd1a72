//! Scenario runner - drives each pattern engine through its checks.

use crate::exporter::TraceEvent;
use crate::oracle::{verify_sort_trace, Oracle};
use crate::scenarios::ScenarioId;

use patternlab_core::factory::{Button, Dialog};
use patternlab_core::{
    brew, CallbackObserver, Coffee, Command, CommandHistory, Condiment, DatabaseConnection,
    Document, DocumentState, Image, ImageProxy, InsertText, LegacyPaymentSystem, ListenerError,
    Observer, PatternError, PaymentAdapter, PaymentProcessor, Platform, PizzaBuilder,
    SortAlgorithm, SortContext, SortStep, Subject, TopicSubject, UiFactory,
};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default length of seeded sort inputs.
pub const DEFAULT_SEQUENCE_LEN: usize = 10;

/// Default number of steps in a seeded edit script.
pub const DEFAULT_EDIT_OPS: usize = 12;

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether scenario passed all assertions
    pub passed: bool,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during run
    pub metrics: ScenarioMetrics,

    /// Frames and events recorded during run
    pub trace: ScenarioTrace,
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioMetrics {
    /// Assertions evaluated
    pub checks: u64,

    /// Sort frames recorded for playback
    pub frames: u64,

    /// Comparison frames across all sort runs
    pub comparisons: u64,

    /// Swap frames across all sort runs
    pub swaps: u64,

    /// Events logged
    pub events: u64,
}

/// What a scenario recorded beyond its verdict.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioTrace {
    /// Sort trace of the configured algorithm (strategy scenario only)
    pub frames: Vec<SortStep>,

    pub events: Vec<TraceEvent>,
}

/// Accumulates checks and events while one scenario runs.
#[derive(Default)]
struct Probe {
    metrics: ScenarioMetrics,
    trace: ScenarioTrace,
}

impl Probe {
    fn check(&mut self, ok: bool, failure: impl FnOnce() -> String) -> Result<(), String> {
        self.metrics.checks += 1;
        if ok {
            Ok(())
        } else {
            Err(failure())
        }
    }

    fn event(&mut self, message: impl Into<String>) {
        let event = TraceEvent::info(message);
        debug!("  {}", event.message);
        self.metrics.events += 1;
        self.trace.events.push(event);
    }
}

/// Runs pattern scenarios.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Length of seeded sort inputs
    sequence_len: usize,

    /// Algorithm whose trace is kept for playback
    algorithm: SortAlgorithm,

    /// Steps in the seeded edit script
    edit_ops: usize,

    /// Connection handed in by the composition root
    connection: Option<Arc<DatabaseConnection>>,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            sequence_len: DEFAULT_SEQUENCE_LEN,
            algorithm: SortAlgorithm::Bubble,
            edit_ops: DEFAULT_EDIT_OPS,
            connection: None,
        }
    }

    /// Sets the sort input length.
    pub fn with_sequence_len(mut self, len: usize) -> Self {
        self.sequence_len = len;
        self
    }

    /// Sets the algorithm whose trace is recorded.
    pub fn with_algorithm(mut self, algorithm: SortAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets the edit script length.
    pub fn with_edit_ops(mut self, ops: usize) -> Self {
        self.edit_ops = ops;
        self
    }

    /// Injects the shared connection the singleton scenario checks against.
    pub fn with_connection(mut self, connection: Arc<DatabaseConnection>) -> Self {
        self.connection = Some(connection);
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);

        // Each scenario gets its own input stream so adding one never
        // shifts another's inputs
        let mut oracle = Oracle::new(self.seed ^ scenario_salt(scenario));
        let mut probe = Probe::default();

        let outcome = match scenario {
            ScenarioId::Strategy => self.run_strategy(&mut oracle, &mut probe),
            ScenarioId::Command => self.run_command(&mut oracle, &mut probe),
            ScenarioId::State => self.run_state(&mut oracle, &mut probe),
            ScenarioId::Observer => self.run_observer(&mut oracle, &mut probe),
            ScenarioId::Proxy => self.run_proxy(&mut oracle, &mut probe),
            ScenarioId::Builder => self.run_builder(&mut oracle, &mut probe),
            ScenarioId::Decorator => self.run_decorator(&mut oracle, &mut probe),
            ScenarioId::Factory => self.run_factory(&mut oracle, &mut probe),
            ScenarioId::Singleton => self.run_singleton(&mut probe),
            ScenarioId::Adapter => self.run_adapter(&mut oracle, &mut probe),
        };

        if let Err(reason) = &outcome {
            warn!("Scenario {} failed: {}", scenario.name(), reason);
            probe.trace.events.push(TraceEvent::warn(reason.clone()));
            probe.metrics.events += 1;
        }

        ScenarioResult {
            scenario,
            seed: self.seed,
            passed: outcome.is_ok(),
            failure_reason: outcome.err(),
            metrics: probe.metrics,
            trace: probe.trace,
        }
    }

    /// PAT-001: every algorithm sorts the same seeded input with a valid
    /// trace, agrees with the others, and handles the trivial inputs.
    fn run_strategy(&self, oracle: &mut Oracle, probe: &mut Probe) -> Result<(), String> {
        let input = oracle.random_sequence(self.sequence_len);
        probe.event(format!("Input: {:?}", input));

        let mut context = SortContext::with_algorithm(SortAlgorithm::Bubble);
        let mut reference: Option<Vec<i64>> = None;

        for algorithm in SortAlgorithm::all() {
            context.set_strategy(algorithm.strategy());
            let outcome = context.execute(&input);

            probe.metrics.checks += 1;
            verify_sort_trace(&input, &outcome)
                .map_err(|e| format!("{}: {}", algorithm, e))?;

            match &reference {
                Some(expected) => probe.check(&outcome.array == expected, || {
                    format!("{} disagrees with the other algorithms", algorithm)
                })?,
                None => reference = Some(outcome.array.clone()),
            }

            let summary = outcome.summary();
            probe.metrics.comparisons += summary.comparisons as u64;
            probe.metrics.swaps += summary.swaps as u64;
            probe.event(format!(
                "{} finished in {} steps ({} comparisons, {} swaps)",
                context.strategy_name(),
                summary.total_steps,
                summary.comparisons,
                summary.swaps
            ));

            if algorithm == self.algorithm {
                probe.metrics.frames = outcome.steps.len() as u64;
                probe.trace.frames = outcome.steps;
            }
        }

        // Bubble sort never exits early
        let n = input.len();
        let bubble = SortAlgorithm::Bubble.strategy().sort(&input).summary();
        probe.check(bubble.comparisons == n * n.saturating_sub(1) / 2, || {
            format!("bubble sort made {} comparisons for {} values", bubble.comparisons, n)
        })?;

        let single = oracle.random_sequence(1);
        for trivial in [Vec::new(), single] {
            for algorithm in SortAlgorithm::all() {
                let outcome = algorithm.strategy().sort(&trivial);
                probe.check(
                    outcome.steps.len() == 1 && outcome.steps[0].is_terminal(),
                    || format!("{} on {:?} should yield one terminal step", algorithm, trivial),
                )?;
            }
        }

        Ok(())
    }

    /// PAT-002: a seeded edit script tracks a plain string model; undoing
    /// everything restores the empty buffer, redo replays it, and a new
    /// command after undo discards the redo tail.
    fn run_command(&self, oracle: &mut Oracle, probe: &mut Probe) -> Result<(), String> {
        let script = oracle.edit_script(self.edit_ops);
        let mut history = CommandHistory::new();
        let mut model = String::new();
        let mut snapshots = vec![String::new()];

        for op in &script {
            let command = op.command(history.buffer());
            probe.event(command.description().to_string());
            history.execute(command);
            op.apply_to(&mut model);

            probe.check(history.buffer().text() == model, || {
                format!("buffer {:?} diverged from model {:?}", history.buffer().text(), model)
            })?;
            snapshots.push(model.clone());
        }

        for expected in snapshots.iter().rev().skip(1) {
            probe.check(history.undo(), || "undo refused with history left".to_string())?;
            probe.check(history.buffer().text() == expected, || {
                format!("undo produced {:?}, expected {:?}", history.buffer().text(), expected)
            })?;
        }
        probe.check(
            !history.undo() && !history.can_undo() && history.buffer().is_empty(),
            || "undoing everything did not restore the empty buffer".to_string(),
        )?;

        for expected in snapshots.iter().skip(1) {
            probe.check(history.redo(), || "redo refused with commands left".to_string())?;
            probe.check(history.buffer().text() == expected, || {
                format!("redo produced {:?}, expected {:?}", history.buffer().text(), expected)
            })?;
        }
        probe.check(!history.can_redo(), || "redo still possible at the end".to_string())?;

        if script.len() >= 2 {
            history.undo();
            history.undo();
            history.execute(Box::new(InsertText::new("!", 0)));
            probe.check(
                !history.can_redo() && history.len() == script.len() - 1,
                || format!("divergence left {} commands stored", history.len()),
            )?;
        }

        Ok(())
    }

    /// PAT-003: a seeded walk over the workflow matches a position model,
    /// and editing is only possible in draft.
    fn run_state(&self, oracle: &mut Oracle, probe: &mut Probe) -> Result<(), String> {
        const CHAIN: [DocumentState; 3] = [
            DocumentState::Draft,
            DocumentState::Review,
            DocumentState::Published,
        ];

        let mut document = Document::new();
        let mut position = 0usize;

        for step in 0..20 {
            let forward = oracle.chance(0.5);
            let moved = if forward {
                document.next_state()
            } else {
                document.previous_state()
            };

            let expected_move = if forward {
                position + 1 < CHAIN.len()
            } else {
                position > 0
            };
            if expected_move {
                position = if forward { position + 1 } else { position - 1 };
            }

            probe.check(moved == expected_move && document.state() == CHAIN[position], || {
                format!("step {}: expected {}, found {}", step, CHAIN[position], document.state())
            })?;
            if moved {
                probe.event(format!("Moved to {}", document.state()));
            }

            let edit = document.edit(format!("revision {}", step));
            let allowed = position == 0;
            probe.check(
                edit.is_ok() == allowed
                    && (allowed || matches!(edit, Err(PatternError::EditLocked(_)))),
                || format!("edit in {} returned {:?}", document.state(), edit),
            )?;
        }

        // Three forward moves from any state end in published
        for _ in 0..CHAIN.len() {
            document.next_state();
        }
        probe.check(document.state() == DocumentState::Published, || {
            "forward moves did not reach published".to_string()
        })?;

        Ok(())
    }

    /// PAT-004: observers are called in attach order, duplicates are
    /// ignored, detached observers stop receiving, and a failing observer
    /// aborts `notify` but not `notify_isolated`.
    fn run_observer(&self, oracle: &mut Oracle, probe: &mut Probe) -> Result<(), String> {
        type Log = Rc<RefCell<Vec<(String, String)>>>;

        fn recording(id: &str, log: &Log) -> Box<dyn Observer<String>> {
            let log = Rc::clone(log);
            let owner = id.to_string();
            Box::new(CallbackObserver::new(id, move |data: &String| {
                log.borrow_mut().push((owner.clone(), data.clone()));
                Ok(())
            }))
        }

        let log: Log = Rc::default();
        let mut subject = TopicSubject::new(String::new());

        let mut ids: Vec<String> = (0..4).map(|i| format!("observer-{}", i)).collect();
        oracle.shuffle(&mut ids);
        for id in &ids {
            subject.attach(recording(id, &log));
        }
        subject.attach(recording(&ids[0], &log));
        probe.check(subject.observer_count() == ids.len(), || {
            "duplicate attach registered twice".to_string()
        })?;

        let delivered_to = |log: &Log, value: &str| -> Vec<String> {
            log.borrow()
                .iter()
                .filter(|(_, data)| data == value)
                .map(|(id, _)| id.clone())
                .collect()
        };

        subject.notify("v1".to_string()).map_err(|e| e.to_string())?;
        probe.check(delivered_to(&log, "v1") == ids && subject.state() == "v1", || {
            format!("v1 reached {:?}, expected {:?}", delivered_to(&log, "v1"), ids)
        })?;

        let detached = ids[ids.len() - 1].clone();
        subject.detach(&detached);
        subject.notify("v2".to_string()).map_err(|e| e.to_string())?;
        probe.check(
            delivered_to(&log, "v2") == ids[..ids.len() - 1],
            || format!("{} still received after detach", detached),
        )?;
        probe.event(format!("Detached {}", detached));

        subject.attach(Box::new(CallbackObserver::new("faulty", |_: &String| {
            Err(ListenerError::new("refused"))
        })));
        subject.attach(recording("late", &log));

        let failed = subject.notify("v3".to_string());
        let failed_id = match &failed {
            Err(PatternError::ObserverFailed { observer_id, .. }) => Some(observer_id.clone()),
            _ => None,
        };
        probe.check(failed_id.as_deref() == Some("faulty"), || {
            format!("expected faulty observer failure, got {:?}", failed)
        })?;
        probe.check(
            !delivered_to(&log, "v3").contains(&"late".to_string()) && subject.state() == "v3",
            || "observer after the failing one was still called".to_string(),
        )?;
        probe.event("faulty aborted the v3 pass");

        let errors = subject.notify_isolated("v4".to_string());
        probe.check(
            errors.len() == 1 && delivered_to(&log, "v4").contains(&"late".to_string()),
            || format!("isolated notify returned {} errors", errors.len()),
        )?;

        Ok(())
    }

    /// PAT-005: a proxy reports size 0 until displayed, then the loaded size.
    fn run_proxy(&self, oracle: &mut Oracle, probe: &mut Probe) -> Result<(), String> {
        for index in 1..=3 {
            let filename = format!("photo{}.jpg", index);
            let size = oracle.image_size();
            let proxy = ImageProxy::with_size_source(filename.clone(), move |_| size);

            probe.check(!proxy.is_loaded() && proxy.size() == 0, || {
                format!("{} loaded before display", filename)
            })?;

            if !oracle.chance(0.7) {
                probe.event(format!("{} left unloaded", filename));
                continue;
            }

            let shown = proxy.display();
            probe.check(shown == format!("Displaying {}", filename), || {
                format!("unexpected display output {:?}", shown)
            })?;
            probe.check(proxy.is_loaded() && proxy.size() == size, || {
                format!("{} reports {} bytes, expected {}", filename, proxy.size(), size)
            })?;

            // Second display reuses the loaded image
            proxy.display();
            probe.check(proxy.size() == size, || "size changed on redisplay".to_string())?;
            probe.event(format!("{} loaded ({} bytes)", filename, size));
        }
        Ok(())
    }

    /// PAT-006: seeded orders price by the published rules; an order
    /// missing its crust is rejected.
    fn run_builder(&self, oracle: &mut Oracle, probe: &mut Probe) -> Result<(), String> {
        let mut builder = PizzaBuilder::new();

        for _ in 0..3 {
            let order = oracle.pizza_order();
            builder.reset().set_size(order.size).set_crust(order.crust);
            for topping in &order.toppings {
                builder.add_topping(topping.clone());
            }
            if order.cheese {
                builder.add_cheese();
            }

            let expected = order.expected_price();
            probe.check(builder.current_price() == expected, || {
                format!("running price {} != {}", builder.current_price(), expected)
            })?;

            let pizza = builder.build().map_err(|e| e.to_string())?;
            probe.check(
                pizza.price() == expected && pizza.toppings() == order.toppings.as_slice(),
                || format!("built {} for order {:?}", pizza, order),
            )?;
            probe.event(pizza.to_string());
        }

        let order = oracle.pizza_order();
        let mut partial = PizzaBuilder::new();
        partial.set_size(order.size);
        probe.check(
            matches!(partial.build(), Err(PatternError::Validation(_))),
            || "build without crust succeeded".to_string(),
        )?;

        Ok(())
    }

    /// PAT-007: stacked condiments add their costs and append their labels
    /// innermost first.
    fn run_decorator(&self, oracle: &mut Oracle, probe: &mut Probe) -> Result<(), String> {
        fn label(condiment: Condiment) -> (&'static str, u32) {
            match condiment {
                Condiment::Milk => ("Milk", 2),
                Condiment::Sugar => ("Sugar", 1),
                Condiment::WhippedCream => ("Whipped Cream", 3),
            }
        }

        let mut orders = vec![vec![Condiment::Milk, Condiment::Sugar]];
        for _ in 0..3 {
            orders.push(oracle.condiments(4));
        }

        for condiments in orders {
            let coffee = brew(&condiments);
            let mut cost = 5;
            let mut description = "Simple Coffee".to_string();
            for condiment in &condiments {
                let (name, price) = label(*condiment);
                cost += price;
                description.push_str(", ");
                description.push_str(name);
            }

            probe.check(coffee.cost() == cost && coffee.description() == description, || {
                format!(
                    "{:?} brewed {:?} at {}, expected {:?} at {}",
                    condiments,
                    coffee.description(),
                    coffee.cost(),
                    description,
                    cost
                )
            })?;
            probe.event(format!("{} (${})", description, cost));
        }
        Ok(())
    }

    /// PAT-008: each platform's factory renders its own consistent family.
    fn run_factory(&self, oracle: &mut Oracle, probe: &mut Probe) -> Result<(), String> {
        let mut platforms = Platform::all().to_vec();
        oracle.shuffle(&mut platforms);

        let mut rendered = Vec::new();
        for platform in platforms {
            let factory = platform.factory();
            probe.check(factory.platform() == platform, || {
                format!("{} factory reports {}", platform, factory.platform())
            })?;

            let ui = factory.render_ui();
            let button = factory.create_button();
            probe.check(
                ui.button == button.render()
                    && ui.dialog == factory.create_dialog().render()
                    && !button.on_click().is_empty(),
                || format!("{} family is inconsistent", platform),
            )?;
            probe.event(format!("{}: {}", platform, button.on_click()));
            rendered.push(ui);
        }

        probe.check(
            rendered.windows(2).all(|pair| pair[0] != pair[1]),
            || "platforms rendered identical widgets".to_string(),
        )?;
        Ok(())
    }

    /// PAT-009: repeated `instance()` calls share the injected connection,
    /// and queries only run while connected.
    fn run_singleton(&self, probe: &mut Probe) -> Result<(), String> {
        let connection = self
            .connection
            .clone()
            .unwrap_or_else(DatabaseConnection::instance);

        for _ in 0..10 {
            let again = DatabaseConnection::instance();
            probe.check(Arc::ptr_eq(&again, &connection), || {
                format!(
                    "instance() returned {} instead of {}",
                    again.connection_id(),
                    connection.connection_id()
                )
            })?;
        }
        probe.check(connection.connection_id().len() == 8, || {
            format!("malformed connection id {:?}", connection.connection_id())
        })?;

        let was_connected = connection.is_connected();
        connection.disconnect();
        probe.check(
            matches!(connection.execute_query("SELECT 1"), Err(PatternError::NotConnected)),
            || "query ran while disconnected".to_string(),
        )?;

        connection.connect();
        let query = format!("SELECT * FROM patterns WHERE seed = {}", self.seed);
        let before = connection.queries().len();
        connection.execute_query(&query).map_err(|e| e.to_string())?;
        let queries = connection.queries();
        probe.check(
            queries.len() == before + 1 && queries.last() == Some(&query),
            || "query was not recorded".to_string(),
        )?;
        probe.event(format!("Connection {} ran {:?}", connection.connection_id(), query));

        if !was_connected {
            connection.disconnect();
        }
        Ok(())
    }

    /// PAT-010: the adapter's output is exactly the legacy call's.
    fn run_adapter(&self, oracle: &mut Oracle, probe: &mut Probe) -> Result<(), String> {
        let legacy = LegacyPaymentSystem;

        probe.check(PaymentAdapter::default().currency() == "USD", || {
            "default adapter currency is not USD".to_string()
        })?;

        for _ in 0..3 {
            let amount = oracle.payment_amount();
            let currency = oracle.currency();
            let adapter = PaymentAdapter::new(currency);

            let paid = adapter.pay(amount);
            probe.check(
                adapter.currency() == currency
                    && paid == legacy.process_payment(amount, currency)
                    && paid.starts_with("Legacy: Processing"),
                || format!("adapter returned {:?}", paid),
            )?;
            probe.event(paid);
        }
        Ok(())
    }
}

/// Per-scenario seed salt.
fn scenario_salt(scenario: ScenarioId) -> u64 {
    let index = ScenarioId::all()
        .iter()
        .position(|s| *s == scenario)
        .unwrap_or(0) as u64;
    (index + 1).wrapping_mul(0x9e3779b97f4a7c15)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // The singleton scenario touches process-wide state, so it only runs
    // here and not from other tests in this crate.
    #[test]
    fn test_all_scenarios_pass_across_seeds() {
        for seed in 0..5 {
            let runner = ScenarioRunner::new(seed);
            for scenario in ScenarioId::all() {
                let result = runner.run(scenario);
                assert!(
                    result.passed,
                    "{} seed={} failed: {:?}",
                    scenario,
                    seed,
                    result.failure_reason
                );
                assert!(result.metrics.checks > 0);
            }
        }
    }

    #[test]
    fn test_strategy_records_configured_algorithm() {
        let result = ScenarioRunner::new(42)
            .with_sequence_len(8)
            .with_algorithm(SortAlgorithm::Quick)
            .run(ScenarioId::Strategy);

        assert!(result.passed);
        let reference = SortContext::with_algorithm(SortAlgorithm::Quick)
            .execute(&Oracle::new(42 ^ scenario_salt(ScenarioId::Strategy)).random_sequence(8));
        assert_eq!(result.trace.frames, reference.steps);
        assert_eq!(result.metrics.frames, reference.steps.len() as u64);
    }

    #[test]
    fn test_same_seed_same_trace() {
        let a = ScenarioRunner::new(1234).run(ScenarioId::Strategy);
        let b = ScenarioRunner::new(1234).run(ScenarioId::Strategy);
        assert_eq!(a.trace, b.trace);
        assert_eq!(a.metrics, b.metrics);

        let c = ScenarioRunner::new(1235).run(ScenarioId::Strategy);
        assert_ne!(a.trace.frames, c.trace.frames);
    }

    #[test]
    fn test_command_scenario_logs_descriptions() {
        let result = ScenarioRunner::new(3).with_edit_ops(5).run(ScenarioId::Command);
        assert!(result.passed);
        assert!(result.trace.events[0].message.starts_with("Add \""));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_engine_scenarios_hold_for_any_seed(seed in any::<u64>(), len in 0usize..24) {
            let runner = ScenarioRunner::new(seed).with_sequence_len(len);
            for scenario in [ScenarioId::Strategy, ScenarioId::Command, ScenarioId::State, ScenarioId::Observer] {
                let result = runner.run(scenario);
                prop_assert!(result.passed, "{}: {:?}", scenario, result.failure_reason);
            }
        }
    }
}
