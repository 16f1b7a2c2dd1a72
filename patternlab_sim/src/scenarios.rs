//! Self-checking scenarios, one per pattern engine.

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioId {
    /// PAT-001: Sorting strategies and their traces
    Strategy,

    /// PAT-002: Text edits with undo/redo
    Command,

    /// PAT-003: Document workflow transitions
    State,

    /// PAT-004: Publish/subscribe fan-out
    Observer,

    /// PAT-005: Deferred image loading
    Proxy,

    /// PAT-006: Stepwise pizza assembly
    Builder,

    /// PAT-007: Stacked coffee condiments
    Decorator,

    /// PAT-008: Platform widget families
    Factory,

    /// PAT-009: Shared database connection
    Singleton,

    /// PAT-010: Legacy payment adaptation
    Adapter,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Strategy,
            ScenarioId::Command,
            ScenarioId::State,
            ScenarioId::Observer,
            ScenarioId::Proxy,
            ScenarioId::Builder,
            ScenarioId::Decorator,
            ScenarioId::Factory,
            ScenarioId::Singleton,
            ScenarioId::Adapter,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Strategy => "strategy",
            ScenarioId::Command => "command",
            ScenarioId::State => "state",
            ScenarioId::Observer => "observer",
            ScenarioId::Proxy => "proxy",
            ScenarioId::Builder => "builder",
            ScenarioId::Decorator => "decorator",
            ScenarioId::Factory => "factory",
            ScenarioId::Singleton => "singleton",
            ScenarioId::Adapter => "adapter",
        }
    }

    /// Catalog slug of the pattern this scenario exercises.
    pub fn slug(&self) -> &'static str {
        // Scenario names double as catalog slugs
        self.name()
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Strategy => "Sort seeded sequences with every algorithm and audit the traces",
            ScenarioId::Command => "Replay a seeded edit script, undo everything, redo, then diverge",
            ScenarioId::State => "Random walk through draft, review and published with edit locks",
            ScenarioId::Observer => "Fan out to ordered observers, detach, and surface a failing one",
            ScenarioId::Proxy => "Image size stays zero until the first display loads it",
            ScenarioId::Builder => "Assemble seeded orders and reject incomplete ones",
            ScenarioId::Decorator => "Stack seeded condiments and check cost and description",
            ScenarioId::Factory => "Render each platform's button and dialog family",
            ScenarioId::Singleton => "Every instance() call returns the injected connection",
            ScenarioId::Adapter => "Adapted payments match the legacy call",
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strategy" | "sorting" | "pat-001" => Ok(ScenarioId::Strategy),
            "command" | "history" | "pat-002" => Ok(ScenarioId::Command),
            "state" | "document" | "pat-003" => Ok(ScenarioId::State),
            "observer" | "pubsub" | "pat-004" => Ok(ScenarioId::Observer),
            "proxy" | "lazy_proxy" | "pat-005" => Ok(ScenarioId::Proxy),
            "builder" | "pizza" | "pat-006" => Ok(ScenarioId::Builder),
            "decorator" | "coffee" | "pat-007" => Ok(ScenarioId::Decorator),
            "factory" | "ui_factory" | "pat-008" => Ok(ScenarioId::Factory),
            "singleton" | "pat-009" => Ok(ScenarioId::Singleton),
            "adapter" | "payment" | "pat-010" => Ok(ScenarioId::Adapter),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_scenario_maps_to_a_catalog_entry() {
        for scenario in ScenarioId::all() {
            assert!(
                patternlab_core::catalog::find(scenario.slug()).is_some(),
                "no catalog entry for {}",
                scenario
            );
        }
        assert_eq!(ScenarioId::all().len(), patternlab_core::catalog().len());
    }

    #[test]
    fn test_parse_names_and_aliases() {
        for scenario in ScenarioId::all() {
            assert_eq!(scenario.name().parse::<ScenarioId>(), Ok(scenario));
        }
        assert_eq!("Sorting".parse::<ScenarioId>(), Ok(ScenarioId::Strategy));
        assert_eq!("PAT-009".parse::<ScenarioId>(), Ok(ScenarioId::Singleton));
        assert!("visitor".parse::<ScenarioId>().is_err());
    }
}
