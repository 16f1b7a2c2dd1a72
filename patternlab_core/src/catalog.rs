//! Static metadata for every pattern the engines demonstrate.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternCategory {
    Behavioral,
    Structural,
    Creational,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// One catalog entry. `slug` is the stable key used by progress tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PatternInfo {
    pub id: &'static str,
    pub slug: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub category: PatternCategory,
    pub description: &'static str,
    pub difficulty: Difficulty,
}

const PATTERNS: [PatternInfo; 10] = [
    PatternInfo {
        id: "1",
        slug: "observer",
        name: "Observer",
        category: PatternCategory::Behavioral,
        description: "A subscription mechanism to notify multiple objects about any events that happen to the object they're observing.",
        difficulty: Difficulty::Beginner,
    },
    PatternInfo {
        id: "2",
        slug: "strategy",
        name: "Strategy",
        category: PatternCategory::Behavioral,
        description: "Defines a family of algorithms, puts each in its own type, and makes them interchangeable at runtime.",
        difficulty: Difficulty::Beginner,
    },
    PatternInfo {
        id: "3",
        slug: "state",
        name: "State",
        category: PatternCategory::Behavioral,
        description: "Lets an object alter its behavior when its internal state changes.",
        difficulty: Difficulty::Intermediate,
    },
    PatternInfo {
        id: "4",
        slug: "command",
        name: "Command",
        category: PatternCategory::Behavioral,
        description: "Turns a request into a stand-alone object, enabling undo, redo and history.",
        difficulty: Difficulty::Intermediate,
    },
    PatternInfo {
        id: "5",
        slug: "builder",
        name: "Builder",
        category: PatternCategory::Creational,
        description: "Constructs complex objects step by step and validates them before use.",
        difficulty: Difficulty::Beginner,
    },
    PatternInfo {
        id: "6",
        slug: "decorator",
        name: "Decorator",
        category: PatternCategory::Structural,
        description: "Attaches new behavior to objects by wrapping them in objects that share their interface.",
        difficulty: Difficulty::Intermediate,
    },
    PatternInfo {
        id: "7",
        slug: "factory",
        name: "Factory",
        category: PatternCategory::Creational,
        description: "Creates families of related objects without naming their concrete types.",
        difficulty: Difficulty::Beginner,
    },
    PatternInfo {
        id: "8",
        slug: "singleton",
        name: "Singleton",
        category: PatternCategory::Creational,
        description: "Ensures a type has only one instance and provides a global point of access to it.",
        difficulty: Difficulty::Beginner,
    },
    PatternInfo {
        id: "9",
        slug: "proxy",
        name: "Proxy",
        category: PatternCategory::Structural,
        description: "Provides a placeholder that controls access to another object, such as loading it lazily.",
        difficulty: Difficulty::Intermediate,
    },
    PatternInfo {
        id: "10",
        slug: "adapter",
        name: "Adapter",
        category: PatternCategory::Structural,
        description: "Allows objects with incompatible interfaces to collaborate.",
        difficulty: Difficulty::Beginner,
    },
];

/// All patterns in display order.
pub fn catalog() -> &'static [PatternInfo] {
    &PATTERNS
}

/// Looks up a pattern by slug.
pub fn find(slug: &str) -> Option<&'static PatternInfo> {
    PATTERNS.iter().find(|p| p.slug == slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_slugs_and_ids_are_unique() {
        let slugs: HashSet<_> = catalog().iter().map(|p| p.slug).collect();
        let ids: HashSet<_> = catalog().iter().map(|p| p.id).collect();
        assert_eq!(slugs.len(), catalog().len());
        assert_eq!(ids.len(), catalog().len());
    }

    #[test]
    fn test_find() {
        let observer = find("observer").unwrap();
        assert_eq!(observer.name, "Observer");
        assert_eq!(observer.category, PatternCategory::Behavioral);
        assert!(find("visitor").is_none());
    }

    #[test]
    fn test_serializes_category_as_type() {
        let json = serde_json::to_value(find("proxy").unwrap()).unwrap();
        assert_eq!(json["type"], "Structural");
        assert_eq!(json["difficulty"], "Intermediate");
    }
}
