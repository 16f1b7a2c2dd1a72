//! The Decorator Engine - Stackable Coffee Condiments
//!
//! Every layer wraps exactly one inner [`Coffee`] and adds its own cost and
//! description suffix. Cost is the sum over all layers; the description is
//! built inside-out, so the outermost condiment appears last.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Capability shared by the base beverage and every decorator.
pub trait Coffee {
    fn cost(&self) -> u32;

    fn description(&self) -> String;
}

impl<C: Coffee + ?Sized> Coffee for Box<C> {
    fn cost(&self) -> u32 {
        (**self).cost()
    }

    fn description(&self) -> String {
        (**self).description()
    }
}

/// The undecorated base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimpleCoffee;

impl Coffee for SimpleCoffee {
    fn cost(&self) -> u32 {
        5
    }

    fn description(&self) -> String {
        "Simple Coffee".to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Milk<C>(pub C);

impl<C: Coffee> Coffee for Milk<C> {
    fn cost(&self) -> u32 {
        self.0.cost() + 2
    }

    fn description(&self) -> String {
        self.0.description() + ", Milk"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sugar<C>(pub C);

impl<C: Coffee> Coffee for Sugar<C> {
    fn cost(&self) -> u32 {
        self.0.cost() + 1
    }

    fn description(&self) -> String {
        self.0.description() + ", Sugar"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhippedCream<C>(pub C);

impl<C: Coffee> Coffee for WhippedCream<C> {
    fn cost(&self) -> u32 {
        self.0.cost() + 3
    }

    fn description(&self) -> String {
        self.0.description() + ", Whipped Cream"
    }
}

/// Runtime selector for a decorator layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condiment {
    Milk,
    Sugar,
    WhippedCream,
}

impl Condiment {
    pub fn all() -> [Condiment; 3] {
        [Condiment::Milk, Condiment::Sugar, Condiment::WhippedCream]
    }

    /// Wraps `inner` in this condiment's decorator.
    pub fn wrap(self, inner: Box<dyn Coffee>) -> Box<dyn Coffee> {
        match self {
            Condiment::Milk => Box::new(Milk(inner)),
            Condiment::Sugar => Box::new(Sugar(inner)),
            Condiment::WhippedCream => Box::new(WhippedCream(inner)),
        }
    }
}

impl FromStr for Condiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "milk" => Ok(Condiment::Milk),
            "sugar" => Ok(Condiment::Sugar),
            "whip" | "whipped_cream" | "whipped cream" => Ok(Condiment::WhippedCream),
            _ => Err(format!("Unknown condiment: {}", s)),
        }
    }
}

/// Wraps a [`SimpleCoffee`] in `condiments`, first element innermost.
pub fn brew(condiments: &[Condiment]) -> Box<dyn Coffee> {
    condiments
        .iter()
        .fold(Box::new(SimpleCoffee) as Box<dyn Coffee>, |coffee, condiment| {
            condiment.wrap(coffee)
        })
}
