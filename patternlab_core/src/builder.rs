//! The Builder Engine - Fluent Pizza Assembly
//!
//! [`PizzaBuilder`] accumulates a configuration through chained calls and
//! validates it in [`PizzaBuilder::build`]. Price is additive per call:
//!
//! | Call                  | Price |
//! |-----------------------|-------|
//! | size small/medium/large | +8 / +12 / +16 |
//! | crust thin/thick/stuffed | +0 / +0 / +3 |
//! | each topping          | +2 |
//! | cheese                | +1 |
//!
//! Calling a setter twice adds its price twice.

use crate::error::PatternError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PizzaSize {
    Small,
    Medium,
    Large,
}

impl PizzaSize {
    pub fn price(&self) -> u32 {
        match self {
            PizzaSize::Small => 8,
            PizzaSize::Medium => 12,
            PizzaSize::Large => 16,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PizzaSize::Small => "small",
            PizzaSize::Medium => "medium",
            PizzaSize::Large => "large",
        }
    }
}

impl FromStr for PizzaSize {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "small" => Ok(PizzaSize::Small),
            "medium" => Ok(PizzaSize::Medium),
            "large" => Ok(PizzaSize::Large),
            _ => Err(PatternError::validation(format!("Unknown pizza size: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Crust {
    Thin,
    Thick,
    Stuffed,
}

impl Crust {
    pub fn price(&self) -> u32 {
        match self {
            Crust::Stuffed => 3,
            Crust::Thin | Crust::Thick => 0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Crust::Thin => "thin",
            Crust::Thick => "thick",
            Crust::Stuffed => "stuffed",
        }
    }
}

impl FromStr for Crust {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "thin" => Ok(Crust::Thin),
            "thick" => Ok(Crust::Thick),
            "stuffed" => Ok(Crust::Stuffed),
            _ => Err(PatternError::validation(format!("Unknown crust: {}", s))),
        }
    }
}

/// A validated pizza. Produced only by [`PizzaBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pizza {
    size: PizzaSize,
    crust: Crust,
    toppings: Vec<String>,
    cheese: bool,
    price: u32,
}

impl Pizza {
    pub fn size(&self) -> PizzaSize {
        self.size
    }

    pub fn crust(&self) -> Crust {
        self.crust
    }

    pub fn toppings(&self) -> &[String] {
        &self.toppings
    }

    pub fn has_cheese(&self) -> bool {
        self.cheese
    }

    pub fn price(&self) -> u32 {
        self.price
    }
}

impl fmt::Display for Pizza {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}-crust pizza", self.size.name(), self.crust.name())?;
        if !self.toppings.is_empty() {
            write!(f, " with {}", self.toppings.join(", "))?;
        }
        if self.cheese {
            write!(f, " (extra cheese)")?;
        }
        write!(f, " - ${}", self.price)
    }
}

/// Mutable accumulator for a [`Pizza`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PizzaBuilder {
    size: Option<PizzaSize>,
    crust: Option<Crust>,
    toppings: Vec<String>,
    cheese: bool,
    price: u32,
}

impl PizzaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_size(&mut self, size: PizzaSize) -> &mut Self {
        self.size = Some(size);
        self.price += size.price();
        self
    }

    pub fn set_crust(&mut self, crust: Crust) -> &mut Self {
        self.crust = Some(crust);
        self.price += crust.price();
        self
    }

    pub fn add_topping(&mut self, topping: impl Into<String>) -> &mut Self {
        self.toppings.push(topping.into());
        self.price += 2;
        self
    }

    pub fn add_cheese(&mut self) -> &mut Self {
        self.cheese = true;
        self.price += 1;
        self
    }

    /// Price accumulated so far.
    pub fn current_price(&self) -> u32 {
        self.price
    }

    /// Returns a snapshot of the configuration, or a validation error when
    /// size or crust is missing. The builder is left untouched either way.
    pub fn build(&self) -> Result<Pizza, PatternError> {
        let (size, crust) = match (self.size, self.crust) {
            (Some(size), Some(crust)) => (size, crust),
            _ => return Err(PatternError::validation("Size and crust are required")),
        };

        Ok(Pizza {
            size,
            crust,
            toppings: self.toppings.clone(),
            cheese: self.cheese,
            price: self.price,
        })
    }

    /// Restores the empty starting configuration.
    pub fn reset(&mut self) -> &mut Self {
        *self = Self::default();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_large_stuffed_pepperoni() {
        let pizza = PizzaBuilder::new()
            .set_size(PizzaSize::Large)
            .set_crust(Crust::Stuffed)
            .add_topping("Pepperoni")
            .build()
            .unwrap();

        assert_eq!(pizza.price(), 21);
        assert_eq!(pizza.toppings(), ["Pepperoni".to_string()]);
        assert!(!pizza.has_cheese());
    }

    #[test]
    fn test_order_does_not_change_price() {
        let a = PizzaBuilder::new()
            .add_cheese()
            .add_topping("Olives")
            .set_crust(Crust::Thin)
            .set_size(PizzaSize::Small)
            .build()
            .unwrap();
        let b = PizzaBuilder::new()
            .set_size(PizzaSize::Small)
            .set_crust(Crust::Thin)
            .add_topping("Olives")
            .add_cheese()
            .build()
            .unwrap();

        assert_eq!(a.price(), 11);
        assert_eq!(a, b);
    }

    #[test]
    fn test_build_requires_size_and_crust() {
        let err = PizzaBuilder::new().add_topping("Ham").build().unwrap_err();
        assert!(matches!(err, PatternError::Validation(_)));

        let err = PizzaBuilder::new().set_size(PizzaSize::Medium).build().unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: Size and crust are required");

        assert!(PizzaBuilder::new().set_crust(Crust::Thick).build().is_err());
    }

    #[test]
    fn test_reset_restores_empty_configuration() {
        let mut builder = PizzaBuilder::new();
        builder.set_size(PizzaSize::Large).add_cheese().add_topping("Ham");
        builder.reset();

        assert_eq!(builder, PizzaBuilder::default());
        assert_eq!(builder.current_price(), 0);
        assert!(builder.build().is_err());
    }

    #[test]
    fn test_repeated_setter_adds_again() {
        let pizza = PizzaBuilder::new()
            .set_size(PizzaSize::Small)
            .set_size(PizzaSize::Medium)
            .set_crust(Crust::Thin)
            .build()
            .unwrap();

        assert_eq!(pizza.size(), PizzaSize::Medium);
        assert_eq!(pizza.price(), 20);
    }

    #[test]
    fn test_parse_options() {
        assert_eq!("LARGE".parse::<PizzaSize>().unwrap(), PizzaSize::Large);
        assert_eq!("stuffed".parse::<Crust>().unwrap(), Crust::Stuffed);
        assert!("huge".parse::<PizzaSize>().is_err());
    }

    #[test]
    fn test_display() {
        let pizza = PizzaBuilder::new()
            .set_size(PizzaSize::Medium)
            .set_crust(Crust::Thick)
            .add_topping("Mushroom")
            .add_cheese()
            .build()
            .unwrap();
        assert_eq!(
            pizza.to_string(),
            "medium thick-crust pizza with Mushroom (extra cheese) - $15"
        );
    }
}
