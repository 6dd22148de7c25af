pub mod opportunity;
pub mod quote;
pub mod report;

pub use opportunity::*;
pub use quote::*;
pub use report::*;

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two perpetual-futures venues being compared.
///
/// `A` reports funding as a percentage; `B` reports a fraction and settles hourly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Venue {
    A,
    B,
}

impl Venue {
    pub const ALL: [Venue; 2] = [Venue::A, Venue::B];

    pub fn other(self) -> Venue {
        match self {
            Venue::A => Venue::B,
            Venue::B => Venue::A,
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Venue::A => write!(f, "venue_a"),
            Venue::B => write!(f, "venue_b"),
        }
    }
}

/// A value held once per venue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerVenue<T> {
    pub venue_a: T,
    pub venue_b: T,
}

impl<T> PerVenue<T> {
    pub fn new(venue_a: T, venue_b: T) -> Self {
        Self { venue_a, venue_b }
    }

    pub fn get(&self, venue: Venue) -> &T {
        match venue {
            Venue::A => &self.venue_a,
            Venue::B => &self.venue_b,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> PerVenue<U> {
        PerVenue {
            venue_a: f(self.venue_a),
            venue_b: f(self.venue_b),
        }
    }
}
