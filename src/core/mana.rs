//! Mana costs and the mana pool.
//!
//! Costs separate colored requirements from the generic component. The pool
//! tracks floating mana per color within a single step; payment is
//! all-or-nothing so a failed cast can never leave the pool half-spent.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SimError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
    Colorless,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Color::White => 'W',
            Color::Blue => 'U',
            Color::Black => 'B',
            Color::Red => 'R',
            Color::Green => 'G',
            Color::Colorless => 'C',
        };
        write!(f, "{}", c)
    }
}

/// A mana cost: colored requirements plus a generic component payable with
/// any color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ManaCost {
    pub generic: u8,
    pub white: u8,
    pub blue: u8,
    pub black: u8,
    pub red: u8,
    pub green: u8,
    /// Specifically-colorless requirement ({C}), distinct from generic.
    pub colorless: u8,
}

impl ManaCost {
    /// Converted mana cost: generic plus every colored requirement.
    pub fn cmc(&self) -> u32 {
        self.generic as u32
            + self.white as u32
            + self.blue as u32
            + self.black as u32
            + self.red as u32
            + self.green as u32
            + self.colorless as u32
    }

    pub fn is_free(&self) -> bool {
        self.cmc() == 0
    }

    /// The same cost with `n` more generic mana. Used for commander tax.
    pub fn plus_generic(&self, n: u8) -> ManaCost {
        let mut cost = *self;
        cost.generic = cost.generic.saturating_add(n);
        cost
    }

    /// How many mana of `color` this cost strictly requires.
    pub fn colored(&self, color: Color) -> u8 {
        match color {
            Color::White => self.white,
            Color::Blue => self.blue,
            Color::Black => self.black,
            Color::Red => self.red,
            Color::Green => self.green,
            Color::Colorless => self.colorless,
        }
    }
}

impl fmt::Display for ManaCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_free() {
            return write!(f, "{{0}}");
        }
        if self.generic > 0 {
            write!(f, "{{{}}}", self.generic)?;
        }
        for _ in 0..self.colorless {
            write!(f, "{{C}}")?;
        }
        for _ in 0..self.white {
            write!(f, "{{W}}")?;
        }
        for _ in 0..self.blue {
            write!(f, "{{U}}")?;
        }
        for _ in 0..self.black {
            write!(f, "{{B}}")?;
        }
        for _ in 0..self.red {
            write!(f, "{{R}}")?;
        }
        for _ in 0..self.green {
            write!(f, "{{G}}")?;
        }
        Ok(())
    }
}

/// Floating mana available for payment. Never negative; cleared at every
/// step boundary by the turn machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ManaPool {
    pub white: u8,
    pub blue: u8,
    pub black: u8,
    pub red: u8,
    pub green: u8,
    pub colorless: u8,
}

impl ManaPool {
    pub fn new() -> Self {
        ManaPool::default()
    }

    pub fn add(&mut self, color: Color, amount: u8) {
        let slot = self.slot_mut(color);
        *slot = slot.saturating_add(amount);
    }

    pub fn clear(&mut self) {
        *self = ManaPool::default();
    }

    pub fn total(&self) -> u32 {
        self.white as u32
            + self.blue as u32
            + self.black as u32
            + self.red as u32
            + self.green as u32
            + self.colorless as u32
    }

    pub fn amount(&self, color: Color) -> u8 {
        match color {
            Color::White => self.white,
            Color::Blue => self.blue,
            Color::Black => self.black,
            Color::Red => self.red,
            Color::Green => self.green,
            Color::Colorless => self.colorless,
        }
    }

    /// Whether the pool covers `cost`: every colored requirement is met and
    /// the leftovers cover the generic component.
    pub fn can_pay(&self, cost: &ManaCost) -> bool {
        if self.white < cost.white
            || self.blue < cost.blue
            || self.black < cost.black
            || self.red < cost.red
            || self.green < cost.green
            || self.colorless < cost.colorless
        {
            return false;
        }
        let colored_total = cost.white as u32
            + cost.blue as u32
            + cost.black as u32
            + cost.red as u32
            + cost.green as u32
            + cost.colorless as u32;
        self.total() - colored_total >= cost.generic as u32
    }

    /// Pay `cost` from the pool, or fail leaving the pool untouched.
    ///
    /// Colored requirements are deducted first, then generic is filled in
    /// WUBRG-then-colorless order.
    pub fn pay_cost(&mut self, cost: &ManaCost) -> Result<()> {
        if !self.can_pay(cost) {
            return Err(SimError::InsufficientMana(cost.to_string()));
        }

        self.white -= cost.white;
        self.blue -= cost.blue;
        self.black -= cost.black;
        self.red -= cost.red;
        self.green -= cost.green;
        self.colorless -= cost.colorless;

        let mut generic = cost.generic;
        for color in [
            Color::White,
            Color::Blue,
            Color::Black,
            Color::Red,
            Color::Green,
            Color::Colorless,
        ] {
            if generic == 0 {
                break;
            }
            let slot = self.slot_mut(color);
            let spend = (*slot).min(generic);
            *slot -= spend;
            generic -= spend;
        }
        debug_assert_eq!(generic, 0, "can_pay accepted an unpayable cost");
        Ok(())
    }

    fn slot_mut(&mut self, color: Color) -> &mut u8 {
        match color {
            Color::White => &mut self.white,
            Color::Blue => &mut self.blue,
            Color::Black => &mut self.black,
            Color::Red => &mut self.red,
            Color::Green => &mut self.green,
            Color::Colorless => &mut self.colorless,
        }
    }
}

impl fmt::Display for ManaPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total() == 0 {
            return write!(f, "empty");
        }
        let mut first = true;
        for (amount, color) in [
            (self.white, Color::White),
            (self.blue, Color::Blue),
            (self.black, Color::Black),
            (self.red, Color::Red),
            (self.green, Color::Green),
            (self.colorless, Color::Colorless),
        ] {
            if amount > 0 {
                if !first {
                    write!(f, " ")?;
                }
                write!(f, "{}{}", amount, color)?;
                first = false;
            }
        }
        Ok(())
    }
}
