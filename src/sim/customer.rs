//! Customer queue simulation
//!
//! Customers wait in arrival order. Patience drains every tick; a customer who
//! runs out walks away and is removed without disturbing anyone else's place.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::quirks::{self, QuirkState};
use crate::content::{CustomerArchetype, QuirkKind, RecipeDefinition};
use crate::error::{GameError, Missing};

/// Runtime id of a customer, unique within a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CustomerId(pub u32);

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Customer lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerStatus {
    Waiting,
    Served,
    Abandoned,
}

/// A customer in the shop
#[derive(Debug, Clone)]
pub struct CustomerInstance {
    pub id: CustomerId,
    pub archetype: Arc<CustomerArchetype>,
    pub order: Arc<RecipeDefinition>,
    /// Seconds of patience left
    pub patience: f32,
    pub max_patience: f32,
    pub status: CustomerStatus,
    pub quirk_state: QuirkState,
    /// Index into the archetype's dialogue lines
    pub line: usize,
}

impl CustomerInstance {
    pub fn quirk(&self) -> QuirkKind {
        self.archetype.quirk
    }

    /// Remaining patience in `[0, 1]`
    pub fn patience_fraction(&self) -> f32 {
        if self.max_patience <= 0.0 {
            return 0.0;
        }
        (self.patience / self.max_patience).clamp(0.0, 1.0)
    }

    pub fn is_visible(&self) -> bool {
        quirks::is_visible(self.quirk(), &self.quirk_state)
    }

    pub fn is_selectable(&self) -> bool {
        self.status == CustomerStatus::Waiting
            && quirks::is_selectable(self.quirk(), &self.quirk_state)
    }

    pub fn greeting(&self) -> Option<&str> {
        self.archetype.dialogue.get(self.line).map(String::as_str)
    }

    /// Tip for a perfect drink served now
    pub fn tip(&self) -> u32 {
        let range = self.archetype.tip;
        let bonus = (range.max - range.min) as f32 * self.patience_fraction();
        (range.min + bonus.round() as u32).max(1)
    }
}

/// Ordered customer queue with a fixed capacity
#[derive(Debug, Clone)]
pub struct CustomerQueue {
    customers: Vec<CustomerInstance>,
    capacity: usize,
    next_id: u32,
    lost: u32,
}

impl CustomerQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            customers: Vec::with_capacity(capacity),
            capacity,
            next_id: 1,
            lost: 0,
        }
    }

    /// Seat a new customer at the back of the queue; no-op when full
    pub fn spawn(
        &mut self,
        archetype: Arc<CustomerArchetype>,
        order: Arc<RecipeDefinition>,
        line: usize,
    ) -> Option<CustomerId> {
        if self.is_full() {
            log::debug!("Queue full, {} turned away at the door", archetype.name);
            return None;
        }

        let id = CustomerId(self.next_id);
        self.next_id += 1;

        let patience = archetype.patience;
        log::debug!(
            "Customer {} ({}) arrives wanting {}",
            id,
            archetype.name,
            order.name
        );
        self.customers.push(CustomerInstance {
            id,
            archetype,
            order,
            patience,
            max_patience: patience,
            status: CustomerStatus::Waiting,
            quirk_state: QuirkState::default(),
            line,
        });
        Some(id)
    }

    /// Drain patience and remove anyone who gave up. Returns them in queue order.
    pub fn tick(&mut self, dt: f32, patience_decay: f32) -> Vec<CustomerInstance> {
        let decay = dt * patience_decay.max(0.0);
        for customer in &mut self.customers {
            if customer.status != CustomerStatus::Waiting {
                continue;
            }
            let quirk = customer.quirk();
            if quirks::decays_patience(quirk, &customer.quirk_state) {
                customer.patience -= decay;
            }
            quirks::tick(quirk, &mut customer.quirk_state, dt);
            if customer.patience <= 0.0 {
                customer.patience = 0.0;
                customer.status = CustomerStatus::Abandoned;
            }
        }

        let mut abandoned = Vec::new();
        let mut kept = Vec::with_capacity(self.customers.len());
        for customer in self.customers.drain(..) {
            if customer.status == CustomerStatus::Abandoned {
                log::debug!("Customer {} ({}) gave up", customer.id, customer.archetype.name);
                abandoned.push(customer);
            } else {
                kept.push(customer);
            }
        }
        self.customers = kept;
        self.lost += abandoned.len() as u32;
        abandoned
    }

    /// Target a customer for brewing
    pub fn select(&self, id: CustomerId) -> Result<&CustomerInstance, GameError> {
        let customer = self
            .get(id)
            .ok_or(GameError::NotFound(Missing::Customer(id)))?;
        if !customer.is_selectable() {
            return Err(GameError::NotSelectable(id));
        }
        Ok(customer)
    }

    /// Remove a served customer
    pub fn serve(&mut self, id: CustomerId) -> Option<CustomerInstance> {
        let pos = self.customers.iter().position(|c| c.id == id)?;
        let mut customer = self.customers.remove(pos);
        customer.status = CustomerStatus::Served;
        Some(customer)
    }

    /// Ring the service bell; returns how many customers were revealed
    pub fn ring_bell(&mut self, reveal_secs: f32) -> usize {
        let mut revealed = 0;
        for customer in &mut self.customers {
            let quirk = customer.quirk();
            if quirks::on_bell(quirk, &mut customer.quirk_state, reveal_secs) {
                revealed += 1;
            }
        }
        revealed
    }

    /// A fire elemental is waiting and heating the shop
    pub fn heat_active(&self) -> bool {
        self.customers
            .iter()
            .any(|c| c.status == CustomerStatus::Waiting && quirks::emits_heat(c.quirk()))
    }

    pub fn get(&self, id: CustomerId) -> Option<&CustomerInstance> {
        self.customers.iter().find(|c| c.id == id)
    }

    /// Customers in arrival order
    pub fn customers(&self) -> &[CustomerInstance] {
        &self.customers
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.customers.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Customers who walked out so far
    pub fn lost(&self) -> u32 {
        self.lost
    }
}
