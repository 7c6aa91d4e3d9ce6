//! Upgrade shop
//!
//! Coins earned during the day buy permanent tweaks for the rest of the run.
//! A round never sees the shop itself, only the `Multipliers` value copied in
//! when it starts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Round-scoped gameplay multipliers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Multipliers {
    /// Brewing speed; shortens brew steps and stretches the ice spoilage window
    pub brew_speed: f32,
    /// Scales how fast patience drains
    pub patience_decay: f32,
}

impl Default for Multipliers {
    fn default() -> Self {
        Self {
            brew_speed: 1.0,
            patience_decay: 1.0,
        }
    }
}

/// Which multiplier an upgrade touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeEffect {
    BrewSpeed,
    PatienceDecay,
}

/// A purchasable upgrade
#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub cost: u32,
    pub effect: UpgradeEffect,
    pub factor: f32,
}

/// Everything the shop sells
pub const UPGRADES: &[UpgradeDef] = &[
    UpgradeDef {
        id: "enchanted_grinder",
        name: "Enchanted Grinder",
        description: "Grinds beans a little faster than physics allows.",
        cost: 15,
        effect: UpgradeEffect::BrewSpeed,
        factor: 1.2,
    },
    UpgradeDef {
        id: "calming_fern",
        name: "Calming Fern",
        description: "Soothes impatient customers from across the dimension.",
        cost: 20,
        effect: UpgradeEffect::PatienceDecay,
        factor: 0.85,
    },
];

/// Why a purchase was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("no upgrade called `{0}`")]
    Unknown(String),
    #[error("`{0}` is already installed")]
    AlreadyOwned(String),
    #[error("costs {cost} coins, you have {coins}")]
    InsufficientCoins { cost: u32, coins: u32 },
}

/// Source of the multipliers for the next round
pub trait UpgradeStore {
    fn multipliers(&self) -> Multipliers;
}

/// Owned upgrades for the current run
#[derive(Debug, Clone, Default)]
pub struct UpgradeShop {
    owned: Vec<&'static str>,
}

impl UpgradeShop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog(&self) -> &'static [UpgradeDef] {
        UPGRADES
    }

    pub fn owned(&self) -> &[&'static str] {
        &self.owned
    }

    pub fn owns(&self, id: &str) -> bool {
        self.owned.contains(&id)
    }

    /// Buy an upgrade with `coins`; returns the balance left over
    pub fn purchase(&mut self, id: &str, coins: u32) -> Result<u32, PurchaseError> {
        let def = UPGRADES
            .iter()
            .find(|u| u.id == id)
            .ok_or_else(|| PurchaseError::Unknown(id.to_string()))?;
        if self.owns(def.id) {
            return Err(PurchaseError::AlreadyOwned(id.to_string()));
        }
        if coins < def.cost {
            return Err(PurchaseError::InsufficientCoins {
                cost: def.cost,
                coins,
            });
        }
        self.owned.push(def.id);
        log::info!("Purchased {} for {} coins", def.name, def.cost);
        Ok(coins - def.cost)
    }

    /// Forget everything (new game)
    pub fn reset(&mut self) {
        self.owned.clear();
    }
}

impl UpgradeStore for UpgradeShop {
    fn multipliers(&self) -> Multipliers {
        let mut m = Multipliers::default();
        for def in UPGRADES.iter().filter(|u| self.owns(u.id)) {
            match def.effect {
                UpgradeEffect::BrewSpeed => m.brew_speed *= def.factor,
                UpgradeEffect::PatienceDecay => m.patience_decay *= def.factor,
            }
        }
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purchase_applies_multiplier() {
        let mut shop = UpgradeShop::new();
        assert_eq!(shop.multipliers(), Multipliers::default());

        assert_eq!(shop.purchase("enchanted_grinder", 20), Ok(5));
        let m = shop.multipliers();
        assert!((m.brew_speed - 1.2).abs() < 1e-6);
        assert_eq!(m.patience_decay, 1.0);
    }

    #[test]
    fn test_purchase_errors() {
        let mut shop = UpgradeShop::new();
        assert_eq!(
            shop.purchase("espresso_robot", 100),
            Err(PurchaseError::Unknown("espresso_robot".to_string()))
        );
        assert_eq!(
            shop.purchase("calming_fern", 19),
            Err(PurchaseError::InsufficientCoins { cost: 20, coins: 19 })
        );
        assert!(!shop.owns("calming_fern"));

        assert_eq!(shop.purchase("calming_fern", 20), Ok(0));
        assert_eq!(
            shop.purchase("calming_fern", 50),
            Err(PurchaseError::AlreadyOwned("calming_fern".to_string()))
        );
    }

    #[test]
    fn test_reset_forgets_upgrades() {
        let mut shop = UpgradeShop::new();
        shop.purchase("calming_fern", 30).unwrap();
        assert!((shop.multipliers().patience_decay - 0.85).abs() < 1e-6);
        shop.reset();
        assert_eq!(shop.multipliers(), Multipliers::default());
    }
}
