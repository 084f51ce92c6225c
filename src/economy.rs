//! Economy: upgrade shop and refuelling.

use crate::types::Player;

/// Item id for the fuel-tank capacity upgrade.
pub const FUEL_UPGRADE_ITEM: &str = "fuelMax";
pub const FUEL_UPGRADE_PRICE: u32 = 150;
pub const FUEL_UPGRADE_AMOUNT: f32 = 50.0;

/// Debit the fixed price and apply the upgrade.
///
/// Insufficient funds — and unknown item ids — are a no-op, reported only
/// through the returned flag.
pub fn buy_upgrade(player: &mut Player, item: &str) -> bool {
    match item {
        FUEL_UPGRADE_ITEM if player.money >= FUEL_UPGRADE_PRICE => {
            player.money -= FUEL_UPGRADE_PRICE;
            player.max_fuel += FUEL_UPGRADE_AMOUNT;
            true
        }
        _ => false,
    }
}

/// Fill the tank.  Refuelling is free — station fuel pumps charge nothing.
pub fn refuel(player: &mut Player) {
    player.fuel = player.max_fuel;
}
