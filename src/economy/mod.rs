//! Economy domain — the coin wallet and its event-driven mutations.
//!
//! Handlers that must validate before acting (planting, priced care
//! sweeps) call `Wallet::try_spend` synchronously; everything else sends
//! `CoinChangeEvent` and gets clamped application here.

use bevy::prelude::*;
use crate::shared::*;

pub struct EconomyPlugin;

impl Plugin for EconomyPlugin {
    fn build(&self, app: &mut App) {
        // Coin change events can arrive from any domain in any state.
        app.add_systems(Update, apply_coin_changes);
    }
}

/// Applies CoinChangeEvents to the wallet.
/// Spends that exceed the balance clamp to 0 with a warning; validated
/// spends never reach this path.
pub fn apply_coin_changes(
    mut events: EventReader<CoinChangeEvent>,
    mut wallet: ResMut<Wallet>,
    mut totals: ResMut<EconomyTotals>,
) {
    for ev in events.read() {
        if ev.amount >= 0 {
            let gain = ev.amount as u32;
            wallet.credit(gain);
            totals.earned = totals.earned.saturating_add(gain as u64);
            info!("[Economy] +{} coins: {}. Balance: {}", gain, ev.reason, wallet.coins);
        } else {
            let cost = (-ev.amount) as u32;
            if wallet.coins >= cost {
                wallet.coins -= cost;
                totals.spent = totals.spent.saturating_add(cost as u64);
                info!("[Economy] -{} coins: {}. Balance: {}", cost, ev.reason, wallet.coins);
            } else {
                warn!(
                    "[Economy] Charge of {} exceeds balance {} ({}). Clamping to 0.",
                    cost, wallet.coins, ev.reason
                );
                totals.spent = totals.spent.saturating_add(wallet.coins as u64);
                wallet.coins = 0;
            }
        }
    }
}

/// Format a coin amount for display (e.g. "1,234").
#[allow(dead_code)]
pub fn format_coins(amount: u32) -> String {
    let s = amount.to_string();
    let mut result = String::new();
    let digits: Vec<char> = s.chars().collect();
    for (i, ch) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*ch);
    }
    result
}
