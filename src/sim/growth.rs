//! Per-plant growth and health update — the heart of the tick.
//!
//! `advance_plant` is a pure value transition: it never mutates its input
//! and is deterministic given the same inputs, which is what makes the
//! snapshot-and-resume property hold.

use crate::shared::*;

/// Environment and settings sampled once per tick and shared by every
/// plant update in that tick.
#[derive(Debug, Clone, Copy)]
pub struct GrowthCtx {
    pub drought: bool,
    pub flood: bool,
    pub biome: Biome,
    pub temperature: f32,
    pub speed: SpeedPreset,
}

impl GrowthCtx {
    pub fn sample(env: &Environment, speed: SpeedPreset) -> Self {
        Self {
            drought: env.drought_active(),
            flood: env.flood_active(),
            biome: env.biome,
            temperature: env.temperature,
            speed,
        }
    }
}

/// Advance one live plant by one tick.
///
/// Dead plants are returned unchanged; the caller detects a fresh death by
/// comparing `death_charged` before and after.
pub fn advance_plant(plant: &Plant, profile: &CropProfile, ctx: &GrowthCtx) -> Plant {
    if plant.is_dead {
        return plant.clone();
    }

    let mut next = plant.clone();

    // A pending care demand slows growth and bleeds health. This damage is
    // additive with the environmental delta below.
    let neglected = plant.required_action.is_some();
    let care_neglect_penalty = if neglected { 0.3 } else { 1.0 };
    let care_health_damage = if neglected { 0.5 } else { 0.0 };

    let mut rate = ctx.speed.growth_multiplier() * care_neglect_penalty;
    if plant.preferred_biome == ctx.biome {
        rate *= 1.5;
    }
    if ctx.temperature <= 8.0 {
        rate *= 0.6;
    }

    // Low-health plants still grow, just slower.
    let health_factor = 0.5 + (plant.health / 100.0) * 0.5;

    let delta_days = 1.0 / DAY_TICKS as f32;
    next.growth_days =
        (plant.growth_days + delta_days * rate * health_factor).clamp(0.0, profile.days_to_mature);
    next.growth_progress = (next.growth_days / profile.days_to_mature * 100.0).clamp(0.0, 100.0);
    next.growth_stage = stage_from_progress(next.growth_progress);

    // Health delta: neglect damage plus exactly one environmental term.
    // Drought is checked before flood; they never both apply.
    let mut health = plant.health - care_health_damage;
    if ctx.drought {
        health -= 0.45;
    } else if ctx.flood {
        health -= 0.35;
    } else {
        health += 0.12;
    }
    next.health = health.clamp(0.0, 100.0);

    if next.health <= 0.0 {
        next.is_dead = true;
        next.health = 0.0;
        if !next.death_charged {
            next.death_charged = true;
        }
    }

    next
}
