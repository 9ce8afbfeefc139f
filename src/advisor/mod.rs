//! Advisor domain — the daily field advisory, the offline chat assistant,
//! and crop recommendations for the current conditions.
//!
//! A remote assistant can answer `ChatQueryEvent` from outside the core;
//! when nothing does within the frame, the keyword fallback here replies
//! with live field numbers. Either way the reply lands in the `ChatLog`.

use bevy::prelude::*;
use crate::shared::*;

pub struct AdvisorPlugin;

impl Plugin for AdvisorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ChatLog>().add_systems(
            Update,
            (daily_advisory, handle_chat_query, handle_recommendation_request),
        );
    }
}

/// One line of the advisor conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEntry {
    Player(String),
    Advisor(String),
}

/// Conversation history, oldest first.
#[derive(Resource, Debug, Clone, Default)]
pub struct ChatLog {
    pub entries: Vec<ChatEntry>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Daily advisory
// ─────────────────────────────────────────────────────────────────────────────

/// One-line advisory for the current conditions; first matching rule wins.
pub fn daily_advice(env: &Environment) -> &'static str {
    if env.rain >= 80.0 {
        "Heavy rain today - skip watering and watch for waterlogging."
    } else if env.rain >= 55.0 {
        "Light rain expected - reduce irrigation and monitor soil moisture."
    } else if env.sun > 80.0 && env.rain < 25.0 {
        "Hot & dry today - watering recommended to prevent wilting."
    } else if env.wind >= 70.0 {
        "Strong winds today - seedlings may stress; avoid spraying and secure supports."
    } else if env.biome == Biome::Mountain && env.temperature <= 12.0 {
        "Cold mountain morning - growth slows; avoid overwatering."
    } else {
        "Stable field conditions - maintain regular watering and monitor plant health."
    }
}

fn daily_advisory(
    mut rollovers: EventReader<DayRolloverEvent>,
    env: Res<Environment>,
    mut toasts: EventWriter<ToastEvent>,
) {
    for event in rollovers.read() {
        let advice = daily_advice(&env);
        info!("[Advisor] Day {}: {}", event.day, advice);
        toasts.send(ToastEvent::new(advice));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat fallback
// ─────────────────────────────────────────────────────────────────────────────

/// Keyword-routed offline reply with live field numbers.
pub fn chat_fallback(text: &str, env: &Environment, grid: &FieldGrid) -> String {
    let t = text.to_lowercase();
    if t.contains("stats") || t.contains("health") {
        return format!(
            "Field Stats -> Avg health {:.0}. Alive {}/{}. Sun {:.0} Rain {:.0} Wind {:.0}.",
            grid.average_health(),
            grid.alive_count(),
            grid.planted_count(),
            env.sun,
            env.rain,
            env.wind
        );
    }
    if t.contains("biome") || t.contains("location") {
        return format!(
            "Current biome is {}. Matching-biome crops grow 1.5x faster. Try keywords: \
             Kathmandu/Pokhara/Ilam (Hilly), Chitwan/Lumbini/Biratnagar (Terai), \
             Mustang/Manang/Solukhumbu (Mountain).",
            env.biome.label()
        );
    }
    if t.contains("advice") || t.contains("help") || t.contains("how") {
        if env.drought_active() {
            return "Drought risk detected. Increase Rain (or Water All) and reduce Sun below 80 \
                    to prevent health loss."
                .to_string();
        }
        if env.flood_active() {
            return "Drowning risk detected. Reduce Rain below 80; add Wind to lean rain and help \
                    canopy drying."
                .to_string();
        }
        return format!(
            "Stable conditions. Keep Sun ~55-75, Rain ~35-70. In {}, matching crops get 1.5x \
             growth speed.",
            env.biome.label()
        );
    }
    "Ask for \"advice\", \"stats\", or \"biome\".".to_string()
}

fn handle_chat_query(
    mut queries: EventReader<ChatQueryEvent>,
    env: Res<Environment>,
    grid: Res<FieldGrid>,
    mut log: ResMut<ChatLog>,
    mut replies: EventWriter<ChatReplyEvent>,
) {
    for query in queries.read() {
        let text = query.text.trim();
        if text.is_empty() {
            continue;
        }
        log.entries.push(ChatEntry::Player(text.to_string()));
        let reply = chat_fallback(text, &env, &grid);
        log.entries.push(ChatEntry::Advisor(reply.clone()));
        replies.send(ChatReplyEvent { text: reply });
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Recommendations
// ─────────────────────────────────────────────────────────────────────────────

/// Suitability of one species for the current conditions. Biome match
/// dominates; temperature closeness to the crop's home climate and how
/// well its thirst matches the rain level refine the ordering.
pub fn score_crop(def: &CropDef, env: &Environment) -> f32 {
    let mut score = 0.0;
    if def.preferred_biome == env.biome {
        score += 50.0;
    }
    let home_temp = def.preferred_biome.environment_defaults().temperature;
    score += (30.0 - (env.temperature - home_temp).abs()).max(0.0);

    // Short watering intervals mean a thirsty crop; pair those with rain.
    let thirst = 1.0 - (def.profile.water_every_ticks as f32 / 420.0).clamp(0.0, 1.0);
    let rain = (env.rain / 100.0).clamp(0.0, 1.0);
    score += 20.0 * (1.0 - (thirst - rain).abs());
    score
}

/// Rank every species for the current conditions, best first. Ties keep
/// nursery order.
pub fn recommend_crops(registry: &CropRegistry, env: &Environment) -> Vec<CropScore> {
    let mut ranked: Vec<CropScore> = registry
        .order
        .iter()
        .filter_map(|species| registry.get(species))
        .map(|def| CropScore { species: def.species.clone(), score: score_crop(def, env) })
        .collect();
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    ranked
}

fn handle_recommendation_request(
    mut requests: EventReader<RecommendationRequestEvent>,
    registry: Res<CropRegistry>,
    env: Res<Environment>,
    mut out: EventWriter<RecommendationEvent>,
    mut toasts: EventWriter<ToastEvent>,
) {
    for _ in requests.read() {
        let ranked = recommend_crops(&registry, &env);
        let top: Vec<&str> = ranked.iter().take(3).map(|c| c.species.as_str()).collect();
        toasts.send(ToastEvent::new(format!(
            "Best picks for {} right now: {}.",
            env.biome.label(),
            top.join(", ")
        )));
        out.send(RecommendationEvent { ranked });
    }
}
