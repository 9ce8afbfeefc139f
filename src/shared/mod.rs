//! Shared components, resources, events, and states for Khetbari.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain directly.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ═══════════════════════════════════════════════════════════════════════
// SIM STATE — top-level state machine
// ═══════════════════════════════════════════════════════════════════════

/// The simulation clock state. `Stopped` covers both "not yet started" and
/// "paused"; all per-tick systems gate on `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum SimState {
    #[default]
    Stopped,
    Running,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

/// Number of cells in the field (4×4).
pub const GRID_CELLS: usize = 16;
/// Columns in the field grid.
pub const GRID_COLS: usize = 4;
/// Ticks per in-game day. Time-of-day counts 0..=100, so a day is 101 ticks.
pub const DAY_TICKS: u64 = 101;
/// Coin cost to plant one seed.
pub const SEED_COST: u32 = 2;
/// Coin reward per harvested crop.
pub const HARVEST_REWARD: u32 = 5;
/// Coin penalty per crop death.
pub const DEATH_PENALTY: u32 = 5;
/// Wall-clock seconds the player has to answer a care request.
pub const CARE_WINDOW_SECS: f32 = 20.0;
/// Growth progress below this is Seed.
pub const SPROUT_THRESHOLD: f32 = 35.0;
/// Growth progress below this is Sprout; at or above, Mature.
pub const MATURE_THRESHOLD: f32 = 75.0;
/// Insecticide requests only fire once growth progress reaches this.
pub const INSECTICIDE_GATE: f32 = 35.0;
/// Pesticide requests only fire once growth progress reaches this.
pub const PESTICIDE_GATE: f32 = 65.0;

// ═══════════════════════════════════════════════════════════════════════
// BIOME & ENVIRONMENT
// ═══════════════════════════════════════════════════════════════════════

/// Climate/terrain class. Crops grown in their preferred biome get a
/// growth-speed bonus; each biome has its own default environment values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Biome {
    Terai,
    #[default]
    Hilly,
    Mountain,
}

impl Biome {
    pub fn label(self) -> &'static str {
        match self {
            Biome::Terai => "Terai",
            Biome::Hilly => "Hilly",
            Biome::Mountain => "Mountain",
        }
    }

    /// Default environment values when the player's location lands in
    /// this biome.
    pub fn environment_defaults(self) -> EnvDefaults {
        match self {
            Biome::Terai => EnvDefaults { temperature: 32.0, sun: 78.0, rain: 58.0, wind: 28.0 },
            Biome::Hilly => EnvDefaults { temperature: 22.0, sun: 64.0, rain: 48.0, wind: 34.0 },
            Biome::Mountain => EnvDefaults { temperature: 9.0, sun: 56.0, rain: 34.0, wind: 42.0 },
        }
    }
}

/// Per-biome starting values for the environment axes.
#[derive(Debug, Clone, Copy)]
pub struct EnvDefaults {
    pub temperature: f32,
    pub sun: f32,
    pub rain: f32,
    pub wind: f32,
}

/// Which environment axes the player has pinned with a manual slider.
/// A pinned axis is never overwritten by weather sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualOverrides {
    pub sun: bool,
    pub rain: bool,
    pub wind: bool,
}

/// Current simulated environment. sun/rain/wind are 0–100; temperature is
/// in °C and effectively unbounded.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub sun: f32,
    pub rain: f32,
    pub wind: f32,
    pub temperature: f32,
    pub biome: Biome,
    pub is_night: bool,
    /// Humidity % reported by the last weather sync, if any.
    pub humidity: Option<f32>,
    /// Set when the weather condition text mentioned rain. Used for the
    /// humidity derivation and cosmetics, not for the hazard checks.
    pub rain_hint: bool,
    pub manual: ManualOverrides,
}

impl Default for Environment {
    fn default() -> Self {
        let d = Biome::Hilly.environment_defaults();
        Self {
            sun: d.sun,
            rain: d.rain,
            wind: d.wind,
            temperature: d.temperature,
            biome: Biome::Hilly,
            is_night: false,
            humidity: None,
            rain_hint: false,
            manual: ManualOverrides::default(),
        }
    }
}

impl Environment {
    /// Drought hazard: very sunny and very dry.
    pub fn drought_active(&self) -> bool {
        self.sun > 80.0 && self.rain < 20.0
    }

    /// Flood (waterlogging) hazard: very rainy.
    pub fn flood_active(&self) -> bool {
        self.rain > 80.0
    }

    /// Humidity %, from the last weather report when available, otherwise
    /// derived from rain (moderate rain reads as humid air).
    pub fn humidity_pct(&self) -> f32 {
        match self.humidity {
            Some(h) => h.clamp(0.0, 100.0),
            None => {
                let boost = if self.rain >= 55.0 { 18.0 } else { 0.0 };
                (self.rain + boost).clamp(0.0, 100.0)
            }
        }
    }

    /// Humid enough to shorten insecticide/pesticide cadences.
    pub fn is_humid(&self) -> bool {
        self.humidity_pct() >= 70.0
    }

    /// Apply per-biome defaults and clear all manual overrides.
    pub fn reset_for_biome(&mut self, biome: Biome) {
        let d = biome.environment_defaults();
        self.biome = biome;
        self.temperature = d.temperature;
        self.sun = d.sun;
        self.rain = d.rain;
        self.wind = d.wind;
        self.manual = ManualOverrides::default();
    }
}

/// One of the player-adjustable environment axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvAxis {
    Sun,
    Rain,
    Wind,
    Temperature,
}

// ═══════════════════════════════════════════════════════════════════════
// CROPS
// ═══════════════════════════════════════════════════════════════════════

/// Growth stage, derived from growth progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrowthStage {
    Seed,
    Sprout,
    Mature,
}

/// Map growth progress (0–100) onto a stage.
pub fn stage_from_progress(progress: f32) -> GrowthStage {
    if progress < SPROUT_THRESHOLD {
        GrowthStage::Seed
    } else if progress < MATURE_THRESHOLD {
        GrowthStage::Sprout
    } else {
        GrowthStage::Mature
    }
}

/// A player-applied remedy with its own cadence per species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CareAction {
    Water,
    Insecticide,
    Pesticide,
}

impl CareAction {
    pub fn label(self) -> &'static str {
        match self {
            CareAction::Water => "Water",
            CareAction::Insecticide => "Insecticide",
            CareAction::Pesticide => "Pesticide",
        }
    }
}

/// Static per-species care/growth cadence constants.
///
/// `water_every_ticks` is a raw tick interval; the insecticide/pesticide
/// cadences are in in-game days and get multiplied by `DAY_TICKS`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CropProfile {
    pub days_to_mature: f32,
    pub water_every_ticks: u64,
    pub water_every_drought_ticks: u64,
    pub insecticide_every_days: u64,
    pub pesticide_every_days: u64,
}

/// Fallback profile for species missing from the registry.
pub fn default_crop_profile() -> CropProfile {
    CropProfile {
        days_to_mature: 100.0,
        water_every_ticks: 180,
        water_every_drought_ticks: 120,
        insecticide_every_days: 21,
        pesticide_every_days: 28,
    }
}

/// Everything the nursery knows about a species.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropDef {
    pub species: String,
    pub emoji: String,
    pub preferred_biome: Biome,
    pub profile: CropProfile,
}

/// Static lookup of all plantable species.
#[derive(Resource, Debug, Clone)]
pub struct CropRegistry {
    pub crops: HashMap<String, CropDef>,
    /// Nursery display order.
    pub order: Vec<String>,
}

impl Default for CropRegistry {
    fn default() -> Self {
        let defs = [
            ("Rice", "🌾", Biome::Terai, 120.0, 50, 35, 14, 21),
            ("Mustard", "🌼", Biome::Terai, 95.0, 220, 140, 21, 28),
            ("Maize", "🌽", Biome::Hilly, 110.0, 160, 110, 21, 28),
            ("Tea", "🍵", Biome::Hilly, 200.0, 140, 90, 21, 28),
            ("Millet", "🌿", Biome::Mountain, 90.0, 260, 160, 21, 28),
            ("Potato", "🥔", Biome::Mountain, 95.0, 140, 90, 14, 21),
            ("Apple", "🍎", Biome::Mountain, 180.0, 420, 260, 28, 35),
        ];

        let mut crops = HashMap::new();
        let mut order = Vec::new();
        for (species, emoji, biome, mature, water, drought, insect, pest) in defs {
            order.push(species.to_string());
            crops.insert(
                species.to_string(),
                CropDef {
                    species: species.to_string(),
                    emoji: emoji.to_string(),
                    preferred_biome: biome,
                    profile: CropProfile {
                        days_to_mature: mature,
                        water_every_ticks: water,
                        water_every_drought_ticks: drought,
                        insecticide_every_days: insect,
                        pesticide_every_days: pest,
                    },
                },
            );
        }
        Self { crops, order }
    }
}

impl CropRegistry {
    pub fn get(&self, species: &str) -> Option<&CropDef> {
        self.crops.get(species)
    }

    /// Profile for a species, falling back to the default for unknowns.
    pub fn profile_for(&self, species: &str) -> CropProfile {
        self.crops
            .get(species)
            .map(|d| d.profile)
            .unwrap_or_else(default_crop_profile)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLANTS & FIELD
// ═══════════════════════════════════════════════════════════════════════

/// Tick at which each care type was last satisfied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CareLog {
    pub water: u64,
    pub insecticide: u64,
    pub pesticide: u64,
}

impl CareLog {
    pub fn all_at(tick: u64) -> Self {
        Self { water: tick, insecticide: tick, pesticide: tick }
    }

    pub fn get(&self, action: CareAction) -> u64 {
        match action {
            CareAction::Water => self.water,
            CareAction::Insecticide => self.insecticide,
            CareAction::Pesticide => self.pesticide,
        }
    }

    pub fn stamp(&mut self, action: CareAction, tick: u64) {
        match action {
            CareAction::Water => self.water = tick,
            CareAction::Insecticide => self.insecticide = tick,
            CareAction::Pesticide => self.pesticide = tick,
        }
    }
}

/// One planted crop in a field cell.
///
/// Transitions go through value-returning functions (`sim::growth`, the
/// care handlers) so every state change is a total function of
/// (plant, inputs); systems only swap the cell contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    pub id: u64,
    pub species: String,
    pub preferred_biome: Biome,
    pub emoji: String,
    /// Accumulated growth in in-game days, clamped to [0, days_to_mature].
    pub growth_days: f32,
    /// Derived: growth_days / days_to_mature × 100.
    pub growth_progress: f32,
    pub growth_stage: GrowthStage,
    /// 0–100. Reaching 0 kills the plant, one-way.
    pub health: f32,
    pub is_dead: bool,
    /// Guards the one-time death penalty charge.
    pub death_charged: bool,
    /// Outstanding care demand, if any.
    pub required_action: Option<CareAction>,
    pub last_care: CareLog,
    /// Consecutive miscalibrated care responses. Two strikes kill.
    pub stress_strikes: u8,
}

impl Plant {
    /// A freshly planted seed. Biome-matched plants start healthier.
    pub fn new(def: &CropDef, field_biome: Biome, tick: u64) -> Self {
        let health = if def.preferred_biome == field_biome { 82.0 } else { 74.0 };
        Self {
            id: rand::random(),
            species: def.species.clone(),
            preferred_biome: def.preferred_biome,
            emoji: def.emoji.clone(),
            growth_days: 0.0,
            growth_progress: 0.0,
            growth_stage: GrowthStage::Seed,
            health,
            is_dead: false,
            death_charged: false,
            required_action: None,
            last_care: CareLog::all_at(tick),
            stress_strikes: 0,
        }
    }

    pub fn is_mature(&self) -> bool {
        self.growth_stage == GrowthStage::Mature
    }
}

/// The 4×4 field. Cells are index-addressed, row-major.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldGrid {
    pub cells: Vec<Option<Plant>>,
}

impl Default for FieldGrid {
    fn default() -> Self {
        Self { cells: vec![None; GRID_CELLS] }
    }
}

impl FieldGrid {
    pub fn planted_count(&self) -> usize {
        self.cells.iter().flatten().count()
    }

    pub fn alive_count(&self) -> usize {
        self.cells.iter().flatten().filter(|p| !p.is_dead).count()
    }

    pub fn average_health(&self) -> f32 {
        let plants: Vec<_> = self.cells.iter().flatten().collect();
        if plants.is_empty() {
            return 0.0;
        }
        plants.iter().map(|p| p.health).sum::<f32>() / plants.len() as f32
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CLOCK & SPEED
// ═══════════════════════════════════════════════════════════════════════

/// Simulation speed presets. Faster presets both tick more often and grow
/// more per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpeedPreset {
    Slow,
    #[default]
    Medium,
    Fast,
}

impl SpeedPreset {
    pub fn label(self) -> &'static str {
        match self {
            SpeedPreset::Slow => "Slow",
            SpeedPreset::Medium => "Medium",
            SpeedPreset::Fast => "Fast",
        }
    }

    /// Real-time interval between ticks.
    pub fn tick_secs(self) -> f32 {
        match self {
            SpeedPreset::Slow => 0.4,
            SpeedPreset::Medium => 0.2,
            SpeedPreset::Fast => 0.1,
        }
    }

    /// Growth-rate multiplier applied in the per-plant update.
    pub fn growth_multiplier(self) -> f32 {
        match self {
            SpeedPreset::Slow => 2.0,
            SpeedPreset::Medium => 5.0,
            SpeedPreset::Fast => 10.0,
        }
    }
}

/// Simulated time: day counter plus a 0..=100 time-of-day counter.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimClock {
    pub day: u64,
    /// Time of day, 0..=100. Rolls the day over past 100.
    pub tod: u64,
    pub speed: SpeedPreset,
    /// Real-seconds accumulator for the tick driver.
    pub elapsed: f32,
    /// One-shot guard so the all-mature auto-stop fires once per maturity
    /// event. Reset by planting.
    pub mature_notified: bool,
}

impl Default for SimClock {
    fn default() -> Self {
        Self { day: 1, tod: 20, speed: SpeedPreset::Medium, elapsed: 0.0, mature_notified: false }
    }
}

impl SimClock {
    /// Monotonic tick index across days, used for care cadence arithmetic.
    pub fn global_tick(&self) -> u64 {
        self.day * DAY_TICKS + self.tod
    }

    /// Time of day as fractional hours (0..24).
    pub fn hour_float(&self) -> f32 {
        (self.tod.min(100) as f32 / 100.0) * 24.0
    }

    /// Wall-clock style display, e.g. "2:24 PM".
    pub fn clock_text(&self) -> String {
        let mins = ((self.tod.min(100) as f32 / 100.0) * 24.0 * 60.0).round() as u32;
        let hh24 = (mins / 60) % 24;
        let mm = mins % 60;
        let ampm = if hh24 >= 12 { "PM" } else { "AM" };
        let hh12 = ((hh24 + 11) % 12) + 1;
        format!("{}:{:02} {}", hh12, mm, ampm)
    }

    /// 0 at full day, 1 at full night, with smooth dawn/dusk ramps.
    pub fn night_blend(&self) -> f32 {
        let h = self.hour_float();
        let dawn = 1.0 - smoothstep(5.5, 6.5, h);
        let dusk = smoothstep(17.5, 18.5, h);
        dawn.max(dusk)
    }

    pub fn is_night(&self) -> bool {
        self.night_blend() >= 0.6
    }
}

fn smoothstep(a: f32, b: f32, x: f32) -> f32 {
    let t = ((x - a) / (b - a)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

// ═══════════════════════════════════════════════════════════════════════
// CARE REQUEST
// ═══════════════════════════════════════════════════════════════════════

/// The single outstanding, time-boxed care demand.
#[derive(Debug, Clone, PartialEq)]
pub struct CareTicket {
    pub plant_index: usize,
    pub action: CareAction,
    /// Wall-clock seconds left to respond. Counts down even while the
    /// simulation clock is stopped.
    pub remaining_secs: f32,
    /// Whether the clock should resume when this ticket resolves
    /// (pausing policy only).
    pub resume_running: bool,
}

/// Process-wide care request slot; at most one ticket exists at a time.
#[derive(Resource, Debug, Clone, Default)]
pub struct ActiveCare(pub Option<CareTicket>);

/// Player's current position on the care intensity slider (0–100),
/// None until touched.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct CareSlider(pub Option<f32>);

// ═══════════════════════════════════════════════════════════════════════
// POLICY & LOCATION
// ═══════════════════════════════════════════════════════════════════════

/// Policy knobs where the two source designs disagreed. Defaults pick the
/// penalty variant with free bulk care.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SimConfig {
    /// When true, raising a care request stops the clock and resolution or
    /// expiry restarts it. When false the clock keeps running and neglected
    /// plants take the growth/health penalty instead.
    pub pause_during_care: bool,
    /// Coins charged per affected cell on bulk care actions. 0 = free.
    pub care_cost_per_cell: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { pause_during_care: false, care_cost_per_cell: 0 }
    }
}

/// The player's location input and its resolved form.
#[derive(Resource, Debug, Clone)]
pub struct Location {
    pub query: String,
    pub resolved_label: String,
    pub coords: Option<(f64, f64)>,
    /// Sequence number of the most recent geocode request. Results carrying
    /// an older number are stale and dropped (last-request-wins).
    pub request_seq: u32,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            query: "Kathmandu".to_string(),
            resolved_label: "Kathmandu".to_string(),
            coords: None,
            request_seq: 0,
        }
    }
}

/// Latest weather snapshot and the in-flight request sequence.
#[derive(Resource, Debug, Clone, Default)]
pub struct WeatherStation {
    pub latest: Option<WeatherSnapshot>,
    pub request_seq: u32,
}

/// What the external weather feed reports for a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temp_c: f32,
    pub wind_kph: f32,
    pub precip_mm: f32,
    pub humidity: f32,
    /// Cloud cover %, when the feed reports it.
    pub cloud: Option<f32>,
    /// UV index; stands in for cloud cover in the daytime sun mapping
    /// when the feed omits clouds.
    pub uv: Option<f32>,
    pub is_day: bool,
    pub condition_text: String,
    /// Local time at the station, "YYYY-MM-DD HH:MM" or bare "HH:MM".
    pub localtime: String,
}

// ═══════════════════════════════════════════════════════════════════════
// ECONOMY
// ═══════════════════════════════════════════════════════════════════════

/// Coin balance. Never negative. Synchronous, validated spends go through
/// `try_spend` so a handler can reject an action before mutating anything
/// else; fire-and-forget charges (death penalties) go through
/// `CoinChangeEvent` and clamp at zero.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub coins: u32,
}

impl Default for Wallet {
    fn default() -> Self {
        Self { coins: 1000 }
    }
}

impl Wallet {
    /// Deduct if affordable; false leaves the balance untouched.
    #[must_use]
    pub fn try_spend(&mut self, amount: u32) -> bool {
        if self.coins >= amount {
            self.coins -= amount;
            true
        } else {
            false
        }
    }

    pub fn credit(&mut self, amount: u32) {
        self.coins = self.coins.saturating_add(amount);
    }
}

/// Lifetime counters for the stats panel.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyTotals {
    pub earned: u64,
    pub spent: u64,
    pub harvested: u32,
    pub deaths: u32,
}

// ═══════════════════════════════════════════════════════════════════════
// SELECTION (input surface state)
// ═══════════════════════════════════════════════════════════════════════

/// Grid cursor for keyboard-driven cell targeting.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SelectedCell(pub usize);

/// Species currently picked in the nursery, if any.
#[derive(Resource, Debug, Clone, Default)]
pub struct SelectedCrop(pub Option<String>);

// ═══════════════════════════════════════════════════════════════════════
// EVENTS — cross-domain communication
// ═══════════════════════════════════════════════════════════════════════

/// Transient user-facing notice.
#[derive(Event, Debug, Clone)]
pub struct ToastEvent {
    pub message: String,
    pub duration_secs: f32,
}

impl ToastEvent {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), duration_secs: 3.0 }
    }
}

/// Asynchronous coin mutation (positive = gain, negative = spend).
/// Synchronous, validated spends go through `Wallet::try_spend` instead.
#[derive(Event, Debug, Clone)]
pub struct CoinChangeEvent {
    pub amount: i64,
    pub reason: String,
}

/// A new in-game day began.
#[derive(Event, Debug, Clone)]
pub struct DayRolloverEvent {
    pub day: u64,
}

/// Player command: plant a species into a cell.
#[derive(Event, Debug, Clone)]
pub struct PlantSeedEvent {
    pub cell: usize,
    pub species: String,
}

/// Target set for a bulk action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionScope {
    All,
    Cells(Vec<usize>),
}

impl ActionScope {
    pub fn contains(&self, cell: usize) -> bool {
        match self {
            ActionScope::All => true,
            ActionScope::Cells(cells) => cells.contains(&cell),
        }
    }
}

/// Player command: apply a care action across a scope.
#[derive(Event, Debug, Clone)]
pub struct BulkCareEvent {
    pub action: CareAction,
    pub scope: ActionScope,
}

/// Player command: harvest mature crops in a scope.
#[derive(Event, Debug, Clone)]
pub struct HarvestEvent {
    pub scope: ActionScope,
}

/// Player command: clear dead plants from the field.
#[derive(Event, Debug, Clone)]
pub struct ClearDeadEvent;

/// Player's answer to the active care request: slider intensity 0–100.
#[derive(Event, Debug, Clone)]
pub struct CareResponseEvent {
    pub intensity: f32,
}

/// Player command: toggle the simulation between Stopped and Running.
#[derive(Event, Debug, Clone)]
pub struct ToggleSimEvent;

/// Player command: pick a speed preset (applies from the next tick).
#[derive(Event, Debug, Clone)]
pub struct SetSpeedEvent(pub SpeedPreset);

/// Player command: set one environment axis by hand.
#[derive(Event, Debug, Clone)]
pub struct SetEnvAxisEvent {
    pub axis: EnvAxis,
    pub value: f32,
}

/// Player submitted a new free-text location.
#[derive(Event, Debug, Clone)]
pub struct LocationSubmitEvent {
    pub query: String,
}

/// Result from the external geocoder. `seq` ties it to the request that
/// produced it; stale results are dropped.
#[derive(Event, Debug, Clone)]
pub struct GeocodeResultEvent {
    pub seq: u32,
    pub lat: f64,
    pub lon: f64,
    pub label: String,
}

/// Snapshot arriving from the external weather feed.
#[derive(Event, Debug, Clone)]
pub struct WeatherSnapshotEvent {
    pub seq: u32,
    pub snapshot: WeatherSnapshot,
}

/// Player command: capture the session to a snapshot.
#[derive(Event, Debug, Clone)]
pub struct SaveSnapshotEvent;

/// Player command: restore the last captured snapshot.
#[derive(Event, Debug, Clone)]
pub struct LoadSnapshotEvent;

/// Most recent serialized session, if any.
#[derive(Resource, Debug, Clone, Default)]
pub struct SavedSession(pub Option<String>);

/// Player asked the advisor a question.
#[derive(Event, Debug, Clone)]
pub struct ChatQueryEvent {
    pub text: String,
}

/// Advisor (remote or offline fallback) replied.
#[derive(Event, Debug, Clone)]
pub struct ChatReplyEvent {
    pub text: String,
}

/// Player asked for crop recommendations for current conditions.
#[derive(Event, Debug, Clone)]
pub struct RecommendationRequestEvent;

/// Ranked species suggestions.
#[derive(Event, Debug, Clone)]
pub struct RecommendationEvent {
    pub ranked: Vec<CropScore>,
}

/// One recommendation entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CropScore {
    pub species: String,
    pub score: f32,
}

// ═══════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_thresholds() {
        assert_eq!(stage_from_progress(0.0), GrowthStage::Seed);
        assert_eq!(stage_from_progress(34.9), GrowthStage::Seed);
        assert_eq!(stage_from_progress(35.0), GrowthStage::Sprout);
        assert_eq!(stage_from_progress(74.9), GrowthStage::Sprout);
        assert_eq!(stage_from_progress(75.0), GrowthStage::Mature);
        assert_eq!(stage_from_progress(100.0), GrowthStage::Mature);
    }

    #[test]
    fn registry_has_all_seven_species() {
        let reg = CropRegistry::default();
        for species in ["Rice", "Mustard", "Maize", "Tea", "Millet", "Potato", "Apple"] {
            assert!(reg.get(species).is_some(), "{species} missing from registry");
        }
        assert_eq!(reg.order.len(), 7);
    }

    #[test]
    fn unknown_species_falls_back_to_default_profile() {
        let reg = CropRegistry::default();
        let p = reg.profile_for("Dragonfruit");
        assert_eq!(p.water_every_ticks, default_crop_profile().water_every_ticks);
    }

    #[test]
    fn new_plant_health_depends_on_biome_match() {
        let reg = CropRegistry::default();
        let rice = reg.get("Rice").unwrap();
        let matched = Plant::new(rice, Biome::Terai, 0);
        let mismatched = Plant::new(rice, Biome::Hilly, 0);
        assert_eq!(matched.health, 82.0);
        assert_eq!(mismatched.health, 74.0);
        assert_eq!(matched.growth_stage, GrowthStage::Seed);
    }

    #[test]
    fn care_log_initialized_to_current_tick() {
        let reg = CropRegistry::default();
        let p = Plant::new(reg.get("Maize").unwrap(), Biome::Hilly, 4242);
        assert_eq!(p.last_care.water, 4242);
        assert_eq!(p.last_care.insecticide, 4242);
        assert_eq!(p.last_care.pesticide, 4242);
    }

    #[test]
    fn clock_text_formats_noon_and_midnight() {
        let mut clock = SimClock::default();
        clock.tod = 50; // 12:00
        assert_eq!(clock.clock_text(), "12:00 PM");
        clock.tod = 0;
        assert_eq!(clock.clock_text(), "12:00 AM");
    }

    #[test]
    fn night_blend_day_vs_night() {
        let mut clock = SimClock::default();
        clock.tod = 50; // midday
        assert!(!clock.is_night());
        clock.tod = 0; // midnight
        assert!(clock.is_night());
        clock.tod = 95; // late evening
        assert!(clock.is_night());
    }

    #[test]
    fn environment_hazard_flags() {
        let mut env = Environment::default();
        env.sun = 85.0;
        env.rain = 10.0;
        assert!(env.drought_active());
        assert!(!env.flood_active());
        env.rain = 90.0;
        assert!(!env.drought_active());
        assert!(env.flood_active());
    }

    #[test]
    fn wallet_spend_is_all_or_nothing() {
        let mut w = Wallet { coins: 3 };
        assert!(w.try_spend(2));
        assert_eq!(w.coins, 1);
        assert!(!w.try_spend(2));
        assert_eq!(w.coins, 1);
        w.credit(4);
        assert_eq!(w.coins, 5);
    }

    #[test]
    fn humidity_derivation_from_rain() {
        let mut env = Environment::default();
        env.humidity = None;
        env.rain = 60.0;
        assert_eq!(env.humidity_pct(), 78.0);
        assert!(env.is_humid());
        env.rain = 40.0;
        assert_eq!(env.humidity_pct(), 40.0);
        assert!(!env.is_humid());
        env.humidity = Some(75.0);
        assert!(env.is_humid());
    }
}
