//! Weather & location domain.
//!
//! Owns the `Environment` resource: biome detection from the location
//! query, manual axis overrides, mapping of external weather snapshots
//! onto the sim axes, day/night sync, and the hazard alert toasts.
//!
//! External lookups (geocoder, weather feed) live outside the core; their
//! results arrive as events carrying the request sequence number they were
//! issued under. Only results matching the latest sequence are applied,
//! so a slow response for an old query can never clobber a newer one.

use bevy::prelude::*;
use crate::shared::*;

pub struct WeatherPlugin;

impl Plugin for WeatherPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AlertMemo>().add_systems(
            Update,
            (
                handle_location_submit,
                handle_geocode_result,
                handle_weather_snapshot,
                handle_env_axis,
                sync_day_night,
                hazard_alerts.run_if(in_state(SimState::Running)),
            ),
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Biome detection
// ─────────────────────────────────────────────────────────────────────────────

const TERAI_KEYWORDS: &[&str] = &[
    "chitwan", "lumbini", "biratnagar", "birgunj", "janakpur", "nepalgunj", "dhangadhi", "itahari",
];
const HILLY_KEYWORDS: &[&str] = &[
    "kathmandu", "pokhara", "ilam", "dhulikhel", "banepa", "bhaktapur", "lalitpur", "gorkha",
    "syangja",
];
const MOUNTAIN_KEYWORDS: &[&str] = &[
    "mustang", "solukhumbu", "manang", "jumla", "dolpa", "humla", "mugu", "rasuwa",
];

/// Classify a free-text location by substring match against known place
/// names. Unknown places read as Hilly.
pub fn detect_biome(raw: &str) -> Biome {
    let q = raw.to_lowercase();
    if TERAI_KEYWORDS.iter().any(|k| q.contains(k)) {
        Biome::Terai
    } else if HILLY_KEYWORDS.iter().any(|k| q.contains(k)) {
        Biome::Hilly
    } else if MOUNTAIN_KEYWORDS.iter().any(|k| q.contains(k)) {
        Biome::Mountain
    } else {
        Biome::Hilly
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Snapshot mapping
// ─────────────────────────────────────────────────────────────────────────────

/// Map a weather snapshot onto the environment axes, honoring the
/// player's manual pins. Temperature always follows the feed.
pub fn apply_snapshot(env: &mut Environment, snap: &WeatherSnapshot) {
    env.temperature = snap.temp_c.round();

    if !env.manual.wind {
        env.wind = ((snap.wind_kph / 45.0) * 100.0).round().clamp(0.0, 100.0);
    }

    let raining_text = {
        let t = snap.condition_text.to_lowercase();
        t.contains("rain") || t.contains("drizzle") || t.contains("shower") || t.contains("thunder")
    };
    env.rain_hint = raining_text;
    if !env.manual.rain {
        let base = (snap.precip_mm * 18.0).round().clamp(0.0, 100.0);
        env.rain = if raining_text { base.max(55.0) } else { base };
    }

    if !env.manual.sun {
        if snap.is_day {
            // Cloud cover is the primary sun signal; a feed without it can
            // still report UV, which maps onto the same 0-100 axis.
            match (snap.cloud, snap.uv) {
                (Some(cloud), _) => {
                    env.sun = (100.0 - cloud).round().clamp(10.0, 100.0);
                }
                (None, Some(uv)) => {
                    env.sun = (40.0 + uv * 7.0).round().clamp(10.0, 100.0);
                }
                (None, None) => {}
            }
        } else {
            let cloud = snap.cloud.unwrap_or(0.0);
            env.sun = (20.0 - cloud / 5.0).round().clamp(0.0, 25.0);
        }
    }

    env.humidity = Some(snap.humidity.clamp(0.0, 100.0));
}

/// Extract a 0..=100 time-of-day from a station localtime string such as
/// "2024-03-01 14:30" or "14:30".
pub fn parse_localtime_tod(localtime: &str) -> Option<u64> {
    let clock = localtime.split_whitespace().last()?;
    let (hh, mm) = clock.split_once(':')?;
    let hh: u32 = hh.parse().ok()?;
    let mm: u32 = mm.parse().ok()?;
    if hh > 23 || mm > 59 {
        return None;
    }
    let frac = (hh * 60 + mm) as f32 / (24.0 * 60.0);
    Some((frac * 100.0).round() as u64)
}

// ─────────────────────────────────────────────────────────────────────────────
// Systems
// ─────────────────────────────────────────────────────────────────────────────

/// New location query: re-detect the biome immediately from the raw text
/// and bump the request sequence so any in-flight result goes stale.
fn handle_location_submit(
    mut events: EventReader<LocationSubmitEvent>,
    mut location: ResMut<Location>,
    mut env: ResMut<Environment>,
    mut toasts: EventWriter<ToastEvent>,
) {
    for event in events.read() {
        let query = event.query.trim();
        if query.is_empty() {
            toasts.send(ToastEvent::new("Enter a location name first."));
            continue;
        }
        location.query = query.to_string();
        location.resolved_label = query.to_string();
        location.coords = None;
        location.request_seq = location.request_seq.wrapping_add(1);

        let biome = detect_biome(query);
        env.reset_for_biome(biome);
        toasts.send(ToastEvent::new(format!("Biome updated to {}.", biome.label())));
        info!("[Weather] Location {:?} -> {} (seq {})", query, biome.label(), location.request_seq);
    }
}

/// Geocoder result. The resolved display name may carry better biome
/// keywords than the raw query, so detection runs again on it.
fn handle_geocode_result(
    mut events: EventReader<GeocodeResultEvent>,
    mut location: ResMut<Location>,
    mut station: ResMut<WeatherStation>,
    mut env: ResMut<Environment>,
) {
    for event in events.read() {
        if event.seq != location.request_seq {
            debug!("[Weather] Dropping stale geocode result (seq {})", event.seq);
            continue;
        }
        location.coords = Some((event.lat, event.lon));
        location.resolved_label = event.label.clone();
        env.reset_for_biome(detect_biome(&event.label));
        // Resolved coordinates invalidate any weather answer in flight.
        station.request_seq = station.request_seq.wrapping_add(1);
        info!("[Weather] Resolved {:?} at ({:.3}, {:.3})", event.label, event.lat, event.lon);
    }
}

/// Weather feed result: last request wins, stale snapshots are dropped.
/// Station local time only moves the sim clock while it is stopped.
fn handle_weather_snapshot(
    mut events: EventReader<WeatherSnapshotEvent>,
    mut station: ResMut<WeatherStation>,
    mut env: ResMut<Environment>,
    mut clock: ResMut<SimClock>,
    state: Res<State<SimState>>,
) {
    for event in events.read() {
        if event.seq != station.request_seq {
            debug!("[Weather] Dropping stale snapshot (seq {})", event.seq);
            continue;
        }
        apply_snapshot(&mut env, &event.snapshot);
        if *state.get() == SimState::Stopped {
            if let Some(tod) = parse_localtime_tod(&event.snapshot.localtime) {
                clock.tod = tod.min(100);
            }
        }
        info!(
            "[Weather] Synced: {:.0}°C, {} ({})",
            event.snapshot.temp_c, event.snapshot.condition_text, event.snapshot.localtime
        );
        station.latest = Some(event.snapshot.clone());
    }
}

/// Manual slider input pins the touched axis until the next location
/// change resets it.
fn handle_env_axis(mut events: EventReader<SetEnvAxisEvent>, mut env: ResMut<Environment>) {
    for event in events.read() {
        match event.axis {
            EnvAxis::Sun => {
                env.sun = event.value.clamp(0.0, 100.0);
                env.manual.sun = true;
            }
            EnvAxis::Rain => {
                env.rain = event.value.clamp(0.0, 100.0);
                env.manual.rain = true;
            }
            EnvAxis::Wind => {
                env.wind = event.value.clamp(0.0, 100.0);
                env.manual.wind = true;
            }
            EnvAxis::Temperature => {
                env.temperature = event.value;
            }
        }
    }
}

fn sync_day_night(clock: Res<SimClock>, mut env: ResMut<Environment>) {
    let night = clock.is_night();
    if env.is_night != night {
        env.is_night = night;
    }
}

/// Repeat guard for the hazard alert toasts.
#[derive(Resource, Debug, Default)]
struct AlertMemo {
    last_key: Option<&'static str>,
    last_warn_at: f32,
}

/// Raise a toast when a hazard condition holds, at most once per six
/// seconds per condition.
fn hazard_alerts(
    time: Res<Time>,
    env: Res<Environment>,
    mut memo: ResMut<AlertMemo>,
    mut toasts: EventWriter<ToastEvent>,
) {
    let key = if env.drought_active() {
        Some("drought")
    } else if env.flood_active() {
        Some("drowning")
    } else if env.wind >= 75.0 {
        Some("windy")
    } else {
        None
    };
    let Some(key) = key else { return };

    let now = time.elapsed_secs();
    if memo.last_key == Some(key) && now - memo.last_warn_at < 6.0 {
        return;
    }
    memo.last_key = Some(key);
    memo.last_warn_at = now;

    let message = match key {
        "drought" => "Alert: drought conditions - Water All or increase Rain to protect crops.",
        "drowning" => "Alert: waterlogging risk - reduce Rain and add Wind to dry.",
        _ => "Alert: high wind - seedlings may stress; avoid heavy watering.",
    };
    toasts.send(ToastEvent::new(message));
}
