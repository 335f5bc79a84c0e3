use anti_aircraft::compute::*;
use anti_aircraft::config::GameConfig;
use anti_aircraft::entities::*;
use anti_aircraft::flight;
use anti_aircraft::schedule::TimerEvent;

use rand::rngs::StdRng;
use rand::SeedableRng;

const FIELD: Playfield = Playfield {
    width: 1000.0,
    height: 800.0,
};

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn make_state(rng: &mut StdRng) -> GameState {
    init_state(GameConfig::default(), FIELD, 0, rng)
}

/// Pin the current pass high above the cannon's line of fire.
fn park_plane_high(s: &mut GameState) {
    s.cycle.start_y = 100.0;
    s.cycle.end_y = 100.0;
}

/// Drop a motionless bullet exactly where the plane will be at `now`.
fn plant_on_plane(s: &mut GameState, now: u64) -> u64 {
    let pose = flight::pose_at(&s.cycle, s.playfield, &s.config.flight, s.config.plane.scale, now);
    let id = s.next_id;
    s.next_id += 1;
    s.bullets.push_back(Bullet {
        id,
        x: pose.x,
        y: pose.y,
        velocity_x: 0.0,
        velocity_y: 0.0,
        created_at_ms: now,
    });
    id
}

/// Land `max_hits` bullets on consecutive 10 ms ticks; returns the time of
/// the lethal tick.
fn shoot_down(s: &mut GameState, rng: &mut StdRng, from: u64) -> u64 {
    let mut now = from;
    for _ in 0..s.config.plane.max_hits {
        now += 10;
        plant_on_plane(s, now);
        tick(s, now, rng);
    }
    now
}

/// By now the plane is inside the bullet bounds, so a missed bullet is
/// not culled as out of bounds on the same tick.
const PLANE_ON_SCREEN_MS: u64 = 1_000;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-2
}

// ── init_state ────────────────────────────────────────────────────────────────

#[test]
fn init_state_full_magazine_and_healthy_plane() {
    let s = make_state(&mut seeded_rng());
    assert_eq!(s.ammo.remaining, 50);
    assert_eq!(s.ammo.initial, 50);
    assert_eq!(s.score.planes_destroyed, 0);
    assert_eq!(s.round, RoundState::Active);
    assert!(s.health.alive);
    assert_eq!(s.health.hits_taken, 0);
    assert_eq!(s.health.max_hits, 4);
}

#[test]
fn init_state_empty_collections() {
    let s = make_state(&mut seeded_rng());
    assert!(s.bullets.is_empty());
    assert!(s.explosions.is_empty());
    assert_eq!(s.frame, 0);
    assert!(!s.crosshair.recoiling);
}

#[test]
fn init_state_plane_starts_off_screen_left_inside_altitude_band() {
    let s = make_state(&mut seeded_rng());
    assert_eq!(s.pose.x, -200.0);
    assert!(s.cycle.start_y >= 160.0 && s.cycle.start_y <= 640.0);
    assert!(s.cycle.end_y >= 160.0 && s.cycle.end_y <= 640.0);
    assert_eq!(s.timers.next_due(), Some(4000));
}

#[test]
fn cannon_sits_bottom_centre() {
    let s = make_state(&mut seeded_rng());
    assert_eq!(cannon_origin(&s), Point::new(500.0, 750.0));
}

// ── fire ──────────────────────────────────────────────────────────────────────

#[test]
fn fire_spends_a_round_and_launches_from_cannon() {
    let mut rng = seeded_rng();
    let mut s = make_state(&mut rng);
    let events = fire(&mut s, Point::new(500.0, 400.0), 0, &mut rng);

    assert_eq!(s.ammo.remaining, 49);
    assert_eq!(s.bullets.len(), 1);
    let b = &s.bullets[0];
    assert_eq!((b.x, b.y), (500.0, 750.0));
    assert!(approx(b.velocity_x, 0.0));
    assert!(approx(b.velocity_y, -800.0));
    assert!(events.contains(&GameEvent::Sound(SoundCue::Shot)));
    assert!(events.contains(&GameEvent::ShotFired {
        bullet_id: Some(b.id),
        ammo_remaining: 49,
    }));
}

#[test]
fn fire_kicks_the_crosshair() {
    let mut rng = seeded_rng();
    let mut s = make_state(&mut rng);
    apply(&mut s, Command::FireAt(Point::new(300.0, 300.0)), 0, &mut rng);
    assert_eq!(s.crosshair.target, Point::new(300.0, 300.0));
    assert!(s.crosshair.recoiling);
    assert!(s.crosshair.position().y < 300.0);
}

#[test]
fn degenerate_aim_spends_a_round_without_a_bullet() {
    let mut rng = seeded_rng();
    let mut s = make_state(&mut rng);
    let muzzle = cannon_origin(&s);
    let events = fire(&mut s, muzzle, 0, &mut rng);

    assert_eq!(s.ammo.remaining, 49);
    assert!(s.bullets.is_empty());
    assert!(events.contains(&GameEvent::ShotFired {
        bullet_id: None,
        ammo_remaining: 49,
    }));
}

#[test]
fn oldest_bullet_evicted_at_capacity() {
    let mut rng = seeded_rng();
    let mut s = make_state(&mut rng);
    s.config.bullet.max_live = 3;

    let mut ids = Vec::new();
    for _ in 0..3 {
        fire(&mut s, Point::new(500.0, 100.0), 0, &mut rng);
        ids.push(s.bullets.back().map(|b| b.id).unwrap());
    }
    let events = fire(&mut s, Point::new(500.0, 100.0), 0, &mut rng);

    assert_eq!(s.bullets.len(), 3);
    assert!(events.contains(&GameEvent::BulletRemoved {
        id: ids[0],
        reason: RemovalReason::Evicted,
    }));
    assert!(s.bullets.iter().all(|b| b.id != ids[0]));
}

#[test]
fn exactly_initial_shots_before_game_over() {
    let mut rng = seeded_rng();
    let mut s = make_state(&mut rng);

    for n in 1..=50u32 {
        let events = fire(&mut s, Point::new(500.0, 100.0), 0, &mut rng);
        assert!(events.iter().any(|e| matches!(e, GameEvent::ShotFired { .. })));
        if n < 50 {
            assert_eq!(s.round, RoundState::Active);
        }
    }
    assert_eq!(s.ammo.remaining, 0);
    assert_eq!(s.round, RoundState::GameOver);

    let events = fire(&mut s, Point::new(500.0, 100.0), 0, &mut rng);
    assert_eq!(
        events,
        vec![GameEvent::ShotRejected, GameEvent::Sound(SoundCue::EmptyMagazine)]
    );
    assert_eq!(s.ammo.remaining, 0);
}

#[test]
fn last_round_reports_round_over_once() {
    let mut rng = seeded_rng();
    let mut s = make_state(&mut rng);
    s.ammo = AmmoLedger::new(1);

    let events = fire(&mut s, Point::new(500.0, 100.0), 0, &mut rng);
    assert!(events.contains(&GameEvent::RoundOver { planes_destroyed: 0 }));

    let events = tick(&mut s, 33, &mut rng);
    assert!(!events.iter().any(|e| matches!(e, GameEvent::RoundOver { .. })));
}

// ── tick: bullets ─────────────────────────────────────────────────────────────

#[test]
fn bullet_follows_semi_implicit_euler() {
    let mut rng = seeded_rng();
    let mut s = make_state(&mut rng);
    park_plane_high(&mut s);
    fire(&mut s, Point::new(500.0, 400.0), 0, &mut rng);

    for step in 1..=5 {
        tick(&mut s, step * 100, &mut rng);
    }
    let b = &s.bullets[0];
    assert!(approx(b.velocity_y, -600.0), "vy = {}", b.velocity_y);
    assert!(approx(b.y, 410.0), "y = {}", b.y);
    assert!(approx(b.x, 500.0));
}

#[test]
fn long_frame_is_clamped() {
    let mut rng = seeded_rng();
    let mut s = make_state(&mut rng);
    park_plane_high(&mut s);
    fire(&mut s, Point::new(500.0, 400.0), 0, &mut rng);

    tick(&mut s, 2_000, &mut rng);
    let b = &s.bullets[0];
    // One MAX_FRAME_MS step, not two seconds
    assert!(approx(b.velocity_y, -760.0));
    assert!(approx(b.y, 674.0));
}

#[test]
fn bullet_expires_at_lifetime() {
    let mut rng = seeded_rng();
    let mut s = make_state(&mut rng);
    park_plane_high(&mut s);
    s.config.bullet.gravity = 0.0;
    s.bullets.push_back(Bullet {
        id: 99,
        x: 500.0,
        y: 500.0,
        velocity_x: 0.0,
        velocity_y: 0.0,
        created_at_ms: 0,
    });

    let mut now = 0;
    while now < 2_900 {
        now += 100;
        let events = tick(&mut s, now, &mut rng);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::BulletRemoved { .. })));
    }
    assert_eq!(s.bullets.len(), 1);

    let events = tick(&mut s, 3_000, &mut rng);
    assert!(s.bullets.is_empty());
    assert!(events.contains(&GameEvent::BulletRemoved {
        id: 99,
        reason: RemovalReason::Expired,
    }));
}

#[test]
fn bullet_leaving_the_field_is_removed() {
    let mut rng = seeded_rng();
    let mut s = make_state(&mut rng);
    park_plane_high(&mut s);
    fire(&mut s, Point::new(0.0, 750.0), 0, &mut rng);
    let id = s.bullets[0].id;

    let mut removed = None;
    for step in 1..=10 {
        for e in tick(&mut s, step * 100, &mut rng) {
            if let GameEvent::BulletRemoved { id: gone, reason } = e {
                assert_eq!(gone, id);
                removed = Some(reason);
            }
        }
    }
    assert_eq!(removed, Some(RemovalReason::OutOfBounds));
}

// ── tick: hits and destruction ────────────────────────────────────────────────

#[test]
fn hit_damages_and_spawns_impact_explosion() {
    let mut rng = seeded_rng();
    let mut s = make_state(&mut rng);
    let id = plant_on_plane(&mut s, 1_000);

    let events = tick(&mut s, 1_000, &mut rng);
    assert_eq!(s.health.hits_taken, 1);
    assert!(s.health.alive);
    assert!(s.bullets.is_empty());
    assert_eq!(s.explosions.len(), 1);
    assert_eq!(s.explosions[0].stage, ExplosionStage::Impact);
    assert!(events.contains(&GameEvent::BulletRemoved {
        id,
        reason: RemovalReason::Hit,
    }));
    assert!(events.contains(&GameEvent::Sound(SoundCue::ImpactExplosion)));
}

#[test]
fn only_one_hit_per_frame() {
    let mut rng = seeded_rng();
    let mut s = make_state(&mut rng);
    plant_on_plane(&mut s, 1_000);
    plant_on_plane(&mut s, 1_000);

    tick(&mut s, 1_000, &mut rng);
    assert_eq!(s.health.hits_taken, 1);
    assert_eq!(s.bullets.len(), 1);

    tick(&mut s, 1_010, &mut rng);
    assert_eq!(s.health.hits_taken, 2);
    assert!(s.bullets.is_empty());
}

#[test]
fn hit_beats_expiry_in_the_same_frame() {
    let mut rng = seeded_rng();
    let mut s = make_state(&mut rng);
    s.config.bullet.gravity = 0.0;
    let id = plant_on_plane(&mut s, 3_000);
    s.bullets[0].created_at_ms = 0;

    let events = tick(&mut s, 3_000, &mut rng);
    assert!(events.contains(&GameEvent::BulletRemoved {
        id,
        reason: RemovalReason::Hit,
    }));
}

#[test]
fn four_hits_destroy_the_plane() {
    let mut rng = seeded_rng();
    let mut s = make_state(&mut rng);

    let lethal = shoot_down(&mut s, &mut rng, PLANE_ON_SCREEN_MS);
    assert!(!s.health.alive);
    assert_eq!(s.health.hits_taken, 4);
    assert_eq!(s.score.planes_destroyed, 1);
    assert!(!s.timers.is_pending(TimerEvent::CycleComplete));

    // Three impacts plus the death sequence, anchored on the wreck
    let death: Vec<_> = s
        .explosions
        .iter()
        .filter(|e| matches!(e.kind, ExplosionKind::Death { .. }))
        .collect();
    assert_eq!(death.len(), 1);
    assert_eq!(death[0].stage, ExplosionStage::DamageFlash);
    assert_eq!((death[0].x, death[0].y), (s.pose.x, s.pose.y));
    assert_eq!(s.explosions.len(), 4);
    assert!(s.timers.is_pending(TimerEvent::DeathPhaseTwo {
        explosion_id: death[0].id
    }));
    assert_eq!(s.timers.next_due(), Some(lethal + 100));
}

#[test]
fn lethal_hit_reports_destruction_and_stops_engine() {
    let mut rng = seeded_rng();
    let mut s = make_state(&mut rng);
    for t in [1_010, 1_020, 1_030] {
        plant_on_plane(&mut s, t);
        tick(&mut s, t, &mut rng);
    }
    plant_on_plane(&mut s, 1_040);
    let events = tick(&mut s, 1_040, &mut rng);

    assert!(events.contains(&GameEvent::PlaneDestroyed { planes_destroyed: 1 }));
    assert!(events.contains(&GameEvent::Sound(SoundCue::EngineStop)));
    let impacts = s
        .explosions
        .iter()
        .filter(|e| matches!(e.kind, ExplosionKind::Impact { .. }))
        .count();
    assert_eq!(impacts, 3);
}

#[test]
fn wreck_stays_put_while_destroyed() {
    let mut rng = seeded_rng();
    let mut s = make_state(&mut rng);
    let lethal = shoot_down(&mut s, &mut rng, PLANE_ON_SCREEN_MS);
    let frozen = s.pose;

    tick(&mut s, lethal + 500, &mut rng);
    assert_eq!(s.pose, frozen);

    // A bullet through the wreck is not a hit
    plant_on_plane(&mut s, lethal + 510);
    s.bullets[0].x = frozen.x;
    s.bullets[0].y = frozen.y;
    tick(&mut s, lethal + 510, &mut rng);
    assert_eq!(s.score.planes_destroyed, 1);
    assert_eq!(s.bullets.len(), 1);
}

#[test]
fn death_sequence_then_respawn() {
    let mut rng = seeded_rng();
    let mut s = make_state(&mut rng);
    let lethal = shoot_down(&mut s, &mut rng, PLANE_ON_SCREEN_MS);

    let events = tick(&mut s, lethal + 99, &mut rng);
    assert!(!events.contains(&GameEvent::Sound(SoundCue::DeathExplosion)));

    let events = tick(&mut s, lethal + 100, &mut rng);
    assert!(events.contains(&GameEvent::Sound(SoundCue::DeathExplosion)));
    let death = s
        .explosions
        .iter()
        .find(|e| matches!(e.kind, ExplosionKind::Death { .. }))
        .unwrap();
    assert_eq!(death.stage, ExplosionStage::DeathFadeIn);

    tick(&mut s, lethal + 1_000, &mut rng);
    let death = s
        .explosions
        .iter()
        .find(|e| matches!(e.kind, ExplosionKind::Death { .. }))
        .unwrap();
    assert_eq!(death.stage, ExplosionStage::DeathFadeOut);

    let events = tick(&mut s, lethal + 1_699, &mut rng);
    assert!(!events.contains(&GameEvent::PlaneRespawned));
    assert!(!s.health.alive);

    let events = tick(&mut s, lethal + 1_700, &mut rng);
    assert!(events.contains(&GameEvent::PlaneRespawned));
    assert!(events.contains(&GameEvent::NewFlightCycle));
    assert!(s.health.alive);
    assert_eq!(s.health.hits_taken, 0);
    assert_eq!(s.cycle.started_at_ms, lethal + 1_700);
    assert_eq!(s.pose.x, -200.0);
    assert!(s.timers.is_pending(TimerEvent::CycleComplete));
}

#[test]
fn second_blast_starts_at_its_deadline_between_frames() {
    let mut rng = seeded_rng();
    let mut s = make_state(&mut rng);
    let lethal = shoot_down(&mut s, &mut rng, PLANE_ON_SCREEN_MS);

    for step in 1..=4 {
        tick(&mut s, lethal + step * 33, &mut rng);
    }
    let death = s
        .explosions
        .iter()
        .find(|e| matches!(e.kind, ExplosionKind::Death { .. }))
        .unwrap();
    assert_eq!(
        death.kind,
        ExplosionKind::Death {
            phase_two_at_ms: Some(lethal + 100)
        }
    );
}

#[test]
fn bullets_still_land_after_round_over() {
    let mut rng = seeded_rng();
    let mut s = make_state(&mut rng);
    s.ammo = AmmoLedger::new(1);
    fire(&mut s, Point::new(500.0, 100.0), 0, &mut rng);
    assert_eq!(s.round, RoundState::GameOver);

    s.bullets.clear();
    shoot_down(&mut s, &mut rng, PLANE_ON_SCREEN_MS);
    assert_eq!(s.score.planes_destroyed, 1);
}

#[test]
fn round_settles_only_after_late_kills_play_out() {
    let mut rng = seeded_rng();
    let mut s = make_state(&mut rng);
    s.ammo = AmmoLedger::new(1);
    fire(&mut s, Point::new(500.0, 100.0), 0, &mut rng);
    assert!(s.round.is_over());
    assert!(!round_settled(&s), "bullet still in the air");

    s.bullets.clear();
    let lethal = shoot_down(&mut s, &mut rng, PLANE_ON_SCREEN_MS);
    assert!(s.bullets.is_empty());
    assert!(!round_settled(&s), "wreck still burning");

    tick(&mut s, lethal + 1_700, &mut rng);
    assert!(round_settled(&s));
    assert_eq!(s.score.planes_destroyed, 1);
}

#[test]
fn active_round_is_never_settled() {
    let s = make_state(&mut seeded_rng());
    assert!(s.bullets.is_empty());
    assert!(!round_settled(&s));
}

// ── tick: flight cycle ────────────────────────────────────────────────────────

#[test]
fn plane_crosses_the_screen() {
    let mut rng = seeded_rng();
    let mut s = make_state(&mut rng);
    tick(&mut s, 2_000, &mut rng);
    assert!(approx(s.pose.x, 500.0));
    let mid_y = (s.cycle.start_y + s.cycle.end_y) / 2.0;
    assert!(approx(s.pose.y, mid_y));
}

#[test]
fn flight_cycle_regenerates_after_duration() {
    let mut rng = seeded_rng();
    let mut s = make_state(&mut rng);

    let events = tick(&mut s, 3_999, &mut rng);
    assert!(!events.contains(&GameEvent::NewFlightCycle));
    assert_eq!(s.cycle.started_at_ms, 0);

    let events = tick(&mut s, 4_000, &mut rng);
    assert!(events.contains(&GameEvent::Sound(SoundCue::EngineFadeOut)));
    assert!(events.contains(&GameEvent::NewFlightCycle));
    assert_eq!(s.cycle.started_at_ms, 4_000);
    assert_eq!(s.pose.x, -200.0);
    assert_eq!(s.timers.next_due(), Some(8_000));
}

#[test]
fn flight_cycles_keep_their_cadence_at_frame_rate() {
    let mut rng = seeded_rng();
    let mut s = make_state(&mut rng);

    let mut starts = Vec::new();
    let mut now = 0;
    while now <= 40_000 {
        now += 33;
        if tick(&mut s, now, &mut rng).contains(&GameEvent::NewFlightCycle) {
            starts.push(s.cycle.started_at_ms);
        }
    }
    let expected: Vec<u64> = (1..=10).map(|n| n * 4_000).collect();
    assert_eq!(starts, expected);
}

#[test]
fn stalled_host_restarts_the_pass_from_now() {
    let mut rng = seeded_rng();
    let mut s = make_state(&mut rng);

    let events = tick(&mut s, 60_000, &mut rng);
    assert!(events.contains(&GameEvent::NewFlightCycle));
    assert_eq!(s.cycle.started_at_ms, 60_000);
    assert_eq!(s.timers.next_due(), Some(64_000));
}

// ── crosshair ─────────────────────────────────────────────────────────────────

#[test]
fn aim_moves_target_only() {
    let mut rng = seeded_rng();
    let mut s = make_state(&mut rng);
    let events = apply(&mut s, Command::AimAt(Point::new(10.0, 20.0)), 0, &mut rng);
    assert!(events.is_empty());
    assert_eq!(s.crosshair.position(), Point::new(10.0, 20.0));
    assert_eq!(s.ammo.remaining, 50);
}

#[test]
fn recoil_settles_over_ticks() {
    let mut rng = seeded_rng();
    let mut s = make_state(&mut rng);
    park_plane_high(&mut s);
    apply(&mut s, Command::FireAt(Point::new(500.0, 300.0)), 0, &mut rng);

    for step in 1..=30 {
        tick(&mut s, step * 33, &mut rng);
    }
    assert!(!s.crosshair.recoiling);
    assert_eq!(s.crosshair.position(), Point::new(500.0, 300.0));
}

// ── reset ─────────────────────────────────────────────────────────────────────

#[test]
fn reset_restores_a_fresh_round() {
    let mut rng = seeded_rng();
    let mut s = make_state(&mut rng);
    s.ammo = AmmoLedger::new(1);
    s.ammo.initial = 50;
    fire(&mut s, Point::new(500.0, 100.0), 0, &mut rng);
    shoot_down(&mut s, &mut rng, PLANE_ON_SCREEN_MS);
    assert_eq!(s.round, RoundState::GameOver);

    let events = apply(&mut s, Command::Reset, 5_000, &mut rng);
    assert!(events.contains(&GameEvent::NewFlightCycle));
    assert_eq!(s.ammo.remaining, 50);
    assert_eq!(s.score.planes_destroyed, 0);
    assert_eq!(s.round, RoundState::Active);
    assert!(s.health.alive);
    assert!(s.bullets.is_empty());
    assert!(s.explosions.is_empty());
    assert_eq!(s.timers.len(), 1);
    assert_eq!(s.timers.next_due(), Some(9_000));
}

#[test]
fn reset_is_idempotent() {
    let mut rng = seeded_rng();
    let mut s = make_state(&mut rng);
    fire(&mut s, Point::new(500.0, 100.0), 0, &mut rng);

    reset(&mut s, 100, &mut rng);
    let once = (s.ammo, s.score, s.round, s.health, s.timers.len());
    reset(&mut s, 100, &mut rng);
    let twice = (s.ammo, s.score, s.round, s.health, s.timers.len());
    assert_eq!(once, twice);
    assert!(s.bullets.is_empty());
}
