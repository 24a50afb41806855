//! Precognition worker driven through its handle

use std::sync::Arc;
use std::time::Duration;

use tactician::board::{Board, Facing, HexCoord};
use tactician::bot::UnitPhase;
use tactician::core::config::EnumerationConfig;
use tactician::core::types::{PlayerId, UnitId};
use tactician::core::TacticsError;
use tactician::movement::{MovePath, PathEnumerator};
use tactician::precognition::{Precognition, PrecognitionHandle, PrecognitionStatus};
use tactician::ranking::BehaviorProfile;
use tactician::rules::StandardRules;
use tactician::units::{Battlefield, Unit, Weapon};
use tactician::{BotConfig, TacticalBot};

fn enumerator() -> Arc<PathEnumerator> {
    Arc::new(PathEnumerator::new(
        EnumerationConfig::default(),
        Arc::new(StandardRules::new()),
    ))
}

fn field() -> Battlefield {
    Battlefield::new(Board::new(16, 16))
        .with_unit(
            Unit::new(1, "Near", 0, 50, 2)
                .at(HexCoord::new(2, 2), Facing::SOUTH)
                .with_weapon(Weapon::medium_laser(1)),
        )
        .with_unit(Unit::new(2, "Far", 0, 50, 2).at(HexCoord::new(12, 12), Facing::NORTH))
        .with_unit(
            Unit::new(3, "Enemy", 1, 50, 4)
                .at(HexCoord::new(12, 2), Facing::SOUTH)
                .with_weapon(Weapon::medium_laser(1)),
        )
}

fn described(paths: &[MovePath]) -> Vec<String> {
    paths.iter().map(|p| p.describe()).collect()
}

/// Poll until the worker reports no dirty units
async fn settled(handle: &PrecognitionHandle) -> PrecognitionStatus {
    for _ in 0..400 {
        let status = handle.status().await.unwrap();
        if status.dirty_units == 0 {
            return status;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("precognition never settled");
}

#[tokio::test]
async fn test_fresh_paths_match_direct_enumeration() {
    let field = field();
    let enumerator = enumerator();
    let handle = Precognition::spawn(Arc::new(field.clone()), Arc::clone(&enumerator), PlayerId(0));

    let cached = handle.ensure_fresh(UnitId(1)).await.unwrap();
    let direct = enumerator.enumerate(field.unit(UnitId(1)).unwrap(), &field);
    assert_eq!(described(&cached), described(&direct.paths));

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_background_fill_covers_owned_units() {
    let handle = Precognition::spawn(Arc::new(field()), enumerator(), PlayerId(0));
    let status = settled(&handle).await;
    assert_eq!(status.cached_units, 2);
    assert!(status.refreshes >= 2);
    assert!(!status.paused);
    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_move_dirties_nearby_caches() {
    let handle = Precognition::spawn(Arc::new(field()), enumerator(), PlayerId(0));
    handle.ensure_fresh(UnitId(1)).await.unwrap();
    handle.ensure_fresh(UnitId(2)).await.unwrap();
    handle.pause().await.unwrap();

    // the enemy walks up next to unit 1, nowhere near unit 2
    handle
        .unit_moved(UnitId(3), HexCoord::new(3, 2), Facing::SOUTH_WEST, 9)
        .await
        .unwrap();
    let status = handle.status().await.unwrap();
    assert!(status.paused);
    assert_eq!(status.dirty_units, 2);

    // paused workers still answer foreground requests
    let refreshed = handle.ensure_fresh(UnitId(1)).await.unwrap();
    assert!(refreshed.iter().all(|p| p.end_position() != HexCoord::new(3, 2)));
    assert_eq!(handle.status().await.unwrap().dirty_units, 1);

    handle.resume().await.unwrap();
    settled(&handle).await;
    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_removed_unit_is_not_found() {
    let handle = Precognition::spawn(Arc::new(field()), enumerator(), PlayerId(0));
    handle.unit_removed(UnitId(2)).await.unwrap();
    assert!(matches!(
        handle.ensure_fresh(UnitId(2)).await,
        Err(TacticsError::UnitNotFound(UnitId(2)))
    ));
    assert!(matches!(
        handle.ensure_fresh(UnitId(77)).await,
        Err(TacticsError::UnitNotFound(UnitId(77)))
    ));
    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_sync_replaces_snapshot() {
    let handle = Precognition::spawn(Arc::new(field()), enumerator(), PlayerId(0));
    settled(&handle).await;

    let mut next = field();
    next.start_round();
    next.remove_unit(UnitId(2));
    handle.sync_battlefield(Arc::new(next)).await.unwrap();

    let status = settled(&handle).await;
    assert_eq!(status.round, 2);
    assert_eq!(status.cached_units, 1);
    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_calls_after_shutdown_fail() {
    let handle = Precognition::spawn(Arc::new(field()), enumerator(), PlayerId(0));
    let clone = handle.clone();
    handle.shutdown().await.unwrap();
    assert!(matches!(
        clone.ensure_fresh(UnitId(1)).await,
        Err(TacticsError::PrecognitionClosed)
    ));
    assert!(matches!(clone.status().await, Err(TacticsError::PrecognitionClosed)));
}

#[tokio::test]
async fn test_bot_decides_the_same_with_precognition() {
    let field = field();
    let mut direct_bot = TacticalBot::new(BotConfig::default(), BehaviorProfile::default()).unwrap();
    let direct = direct_bot.decide_move(&field, UnitId(1)).unwrap();

    let mut bot = TacticalBot::new(BotConfig::default(), BehaviorProfile::default()).unwrap();
    let handle = Precognition::spawn(Arc::new(field.clone()), bot.enumerator(), PlayerId(0));
    let cached = bot
        .decide_move_with_precognition(&field, UnitId(1), &handle)
        .await
        .unwrap();
    assert_eq!(direct.describe(), cached.describe());
    assert!(bot.turns().is_committed(UnitId(1)));
    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_stale_candidates_are_enumerated_again() {
    let field = field();
    let mut bot = TacticalBot::new(BotConfig::default(), BehaviorProfile::default()).unwrap();
    let handle = Precognition::spawn(Arc::new(field.clone()), bot.enumerator(), PlayerId(0));

    assert!(bot.prefetch_moves(&field, UnitId(1), &handle).await.unwrap() > 1);
    bot.prefetch_moves(&field, UnitId(2), &handle).await.unwrap();
    assert_eq!(bot.turns().phase(UnitId(1)), UnitPhase::Cached);
    assert!(bot.refresh_stale(&handle).await.unwrap().is_empty());

    // the enemy steps into unit 1's reach only
    handle
        .unit_moved(UnitId(3), HexCoord::new(3, 2), Facing::SOUTH_WEST, 9)
        .await
        .unwrap();
    assert_eq!(bot.refresh_stale(&handle).await.unwrap(), vec![UnitId(1)]);
    assert_eq!(bot.turns().phase(UnitId(1)), UnitPhase::Enumerating);
    assert_eq!(bot.turns().phase(UnitId(2)), UnitPhase::Cached);

    bot.decide_move_with_precognition(&field, UnitId(1), &handle)
        .await
        .unwrap();
    bot.decide_move_with_precognition(&field, UnitId(2), &handle)
        .await
        .unwrap();
    assert_eq!(bot.turns().committed_units(), vec![UnitId(1), UnitId(2)]);
    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_failed_fetch_leaves_unit_enumerating() {
    let field = field();
    let mut bot = TacticalBot::new(BotConfig::default(), BehaviorProfile::default()).unwrap();
    let handle = Precognition::spawn(Arc::new(field.clone()), bot.enumerator(), PlayerId(0));
    handle.shutdown().await.unwrap();

    assert!(matches!(
        bot.decide_move_with_precognition(&field, UnitId(1), &handle).await,
        Err(TacticsError::PrecognitionClosed)
    ));
    assert_eq!(bot.turns().phase(UnitId(1)), UnitPhase::Enumerating);

    bot.decide_move(&field, UnitId(1)).unwrap();
    assert!(bot.turns().is_committed(UnitId(1)));
}
