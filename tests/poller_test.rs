//! Legendary poller integration tests
//! Run with: cargo test --test poller_test

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use common::{configured_guild, FakeGameApi, Harness, RecordingBot, CHANNEL_SETTING};
use legendary_bot::application::errors::PollerError;
use legendary_bot::application::services::{GuildPoller, PollerConfig};
use legendary_bot::domain::entities::FeedEvent;
use legendary_bot::domain::traits::{WatermarkKey, WatermarkStore};
use legendary_bot::infrastructure::storage::MemorySettings;

const GUILD: &str = "guild-1";
const LEGENDARY: u64 = 999;

fn config(period: Duration) -> Arc<PollerConfig> {
    Arc::new(PollerConfig {
        initial_delay: Duration::ZERO,
        period,
        tracked_level: 110,
        ignored_items: vec![147451],
        channel_setting: CHANNEL_SETTING.to_string(),
    })
}

fn harness(api: FakeGameApi) -> Harness {
    Harness::new(
        api,
        RecordingBot::new().with_guild(GUILD).with_channel(GUILD, "loot", "chan-loot"),
        MemorySettings::new().with_guild(configured_guild(GUILD, "loot")),
    )
}

fn poller(h: &Harness) -> GuildPoller {
    GuildPoller::new(GUILD, h.poller_deps(), config(Duration::from_secs(3600)))
}

fn member_key(name: &str) -> WatermarkKey {
    WatermarkKey::member("us", "Archimonde", name)
}

/// A first sighting of a legendary loot announces it once and stores the watermark
#[tokio::test]
async fn test_new_legendary_is_announced_once() {
    let h = harness(FakeGameApi::new().with_member("A", 110).with_item(LEGENDARY, "Sephuz's Secret", 5));
    h.api.set_feed("A", 1000, &[(LEGENDARY, 100)]);
    h.watermarks.advance(&member_key("A"), 50).unwrap();
    let poller = poller(&h);

    let report = poller.tick().await.unwrap();
    assert_eq!(report.notifications, 1);
    assert_eq!(h.watermarks.get(&member_key("A")).unwrap(), Some(1000));
    assert_eq!(
        h.bot.sent(),
        vec![(
            "chan-loot".to_string(),
            "A just looted a legendary! Sephuz's Secret http://www.wowhead.com/item=999".to_string()
        )]
    );

    let report = poller.tick().await.unwrap();
    assert_eq!(report.notifications, 0);
    assert_eq!(report.members_updated, 0);
    assert_eq!(h.bot.sent().len(), 1);
}

/// A feed not newer than the watermark is skipped without any lookup
#[tokio::test]
async fn test_stale_feed_is_ignored() {
    let h = harness(FakeGameApi::new().with_member("A", 110).with_item(LEGENDARY, "Prydaz", 5));
    h.api.set_feed("A", 1000, &[(LEGENDARY, 900)]);
    h.watermarks.advance(&member_key("A"), 1000).unwrap();

    let report = poller(&h).tick().await.unwrap();
    assert_eq!(report.members_checked, 1);
    assert_eq!(report.members_updated, 0);
    assert!(h.bot.sent().is_empty());
    assert_eq!(h.api.item_calls(), 0);
}

/// Only events newer than the previous watermark are considered
#[tokio::test]
async fn test_old_events_in_a_newer_feed_are_skipped() {
    let h = harness(
        FakeGameApi::new()
            .with_member("A", 110)
            .with_item(LEGENDARY, "Prydaz", 5)
            .with_item(1000, "Velen's Future Sight", 5),
    );
    h.watermarks.advance(&member_key("A"), 500).unwrap();
    h.api.set_feed("A", 800, &[(LEGENDARY, 400), (1000, 700)]);

    let report = poller(&h).tick().await.unwrap();
    assert_eq!(report.notifications, 1);
    assert!(h.bot.texts()[0].contains("Velen's Future Sight"));
    assert_eq!(h.watermarks.get(&member_key("A")).unwrap(), Some(800));
}

/// The watermark never moves backwards, even when upstream does
#[tokio::test]
async fn test_watermark_is_monotonic() {
    let h = harness(FakeGameApi::new().with_member("A", 110));
    h.watermarks.advance(&member_key("A"), 2000).unwrap();
    h.api.set_feed("A", 1500, &[]);

    poller(&h).tick().await.unwrap();
    assert_eq!(h.watermarks.get(&member_key("A")).unwrap(), Some(2000));
}

/// Ignored items, non-legendaries, other event kinds and other levels never notify
#[tokio::test]
async fn test_filters() {
    let h = harness(
        FakeGameApi::new()
            .with_member("A", 110)
            .with_member("Lowbie", 100)
            .with_item(147451, "Sargeras Sigil", 5)
            .with_item(500, "Epic Boots", 4),
    );
    h.api.set_feed("A", 1000, &[(147451, 900), (500, 910)]);
    h.api.push_event(
        "A",
        FeedEvent {
            kind: "ACHIEVEMENT".to_string(),
            item_id: None,
            timestamp: 950,
        },
    );
    h.api.set_feed("Lowbie", 1000, &[(LEGENDARY, 900)]);

    let report = poller(&h).tick().await.unwrap();
    assert_eq!(report.members_checked, 1);
    assert_eq!(report.notifications, 0);
    assert!(h.bot.sent().is_empty());
    assert_eq!(h.api.feed_calls.load(Ordering::SeqCst), 1);
}

/// Item metadata is fetched once and reused across members
#[tokio::test]
async fn test_item_lookup_is_cached() {
    let h = harness(
        FakeGameApi::new()
            .with_member("A", 110)
            .with_member("B", 110)
            .with_item(LEGENDARY, "Prydaz", 5),
    );
    h.api.set_feed("A", 1000, &[(LEGENDARY, 900)]);
    h.api.set_feed("B", 1000, &[(LEGENDARY, 950)]);

    let report = poller(&h).tick().await.unwrap();
    assert_eq!(report.notifications, 2);
    assert_eq!(h.api.item_calls(), 1);
}

/// An unconfigured guild is skipped before any remote call
#[tokio::test]
async fn test_unconfigured_guild_is_skipped() {
    let h = Harness::new(
        FakeGameApi::new().with_member("A", 110),
        RecordingBot::new(),
        MemorySettings::new(),
    );

    let err = poller(&h).tick().await.unwrap_err();
    assert!(matches!(err, PollerError::ConfigurationIncomplete(_)));
    assert_eq!(h.api.roster_calls(), 0);
}

/// A guild unknown upstream ends the tick quietly
#[tokio::test]
async fn test_missing_roster_ends_tick() {
    let h = harness(FakeGameApi::new());

    let report = poller(&h).tick().await.unwrap();
    assert!(!report.roster_found);
    assert_eq!(h.api.roster_calls(), 1);
}

/// A roster fetch failure aborts the tick with a remote error
#[tokio::test]
async fn test_roster_failure_aborts_tick() {
    let h = harness(FakeGameApi::new().with_member("A", 110).failing_roster());

    let err = poller(&h).tick().await.unwrap_err();
    assert!(matches!(err, PollerError::Remote(_)));
}

/// One member's failing feed does not stop the others
#[tokio::test]
async fn test_member_failure_is_isolated() {
    let h = harness(
        FakeGameApi::new()
            .with_member("A", 110)
            .with_member("B", 110)
            .with_item(LEGENDARY, "Prydaz", 5)
            .failing_feed("A"),
    );
    h.api.set_feed("B", 1000, &[(LEGENDARY, 900)]);

    let report = poller(&h).tick().await.unwrap();
    assert_eq!(report.members_checked, 2);
    assert_eq!(report.notifications, 1);
    assert_eq!(h.watermarks.get(&member_key("A")).unwrap(), None);
}

/// A cancelled poller stops at the next member boundary
#[tokio::test]
async fn test_cancelled_tick_stops_at_member_boundary() {
    let h = harness(FakeGameApi::new().with_member("A", 110).with_member("B", 110));
    let token = CancellationToken::new();
    token.cancel();

    let report = poller(&h).with_cancellation(token).tick().await.unwrap();
    assert!(report.cancelled);
    assert_eq!(report.members_checked, 0);
}

/// Cancelling while a member's feed is in flight lets that member finish
/// and stops before the next one
#[tokio::test]
async fn test_cancel_during_member_fetch_stops_before_next_member() {
    let token = CancellationToken::new();
    let h = harness(
        FakeGameApi::new()
            .with_member("A", 110)
            .with_member("B", 110)
            .with_member("C", 110)
            .cancel_on_feed("B", token.clone()),
    );

    let report = poller(&h).with_cancellation(token).tick().await.unwrap();
    assert!(report.cancelled);
    assert_eq!(report.members_checked, 2);
    assert_eq!(h.api.feed_calls(), 2);
}

/// Cancelling between two loot events announces the first and skips the rest
#[tokio::test]
async fn test_cancel_between_feed_events() {
    let token = CancellationToken::new();
    let h = harness(
        FakeGameApi::new()
            .with_member("A", 110)
            .with_item(LEGENDARY, "Sephuz's Secret", 5)
            .with_item(998, "Prydaz, Xavaric's Magnum Opus", 5)
            .cancel_on_item(LEGENDARY, token.clone()),
    );
    h.api.set_feed("A", 1000, &[(LEGENDARY, 100), (998, 200)]);

    let report = poller(&h).with_cancellation(token).tick().await.unwrap();
    assert!(report.cancelled);
    assert_eq!(report.notifications, 1);
    assert_eq!(h.api.item_calls(), 1);
    assert_eq!(h.bot.sent().len(), 1);
    assert_eq!(h.watermarks.get(&member_key("A")).unwrap(), Some(1000));
}

/// An unresolvable channel tears the poller down for good
#[tokio::test]
async fn test_unresolvable_channel_tears_poller_down() {
    let h = Harness::new(
        FakeGameApi::new().with_member("A", 110).with_item(LEGENDARY, "Prydaz", 5),
        RecordingBot::new().with_guild(GUILD),
        MemorySettings::new().with_guild(configured_guild(GUILD, "deleted-channel")),
    );
    h.api.set_feed("A", 1000, &[(LEGENDARY, 900)]);

    let handle = GuildPoller::new(GUILD, h.poller_deps(), config(Duration::from_millis(10))).spawn();

    for _ in 0..200 {
        if handle.is_finished() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(handle.is_finished());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.api.roster_calls(), 1);
    assert!(h.bot.sent().is_empty());
    // Advanced before the failure, so the loot is not retried
    assert_eq!(h.watermarks.get(&member_key("A")).unwrap(), Some(1000));
}

/// The schedule keeps ticking until stopped
#[tokio::test]
async fn test_schedule_runs_until_stopped() {
    let h = harness(FakeGameApi::new().with_member("A", 110));
    h.api.set_feed("A", 1000, &[]);

    let handle = GuildPoller::new(GUILD, h.poller_deps(), config(Duration::from_millis(10))).spawn();

    for _ in 0..200 {
        if h.api.roster_calls() >= 3 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(h.api.roster_calls() >= 3);

    handle.stop().await;
    let calls = h.api.roster_calls();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.api.roster_calls(), calls);
}
