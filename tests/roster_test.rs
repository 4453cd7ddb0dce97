#![cfg(feature = "sqlite")]
//! Asset initialization, seeding and the top performer fallback.

mod common;

use common::*;
use sportstock::domain::asset::{AST, PTS, stat_map};
use sportstock::domain::game_log::TopPerformer;
use sportstock::domain::roster::{
    InitOutcome, fallback_top_performer, initialize_assets, seed_assets, top_performer,
};
use sportstock::domain::pricing::PricingEngine;
use sportstock::domain::simulation::simulate_game;
use sportstock::ports::store_port::AssetStore;

mod initialization {
    use super::*;

    #[tokio::test]
    async fn empty_store_is_filled_from_top_players() {
        let store = memory_store();
        let stats = MockStatsSource::new().with_players(vec![
            projection("1628983", "Shai Gilgeous-Alexander", 32.7),
            projection("203507", "Giannis Antetokounmpo", 30.4),
            projection("203999", "Nikola Jokic", 29.6),
        ]);

        let outcome = initialize_assets(&store, &stats, 50).await.unwrap();

        assert_eq!(
            outcome,
            InitOutcome::Initialized {
                inserted: 3,
                skipped: 0,
                used_fallback: false
            }
        );
        assert_eq!(outcome.message(), "Initialized 3 assets");

        let assets = store.list_assets().unwrap();
        assert_eq!(assets.len(), 3);
        let sga = assets.iter().find(|a| a.ticker == "S.GILG").unwrap();
        assert_eq!(sga.current_price, 65.4);
        assert_eq!(sga.player_id.as_deref(), Some("1628983"));
    }

    #[tokio::test]
    async fn limit_caps_the_roster() {
        let store = memory_store();
        let stats = MockStatsSource::new().with_players(vec![
            projection("1", "Alpha One", 30.0),
            projection("2", "Bravo Two", 29.0),
            projection("3", "Charlie Three", 28.0),
        ]);

        initialize_assets(&store, &stats, 2).await.unwrap();

        assert_eq!(store.count_assets().unwrap(), 2);
    }

    #[tokio::test]
    async fn populated_store_is_left_alone() {
        let store = memory_store();
        store.insert_asset(&lebron()).unwrap().unwrap();
        let stats =
            MockStatsSource::new().with_players(vec![projection("1", "Alpha One", 30.0)]);

        let outcome = initialize_assets(&store, &stats, 50).await.unwrap();

        assert_eq!(outcome, InitOutcome::AlreadyInitialized { existing: 1 });
        assert_eq!(outcome.message(), "Assets already exist");
        assert_eq!(store.count_assets().unwrap(), 1);
    }

    #[tokio::test]
    async fn unavailable_source_falls_back_to_default_roster() {
        let store = memory_store();
        let stats = MockStatsSource::new().with_players_unavailable("connection refused");

        let outcome = initialize_assets(&store, &stats, 50).await.unwrap();

        assert_eq!(
            outcome,
            InitOutcome::Initialized {
                inserted: 3,
                skipped: 0,
                used_fallback: true
            }
        );
        let mut tickers: Vec<_> = store
            .list_assets()
            .unwrap()
            .into_iter()
            .map(|a| a.ticker)
            .collect();
        tickers.sort();
        assert_eq!(tickers, vec!["LBJ", "LUKA", "SC30"]);
    }

    #[tokio::test]
    async fn colliding_tickers_are_skipped_and_counted() {
        let store = memory_store();
        let stats = MockStatsSource::new().with_players(vec![
            projection("1631114", "Jalen Williams", 21.0),
            projection("1631119", "Jaylin Williams", 5.0),
        ]);

        let outcome = initialize_assets(&store, &stats, 50).await.unwrap();

        assert_eq!(
            outcome,
            InitOutcome::Initialized {
                inserted: 1,
                skipped: 1,
                used_fallback: false
            }
        );
        let assets = store.list_assets().unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].name, "Jalen Williams");
    }
}

mod seeding {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[tokio::test]
    async fn reset_clears_assets_logs_and_history() {
        let store = memory_store();
        let old = store.insert_asset(&lebron()).unwrap().unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        simulate_game(
            &store,
            &PricingEngine::default(),
            &old.id,
            &mut rng,
            chrono::Utc::now(),
        )
        .unwrap();
        let stats =
            MockStatsSource::new().with_players(vec![projection("1", "Alpha One", 30.0)]);

        let outcome = seed_assets(&store, &stats, 50, true).await.unwrap();

        assert!(matches!(outcome, InitOutcome::Initialized { inserted: 1, .. }));
        assert!(store.get_asset(&old.id).unwrap().is_none());
        assert!(store.match_logs(&old.id).unwrap().is_empty());
        assert!(store.price_history(&old.id).unwrap().is_empty());
        assert_eq!(store.count_assets().unwrap(), 1);
    }

    #[tokio::test]
    async fn without_reset_new_players_are_added() {
        let store = memory_store();
        store.insert_asset(&lebron()).unwrap().unwrap();
        let stats =
            MockStatsSource::new().with_players(vec![projection("1", "Alpha One", 30.0)]);

        seed_assets(&store, &stats, 50, false).await.unwrap();

        assert_eq!(store.count_assets().unwrap(), 2);
    }
}

mod top_performer_lookup {
    use super::*;

    #[tokio::test]
    async fn upstream_leader_is_returned() {
        let leader = TopPerformer {
            player_id: "203999".into(),
            name: "Nikola Jokic".into(),
            stats: stat_map([(PTS, 41.0), (AST, 12.0)]),
        };
        let stats = MockStatsSource::new().with_top_performer(leader.clone());

        assert_eq!(top_performer(&stats).await, leader);
    }

    #[tokio::test]
    async fn unavailable_upstream_uses_fallback() {
        let stats = MockStatsSource::new().with_top_performer_unavailable("status 500");
        let performer = top_performer(&stats).await;

        assert_eq!(performer, fallback_top_performer());
        assert_eq!(performer.stats[PTS], 35.0);
        assert_eq!(performer.stats[AST], 9.0);
    }

    #[tokio::test]
    async fn empty_upstream_uses_fallback() {
        let performer = top_performer(&MockStatsSource::new()).await;
        assert_eq!(performer.name, "LeBron James");
    }
}
