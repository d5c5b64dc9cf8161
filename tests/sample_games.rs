use fenmaker::annotate::{tokenize, Dialect};
use fenmaker::record::GameRecord;
use fenmaker::{build_game, uci, Game, ReplayConfig};
use pretty_assertions::assert_eq;
use std::time::Duration;

fn load(name: &str) -> GameRecord {
    let path = format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"));
    let text = std::fs::read_to_string(&path).expect("read sample game");
    GameRecord::parse(&text)
}

fn game(name: &str) -> Game {
    let rec = load(name);
    build_game(&rec.start_fen(), &rec.movetext, &ReplayConfig::default()).expect("sample game replays")
}

#[test]
fn every_token_becomes_one_ply() {
    for name in ["full_a.pgn", "full_b.pgn", "compact.pgn"] {
        let rec = load(name);
        let tokens = tokenize(&rec.movetext).expect("tokenize");
        let g = game(name);
        assert_eq!(tokens.len(), g.len(), "{name}");
        for (i, (t, p)) in tokens.iter().zip(&g.plies).enumerate() {
            assert_eq!(p.index, i);
            assert_eq!(t.san, p.san);
        }
    }
}

#[test]
fn full_dialect_game_searches_every_ply() {
    let g = game("full_a.pgn");
    assert_eq!(g.len(), 57);
    assert!(g.plies.iter().all(|p| p.dialect == Dialect::Full));
    // 7. O-O-O for white
    assert_eq!(g.plies[12].san, "O-O-O");
    assert_eq!(g.plies[12].uci, "e1c1");

    let cmds = uci::emit(&g);
    assert_eq!(cmds.searches.len(), 57);
    assert_eq!(cmds.replay.moves.len(), 57);
    for s in &cmds.searches {
        assert_eq!(s.moves.len(), s.ply + 1);
        assert_eq!(&s.moves[..], &cmds.replay.moves[..=s.ply]);
    }
    assert_eq!(cmds.searches[0].nodes, 520610);
    assert_eq!(cmds.searches[56].nodes, 110949);
    assert_eq!(cmds.render_search_script().lines().count(), 2 * 57);
}

#[test]
fn wrapped_final_group_is_kept() {
    let g = game("full_b.pgn");
    assert_eq!(g.len(), 62);
    let last = g.plies.last().expect("last ply");
    assert_eq!(last.san, "Ke5");
    assert_eq!(last.number, 31);
    assert_eq!(last.nodes(), Some(300128));
    assert_eq!(uci::emit(&g).searches.len(), 62);
}

#[test]
fn compact_dialect_game_only_replays() {
    let g = game("compact.pgn");
    assert_eq!(g.len(), 51);
    assert!(g.plies.iter().all(|p| p.dialect == Dialect::Compact && p.nodes().is_none()));
    assert_eq!(g.plies[0].depth().map(|d| d.depth), Some(8));
    assert_eq!(g.plies[0].stats.as_ref().map(|s| s.elapsed), Some(Duration::from_millis(400)));
    // 7... O-O and 9. O-O-O
    assert_eq!(g.plies[13].uci, "e8g8");
    assert_eq!(g.plies[16].uci, "e1c1");

    let cmds = uci::emit(&g);
    assert!(cmds.searches.is_empty());
    assert_eq!(cmds.replay.moves.len(), 51);
    assert_eq!(cmds.replay.moves[0], "e2e4");
}

#[test]
fn pipeline_is_deterministic() {
    for name in ["full_a.pgn", "full_b.pgn", "compact.pgn"] {
        let first = uci::emit(&game(name)).render(true, true);
        let second = uci::emit(&game(name)).render(true, true);
        assert_eq!(first, second, "{name}");
    }
}

#[test]
fn emitted_scripts_replay_legally() {
    for name in ["full_a.pgn", "full_b.pgn", "compact.pgn"] {
        let cmds = uci::emit(&game(name));
        let checked = uci::verify_script(&cmds.render(true, true)).expect("script replays");
        assert_eq!(checked, 1 + cmds.searches.len(), "{name}");
    }
}
