/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use chessie::{Color, Game, Move, Square};
use patzer::{
    select_move, value_hanging, wants_stalemate, BackgroundTask, Evaluator, PieceValueTable,
    Rules, Score, SelectorConfig, TaskError, BLACK_BOOK, WHITE_BOOK,
};
use rand::{rngs::StdRng, SeedableRng};

const TABLE: PieceValueTable = PieceValueTable::STANDARD;

/// Positions past the first move, so that every selection is scored.
const MIDGAME_FENS: [&str; 5] = [
    "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
    "r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/3P1N2/PPP2PPP/RNBQK2R w KQkq - 1 5",
    "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2",
    "4k3/8/8/3n4/4P3/8/8/4K3 w - - 0 40",
    "8/8/4k3/8/2K5/8/3Q4/8 b - - 3 51",
];

fn game(fen: &str) -> Game {
    fen.parse().unwrap()
}

fn find_move(game: &Game, from: Square, to: Square) -> Move {
    game.get_legal_moves()
        .into_iter()
        .find(|mv| mv.from() == from && mv.to() == to)
        .unwrap_or_else(|| panic!("no move {from}{to} in {}", game.to_fen()))
}

#[test]
fn no_legal_moves_yields_no_selection() {
    for fen in [
        // Fool's mate
        "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
        // Stalemate
        "k7/8/KQ6/8/8/8/8/8 b - - 0 1",
    ] {
        let selection = select_move(
            &game(fen),
            &SelectorConfig::default(),
            &mut StdRng::seed_from_u64(1),
        );
        assert!(selection.bestmove.is_none(), "{fen}");
        assert!(selection.scored.is_empty(), "{fen}");
    }
}

#[test]
fn first_moves_come_from_the_book() {
    let white = Game::default();
    for seed in 0..16 {
        let mv = select_move(
            &white,
            &SelectorConfig::default(),
            &mut StdRng::seed_from_u64(seed),
        )
        .bestmove
        .unwrap();
        assert!(WHITE_BOOK
            .iter()
            .any(|san| white.parse_san(san).unwrap() == mv));

        let black = white.with_move_made(mv);
        let reply = select_move(
            &black,
            &SelectorConfig::default(),
            &mut StdRng::seed_from_u64(seed),
        )
        .bestmove
        .unwrap();
        assert!(BLACK_BOOK
            .iter()
            .filter_map(|san| black.parse_san(san).ok())
            .any(|book| book == reply));
    }
}

#[test]
fn selected_moves_are_legal() {
    for fen in MIDGAME_FENS {
        let game = game(fen);
        let legal: Vec<Move> = game.get_legal_moves().into_iter().collect();

        for seed in 0..8 {
            let mv = select_move(
                &game,
                &SelectorConfig::default(),
                &mut StdRng::seed_from_u64(seed),
            )
            .bestmove
            .unwrap();

            assert!(legal.contains(&mv), "{mv} is illegal in {fen}");
            assert_eq!(Move::from_uci(&game, &mv.to_string()).unwrap(), mv);

            // Applying it must leave a position the rules engine can continue from
            let after = game.with_move_made(mv);
            assert_eq!(after.side_to_move(), game.side_to_move().opponent());
        }
    }
}

#[test]
fn scoring_is_deterministic() {
    for fen in MIDGAME_FENS {
        let game = game(fen);
        let evaluator = Evaluator::new(&game, &TABLE);

        for mv in game.get_legal_moves() {
            let first = evaluator.score_move(mv);
            assert_eq!(first, evaluator.score_move(mv), "{mv} in {fen}");
            assert_eq!(first, evaluator.breakdown(mv).total(), "{mv} in {fen}");
        }
    }
}

#[test]
fn same_seed_same_selection() {
    for fen in MIDGAME_FENS {
        let game = game(fen);
        let pick = |seed| {
            select_move(
                &game,
                &SelectorConfig::default(),
                &mut StdRng::seed_from_u64(seed),
            )
        };

        assert_eq!(pick(99), pick(99), "{fen}");
    }
}

#[test]
fn winning_captures_score_positively_when_defended_or_not() {
    for fen in [
        // Knight on d5 is defended by the c6 pawn
        "4k3/8/2p5/3n4/4P3/8/8/4K3 w - - 0 2",
        // Knight on d5 is loose
        "4k3/8/8/3n4/4P3/8/8/4K3 w - - 0 2",
    ] {
        let game = game(fen);
        let mv = find_move(&game, Square::E4, Square::D5);
        let capture = Evaluator::new(&game, &TABLE).breakdown(mv).capture;
        assert_eq!(capture, Score::from(2), "{fen}");
    }

    // Rook takes a defended Queen
    let game = game("3qk3/4p3/8/8/8/8/8/3RK3 w - - 0 2");
    let mv = find_move(&game, Square::D1, Square::D8);
    let capture = Evaluator::new(&game, &TABLE).breakdown(mv).capture;
    assert_eq!(capture, Score::from(5));
}

#[test]
fn losing_a_defender_never_reduces_hanging_material() {
    for (defended, undefended, color) in [
        // The e3 pawn guards the d4 knight from the e6 knight
        (
            "4k3/8/4n3/8/3N4/4P3/8/4K3 w - - 0 1",
            "4k3/8/4n3/8/3N4/8/8/4K3 w - - 0 1",
            Color::White,
        ),
        // The d6 pawn guards the e5 pawn from the e1 rook
        (
            "4k3/8/3p4/4p3/8/8/8/4RK2 w - - 0 1",
            "4k3/8/8/4p3/8/8/8/4RK2 w - - 0 1",
            Color::Black,
        ),
    ] {
        let before = value_hanging(&game(defended), color, &TABLE);
        let after = value_hanging(&game(undefended), color, &TABLE);
        assert_eq!(before, 0, "{defended}");
        assert!(after >= before, "{undefended}");
        assert!(after > 0, "{undefended}");
    }
}

#[test]
fn stalemate_wanted_exactly_without_heavy_material() {
    // Each piece gets its own square on the third rank, none of which attack the Black King on a8
    let pieces = [('N', 0), ('B', 2), ('R', 3), ('Q', 4), ('P', 5)];

    for mask in 0u8..(1 << pieces.len()) {
        let mut rank = ['1'; 8];
        let mut heavy = false;
        for (i, &(piece, file)) in pieces.iter().enumerate() {
            if mask & (1 << i) != 0 {
                rank[file] = piece;
                heavy |= matches!(piece, 'R' | 'Q' | 'P');
            }
        }

        let fen = format!("k7/8/8/8/8/{}/8/7K w - - 0 30", compress(&rank));
        let game = game(&fen);

        assert_eq!(wants_stalemate(&game, Color::White), !heavy, "{fen}");
        assert!(wants_stalemate(&game, Color::Black), "{fen}");
    }
}

/// Collapses runs of empty squares (written `1`) into a single FEN digit.
fn compress(rank: &[char; 8]) -> String {
    let mut out = String::new();
    let mut empty = 0;
    for &c in rank {
        if c == '1' {
            empty += 1;
        } else {
            if empty > 0 {
                out.push_str(&empty.to_string());
                empty = 0;
            }
            out.push(c);
        }
    }
    if empty > 0 {
        out.push_str(&empty.to_string());
    }
    out
}

#[test]
fn mate_in_one_is_found() {
    let game = game("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 2");
    let mate = find_move(&game, Square::A1, Square::A8);

    for seed in 0..8 {
        let selection = select_move(
            &game,
            &SelectorConfig::default(),
            &mut StdRng::seed_from_u64(seed),
        );
        assert_eq!(selection.bestmove, Some(mate));

        let ranked = selection.ranked();
        assert_eq!(ranked[0].mv, mate);
        assert!(ranked[0].score - ranked[1].score > Score::from(4900));
    }
}

#[test]
fn selection_in_the_background() {
    let game = game("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 2");
    let mut task = BackgroundTask::spawn(move || {
        select_move(
            &game,
            &SelectorConfig::default(),
            &mut StdRng::seed_from_u64(3),
        )
    });

    while !task.is_done() {
        std::thread::yield_now();
    }

    let selection = task.result().unwrap();
    assert_eq!(
        selection.bestmove.map(|mv| mv.to_string()),
        Some(String::from("a1a8"))
    );
    assert_eq!(task.result(), Err(TaskError::AlreadyTaken));
}
