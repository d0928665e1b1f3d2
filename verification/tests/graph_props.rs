//! Property tests for edge scoring, grading and demotion.

use livegate_types::{EdgeKind, ModuleScores, TrustGrade};
use livegate_verification::{demote, edge_score, edge_threshold, grade_for, score_graph};
use proptest::prelude::*;

fn grade() -> impl Strategy<Value = TrustGrade> {
    prop::sample::select(TrustGrade::ALL.to_vec())
}

proptest! {
    #[test]
    fn close_scores_blend_without_penalty(a in 0.0f64..=100.0, d in -30.0f64..=30.0) {
        let b = (a + d).clamp(0.0, 100.0);
        let s = edge_score(EdgeKind::FaceVoice, a, b);
        prop_assert!((s - (0.55 * a + 0.45 * b)).abs() < 1e-9);
    }

    #[test]
    fn edges_stay_in_range(a in 0.0f64..=100.0, b in 0.0f64..=100.0, c in 0.0f64..=100.0) {
        let summary = score_graph(ModuleScores { face: a, voice: b, touch: c });
        for edge in &summary.edges {
            prop_assert!((0.0..=100.0).contains(&edge.score));
            prop_assert_eq!(edge.passed, edge.score >= edge_threshold(edge.kind));
        }
        prop_assert!((0.0..=100.0).contains(&summary.trust_score));
    }

    #[test]
    fn grade_follows_edge_pattern(a in 0.0f64..=100.0, b in 0.0f64..=100.0, c in 0.0f64..=100.0) {
        let summary = score_graph(ModuleScores { face: a, voice: b, touch: c });
        let expected = grade_for(
            summary.edge(EdgeKind::FaceVoice).passed,
            summary.edge(EdgeKind::FaceTouch).passed,
            summary.edge(EdgeKind::VoiceTouch).passed,
        );
        prop_assert_eq!(summary.grade, expected);
    }

    #[test]
    fn no_skips_keep_the_grade(g in grade()) {
        prop_assert_eq!(demote(g, 0), g);
    }

    #[test]
    fn skips_never_reach_d(g in grade(), skips in 1u32..10) {
        prop_assert_ne!(demote(g, skips), TrustGrade::D);
        prop_assert!(demote(g, skips) >= g.min(TrustGrade::C));
    }

    #[test]
    fn one_skip_moves_one_step(g in prop::sample::select(vec![TrustGrade::A, TrustGrade::B])) {
        prop_assert_eq!(demote(g, 1).index(), g.index() + 1);
    }
}

#[test]
fn scenario_consistent_human() {
    let summary = score_graph(ModuleScores { face: 90.0, voice: 90.0, touch: 90.0 });
    assert_eq!(summary.grade, TrustGrade::A);
    assert!((summary.trust_score - 90.0).abs() < 1e-6);
}

#[test]
fn scenario_inconsistent_evidence() {
    let summary = score_graph(ModuleScores { face: 90.0, voice: 20.0, touch: 20.0 });
    assert!(summary.edges.iter().all(|e| !e.passed));
    assert_eq!(summary.grade, TrustGrade::D);
    assert_eq!(demote(summary.grade, 0), TrustGrade::D);
}

#[test]
fn scenario_face_only() {
    let summary = score_graph(ModuleScores { face: 85.0, voice: 0.0, touch: 0.0 });
    assert_eq!(summary.grade, TrustGrade::D);
    assert_eq!(demote(summary.grade, 2), TrustGrade::C);
}
