//! Evidence graph scoring: pairwise consistency edges, trust grade and trust score.
//!
//! Each edge blends two module scores and subtracts a penalty once they disagree
//! by more than a tolerance. Weights and thresholds are fixed.

use livegate_types::{EdgeKind, EvidenceGraphSummary, GraphEdge, ModuleScores, TrustGrade};

// ── Edge parameters ────────────────────────────────────────────────────

struct EdgeParams {
    /// Weight of the first module; the second gets `1 - weight`.
    weight: f64,
    /// Disagreement tolerated before the penalty applies.
    tolerance: f64,
    /// Penalty per point of disagreement beyond the tolerance.
    penalty: f64,
    threshold: f64,
}

const FACE_VOICE: EdgeParams = EdgeParams {
    weight: 0.55,
    tolerance: 30.0,
    penalty: 0.5,
    threshold: 70.0,
};

const FACE_TOUCH: EdgeParams = EdgeParams {
    weight: 0.6,
    tolerance: 35.0,
    penalty: 0.4,
    threshold: 65.0,
};

const VOICE_TOUCH: EdgeParams = EdgeParams {
    weight: 0.5,
    tolerance: 40.0,
    penalty: 0.3,
    threshold: 60.0,
};

/// Weight of the mean module score in the trust score; edges take the rest.
const MODULE_WEIGHT: f64 = 0.65;

fn params(kind: EdgeKind) -> &'static EdgeParams {
    match kind {
        EdgeKind::FaceVoice => &FACE_VOICE,
        EdgeKind::FaceTouch => &FACE_TOUCH,
        EdgeKind::VoiceTouch => &VOICE_TOUCH,
    }
}

/// Pass threshold of an edge.
pub fn edge_threshold(kind: EdgeKind) -> f64 {
    params(kind).threshold
}

// ── Scoring ────────────────────────────────────────────────────────────

/// Score of the edge between two module scores, clamped to [0, 100].
pub fn edge_score(kind: EdgeKind, x: f64, y: f64) -> f64 {
    let p = params(kind);
    let blended = p.weight * x + (1.0 - p.weight) * y;
    let excess = ((x - y).abs() - p.tolerance).max(0.0);
    (blended - excess * p.penalty).clamp(0.0, 100.0)
}

fn edge(kind: EdgeKind, scores: &ModuleScores) -> GraphEdge {
    let (x, y) = match kind {
        EdgeKind::FaceVoice => (scores.face, scores.voice),
        EdgeKind::FaceTouch => (scores.face, scores.touch),
        EdgeKind::VoiceTouch => (scores.voice, scores.touch),
    };
    let score = edge_score(kind, x, y);
    GraphEdge {
        kind,
        score,
        passed: score >= edge_threshold(kind),
    }
}

/// Grade from the edge pass pattern.
///
/// A when every edge passes, B when both face edges pass, C when one face edge
/// passes, D otherwise. The voice/touch edge alone never lifts a grade above D.
pub fn grade_for(face_voice: bool, face_touch: bool, voice_touch: bool) -> TrustGrade {
    match (face_voice, face_touch, voice_touch) {
        (true, true, true) => TrustGrade::A,
        (true, true, false) => TrustGrade::B,
        (true, false, _) | (false, true, _) => TrustGrade::C,
        (false, false, _) => TrustGrade::D,
    }
}

/// Build the graph summary for three module scores.
pub fn score_graph(scores: ModuleScores) -> EvidenceGraphSummary {
    let edges = EdgeKind::ALL.map(|kind| edge(kind, &scores));
    let grade = grade_for(edges[0].passed, edges[1].passed, edges[2].passed);
    let edge_mean = edges.iter().map(|e| e.score).sum::<f64>() / edges.len() as f64;
    let trust_score =
        (MODULE_WEIGHT * scores.mean() + (1.0 - MODULE_WEIGHT) * edge_mean).clamp(0.0, 100.0);
    EvidenceGraphSummary {
        edges,
        grade,
        trust_score,
        module_scores: scores,
    }
}

/// Grade after `skips` skipped modules.
///
/// No skips leaves the grade untouched. Otherwise each skip moves one step
/// toward D, but the result never goes below C: a run with skips is still
/// eligible for a credential.
pub fn demote(grade: TrustGrade, skips: u32) -> TrustGrade {
    if skips == 0 {
        return grade;
    }
    let demoted = grade.index().saturating_add(skips as usize);
    TrustGrade::from_index(demoted.min(TrustGrade::C.index()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(face: f64, voice: f64, touch: f64) -> ModuleScores {
        ModuleScores { face, voice, touch }
    }

    #[test]
    fn face_voice_edge_without_penalty() {
        let s = edge_score(EdgeKind::FaceVoice, 80.0, 60.0);
        assert!((s - (0.55 * 80.0 + 0.45 * 60.0)).abs() < 1e-9);
    }

    #[test]
    fn penalty_starts_past_tolerance() {
        // |90 - 20| = 70, 40 over tolerance, penalty 20.
        let s = edge_score(EdgeKind::FaceVoice, 90.0, 20.0);
        assert!((s - (0.55 * 90.0 + 0.45 * 20.0 - 20.0)).abs() < 1e-9);
        // |90 - 20| = 70, 35 over, penalty 14.
        let s = edge_score(EdgeKind::FaceTouch, 90.0, 20.0);
        assert!((s - (0.6 * 90.0 + 0.4 * 20.0 - 14.0)).abs() < 1e-9);
        // |90 - 20| = 70, 30 over, penalty 9.
        let s = edge_score(EdgeKind::VoiceTouch, 90.0, 20.0);
        assert!((s - (45.0 + 10.0 - 9.0)).abs() < 1e-9);
    }

    #[test]
    fn all_strong_scores_grade_a() {
        let summary = score_graph(scores(90.0, 90.0, 90.0));
        assert_eq!(summary.grade, TrustGrade::A);
        assert!((summary.trust_score - 90.0).abs() < 1e-9);
        assert!(summary.edges.iter().all(|e| e.passed));
    }

    #[test]
    fn inconsistent_scores_grade_d() {
        let summary = score_graph(scores(90.0, 20.0, 20.0));
        assert!(summary.edges.iter().all(|e| !e.passed));
        assert_eq!(summary.grade, TrustGrade::D);
    }

    #[test]
    fn face_only_run_grades_d_before_demotion() {
        let summary = score_graph(scores(85.0, 0.0, 0.0));
        assert_eq!(summary.grade, TrustGrade::D);
        assert_eq!(demote(summary.grade, 2), TrustGrade::C);
    }

    #[test]
    fn grade_mapping() {
        assert_eq!(grade_for(true, true, true), TrustGrade::A);
        assert_eq!(grade_for(true, true, false), TrustGrade::B);
        assert_eq!(grade_for(true, false, true), TrustGrade::C);
        assert_eq!(grade_for(false, true, false), TrustGrade::C);
        assert_eq!(grade_for(false, false, true), TrustGrade::D);
        assert_eq!(grade_for(false, false, false), TrustGrade::D);
    }

    #[test]
    fn demotion_steps_and_clamps() {
        assert_eq!(demote(TrustGrade::A, 0), TrustGrade::A);
        assert_eq!(demote(TrustGrade::D, 0), TrustGrade::D);
        assert_eq!(demote(TrustGrade::A, 1), TrustGrade::B);
        assert_eq!(demote(TrustGrade::A, 2), TrustGrade::C);
        assert_eq!(demote(TrustGrade::B, 2), TrustGrade::C);
        assert_eq!(demote(TrustGrade::D, 1), TrustGrade::C);
    }
}
