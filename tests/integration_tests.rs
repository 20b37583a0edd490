//! Integration tests for the mathrepair pipeline

use mathrepair::core::{degrees_to_radians, normalize_angles, score};
use mathrepair::{
    gather, normalize, select_best, solve_candidates, solve_question, validate, AngleUnit,
    Candidate, CandidatePool, Label, OcrResponse, PipelineOptions, StaticSource,
    ValidationFailure,
};

fn ask(question: &str) -> mathrepair::SolveResponse {
    solve_question(question, &[], &PipelineOptions::default())
}

fn ask_with(question: &str, labels: &[Label]) -> mathrepair::SolveResponse {
    solve_question(question, labels, &PipelineOptions::default())
}

// ============================================================================
// Candidate Selection
// ============================================================================

mod selection {
    use super::*;

    #[test]
    fn test_prefers_more_math_like_candidate() {
        let pool = vec![Candidate::new("12+3", "a"), Candidate::new("x=5", "b")];
        assert_eq!(select_best(&pool).unwrap().raw_text, "12+3");
    }

    #[test]
    fn test_selected_candidate_has_maximal_score() {
        let texts = ["7", "(1+2)*3", "1+1", "abc"];
        let pool: Vec<_> = texts.iter().map(|t| Candidate::new(*t, "m")).collect();
        let best = select_best(&pool).unwrap();
        assert!(pool.iter().all(|c| score(&c.raw_text) <= score(&best.raw_text)));
    }

    #[test]
    fn test_gathered_pool_solves() {
        let model = StaticSource::new("model", ["l2t3"]);
        let pool = gather(&[&model], &[]);
        match solve_candidates(&pool, &PipelineOptions::default()) {
            OcrResponse::Solved { result, error, .. } => {
                assert_eq!(error, None);
                assert_eq!(result.as_deref(), Some("15"));
            }
            other => panic!("expected a solved response, got {:?}", other),
        }
    }
}

// ============================================================================
// Normalization
// ============================================================================

mod normalization {
    use super::*;

    #[test]
    fn test_idempotent() {
        for raw in ["l2+3", "What is 6×7", "cos(60) + 1", "2O - I.", "x^2 = 4"] {
            let once = normalize(raw);
            let twice = normalize(once.as_str());
            assert_eq!(once, twice, "normalizing {:?} twice changed it", raw);
        }
    }

    #[test]
    fn test_output_alphabet() {
        let out = normalize("Ⅻ 2 ÷ 4 ≈ ☺ + x");
        assert!(out
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "+-*/^=(). ".contains(c)));
    }
}

// ============================================================================
// Validation
// ============================================================================

mod validation {
    use super::*;

    #[test]
    fn test_rejects_consecutive_operators() {
        assert_eq!(validate("2++3"), Err(ValidationFailure::ConsecutiveOperators));
        let response = ask("2++3");
        assert_eq!(
            response.error.as_deref(),
            Some("Invalid expression: Consecutive operators")
        );
        assert_eq!(response.result, None);
    }

    #[test]
    fn test_parentheses_balance() {
        assert_eq!(validate("(1+2"), Err(ValidationFailure::UnbalancedParentheses));
        assert_eq!(validate("(1+2)"), Ok(()));
        assert_eq!(ask("(1+2)").result.as_deref(), Some("3"));
    }

    #[test]
    fn test_empty_question() {
        assert_eq!(ask("").error.as_deref(), Some("No question provided"));
    }
}

// ============================================================================
// Angles
// ============================================================================

mod angles {
    use super::*;

    #[test]
    fn test_degree_rewrite() {
        assert_eq!(degrees_to_radians("sin(30)"), "sin((30)*pi/180)");
        assert_eq!(normalize_angles("sin(30)", AngleUnit::Radians), "sin(30)");
    }

    #[test]
    fn test_sine_of_thirty_degrees() {
        assert_eq!(ask("sin(30)").result.as_deref(), Some("0.5"));
    }
}

// ============================================================================
// End-to-End Questions
// ============================================================================

mod questions {
    use super::*;

    #[test]
    fn test_what_is() {
        let response = ask("What is 2+2?");
        assert_eq!(response.result.as_deref(), Some("4"));
        assert!(response.steps.unwrap().contains("2 + 2"));
    }

    #[test]
    fn test_linear_equation() {
        let response = ask("x+5=10");
        assert_eq!(response.result.as_deref(), Some("[5]"));
        assert_eq!(response.error, None);
    }

    #[test]
    fn test_quadratic_equation() {
        assert_eq!(ask("Solve x^2 - 4 = 0").result.as_deref(), Some("[-2, 2]"));
    }

    #[test]
    fn test_repeated_roots_are_reported_once() {
        assert_eq!(ask("(x-2)^4=0").result.as_deref(), Some("[2]"));
        assert_eq!(ask("x^3-3x^2+3x-1=0").result.as_deref(), Some("[1]"));
    }

    #[test]
    fn test_huge_power_stays_finite() {
        assert_eq!(ask("((x^32)^32)^2=1").result.as_deref(), Some("[-1, 1]"));
    }

    #[test]
    fn test_overlong_sum_is_a_parse_error() {
        let response = ask(&vec!["1"; 20_000].join("+"));
        assert!(response.error.unwrap().starts_with("Parsing error:"));
        assert_eq!(response.result, None);
    }

    #[test]
    fn test_labels_bind_variables() {
        let labels = [Label::with_value("a", 3.0), Label::with_value("b", 4.0)];
        let response = ask_with("a+b=10", &labels);
        assert_eq!(response.result.as_deref(), Some("[]"));
        assert!(response.steps.unwrap().contains("3+4=10"));
    }

    #[test]
    fn test_label_assignment_text() {
        let labels = [Label::assignment("r=2")];
        assert_eq!(ask_with("pi*r^2", &labels).result.as_deref(), Some("12.5663706144"));
    }

    #[test]
    fn test_invalid_labels_are_ignored() {
        let labels = [Label::assignment("x=abc")];
        let response = ask_with("x+5=10", &labels);
        assert_eq!(response.result.as_deref(), Some("[5]"));
    }

    #[test]
    fn test_unparseable_input() {
        let response = ask("f(2)+1");
        assert!(response.error.unwrap().starts_with("Parsing error:"));
    }
}

// ============================================================================
// Recognizer Candidates
// ============================================================================

mod candidates {
    use super::*;

    #[test]
    fn test_misread_candidate() {
        let pool = CandidatePool {
            primary: vec![Candidate::new("l2+3", "model")],
            fallback: None,
        };
        match solve_candidates(&pool, &PipelineOptions::default()) {
            OcrResponse::Solved {
                ocr_output,
                postprocessed,
                result,
                ..
            } => {
                assert_eq!(ocr_output, "l2+3");
                assert_eq!(postprocessed, "12+3");
                assert_eq!(result.as_deref(), Some("15"));
            }
            other => panic!("expected a solved response, got {:?}", other),
        }
    }

    #[test]
    fn test_response_json_shape() {
        let pool = CandidatePool {
            primary: vec![Candidate::new("hello", "model")],
            fallback: None,
        };
        let response = solve_candidates(&pool, &PipelineOptions::default());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["error"], "No math operator detected in OCR output.");
        assert_eq!(json["ocr_output"], "hello");
        assert!(json.get("result").is_none());
    }
}
