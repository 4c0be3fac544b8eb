use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use rand::Rng;

use gmat_core::testing::in_memory::{
    InMemoryAttemptRepo, InMemoryMasteryRepo, InMemoryQuestionRepo, InMemoryRatingRepo,
    InMemoryReviewRepo, InMemoryUserStateRepo,
};
use gmat_core::{
    AttemptInput, AttemptPipeline, Gate, GateEvaluator, Mode, PassingMode, ProgressionService,
    Question, QuestionRepo, QuestionSource, Requirement, ReviewScheduler, Selector,
    SelectionCriteria,
};

/// Drives the adaptive learning core's public surface end-to-end against the
/// in-memory reference repositories: one process, no database, no server.
#[derive(Parser)]
#[command(name = "gmat")]
#[command(about = "Demo driver for the GMAT adaptive learning core", long_about = None)]
struct Cli {
    /// Learner id to simulate
    #[arg(short, long, default_value = "demo-user")]
    user_id: String,

    /// Number of practice rounds to simulate
    #[arg(short, long, default_value_t = 8)]
    rounds: usize,

    /// Serving mode for the simulated session: build, prove, review, diagnostic
    #[arg(short, long, default_value = "build")]
    mode: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).compact().init();

    let cli = Cli::parse();
    let mode = parse_mode(&cli.mode)?;

    let question_repo = Arc::new(InMemoryQuestionRepo::new(seed_questions()));
    let rating_repo = Arc::new(InMemoryRatingRepo::new());
    let attempt_repo = Arc::new(InMemoryAttemptRepo::new());
    let mastery_repo = Arc::new(InMemoryMasteryRepo::new());
    let review_repo = Arc::new(InMemoryReviewRepo::new());
    let user_state_repo = Arc::new(InMemoryUserStateRepo::new(seed_gates()));

    let selector = Selector::new(
        question_repo.clone(),
        rating_repo.clone(),
        mastery_repo.clone(),
        review_repo.clone(),
    );
    let pipeline = AttemptPipeline::new(
        question_repo.clone(),
        rating_repo.clone(),
        attempt_repo.clone(),
        mastery_repo.clone(),
        review_repo.clone(),
        user_state_repo.clone(),
    );
    let review_scheduler = ReviewScheduler::new(review_repo.clone());
    let progression_service = ProgressionService::new(user_state_repo.clone());
    let gate_evaluator = GateEvaluator::new(
        mastery_repo.clone(),
        attempt_repo.clone(),
        user_state_repo.clone(),
    );

    println!(
        "{}",
        format!(
            "simulating {} round(s) for '{}' in {} mode",
            cli.rounds,
            cli.user_id,
            mode.as_str()
        )
        .bold()
    );

    let mut rng = rand::thread_rng();
    let mut served: HashSet<String> = HashSet::new();

    for round in 1..=cli.rounds {
        let mut criteria = SelectionCriteria::new(cli.user_id.clone(), mode, 1);
        criteria.exclude_ids = served.clone();

        let mut picks = selector
            .select_questions(&criteria, &mut rng)
            .await
            .context("selecting next question")?;
        let Some(pick) = picks.pop() else {
            println!("  round {round}: no more candidate questions, stopping early");
            break;
        };
        served.insert(pick.question_id.clone());

        let question = question_repo.get_question(&pick.question_id).await?;
        let answers_correctly = rng.gen_bool(0.65);
        let answered_choice = if answers_correctly {
            question.correct_answer.clone()
        } else {
            "Z".to_string()
        };

        let result = pipeline
            .submit_attempt(AttemptInput {
                user_id: cli.user_id.clone(),
                question_id: pick.question_id.clone(),
                answered_choice,
                time_spent_sec: question.time_budget_sec * rng.gen_range(0.5..1.2),
                was_guessed: false,
                mode,
            })
            .await
            .context("submitting attempt")?;

        let verdict = if result.is_correct {
            "correct".green()
        } else {
            "incorrect".red()
        };
        println!(
            "  round {round}: {verdict} via {:?}, outcome={:?}, xp=+{}{}",
            pick.reason,
            result.outcome_type,
            result.xp_awarded,
            result
                .new_level
                .map(|l| format!(", leveled up to {l}"))
                .unwrap_or_default(),
        );
        for gate in &result.passed_gates {
            println!("    gate passed: {} (+{} xp)", gate.gate_id, gate.xp_awarded);
        }
    }

    let today = chrono::Utc::now().date_naive();
    let due = review_scheduler
        .due_reviews_on(&cli.user_id, 10, today)
        .await?;
    println!("\n{}", "due reviews:".bold());
    if due.is_empty() {
        println!("  (none)");
    }
    for item in &due {
        println!("  {} next due {}", item.item_id, item.next_review_date);
    }

    println!("\n{}", "gate status:".bold());
    for gate in seed_gates() {
        let result = gate_evaluator.evaluate_gate(&cli.user_id, &gate.id).await?;
        println!(
            "  {} [{:?}] {:.0}%",
            gate.name, result.status, result.percent_complete
        );
    }

    let progression = progression_service
        .user_progression(&cli.user_id)
        .await
        .context("fetching user progression")?;
    println!(
        "\n{} is level {} ({}), {} total xp",
        cli.user_id,
        progression.current_level,
        gmat_core::level_name(progression.current_level),
        progression.total_xp
    );

    Ok(())
}

fn parse_mode(s: &str) -> Result<Mode> {
    match s {
        "build" => Ok(Mode::Build),
        "prove" => Ok(Mode::Prove),
        "review" => Ok(Mode::Review),
        "diagnostic" => Ok(Mode::Diagnostic),
        other => anyhow::bail!("unknown mode '{other}', expected build|prove|review|diagnostic"),
    }
}

/// A small synthetic question bank spanning both GMAT sections at a spread
/// of difficulties, enough for the selector's band expansion and bucketing
/// to have real work to do.
fn seed_questions() -> Vec<Question> {
    let specs: &[(&str, &str, &str, &str, i32, &str)] = &[
        ("q-alg-1", "quant", "algebra", "ps", 450, "algebra-linear-eq"),
        ("q-alg-2", "quant", "algebra", "ps", 520, "algebra-linear-eq"),
        ("q-alg-3", "quant", "algebra", "ds", 610, "algebra-quadratics"),
        ("q-alg-4", "quant", "algebra", "ds", 700, "algebra-quadratics"),
        ("q-geo-1", "quant", "geometry", "ps", 480, "geometry-circles"),
        ("q-geo-2", "quant", "geometry", "ps", 590, "geometry-triangles"),
        ("q-geo-3", "quant", "geometry", "ds", 680, "geometry-triangles"),
        ("q-cr-1", "verbal", "critical-reasoning", "cr", 470, "cr-assumption"),
        ("q-cr-2", "verbal", "critical-reasoning", "cr", 560, "cr-weaken"),
        ("q-cr-3", "verbal", "critical-reasoning", "cr", 650, "cr-weaken"),
        ("q-rc-1", "verbal", "reading-comprehension", "rc", 500, "rc-inference"),
        ("q-rc-2", "verbal", "reading-comprehension", "rc", 630, "rc-inference"),
    ];

    specs
        .iter()
        .map(|&(id, section, topic, qtype, difficulty, atom)| Question {
            id: id.to_string(),
            section_code: section.to_string(),
            topic_code: topic.to_string(),
            question_type_code: qtype.to_string(),
            difficulty_rating: difficulty,
            times_served: 0,
            quality_score: None,
            is_verified: true,
            source: QuestionSource::Seeded,
            atoms: [atom.to_string()].into_iter().collect(),
            correct_answer: "A".to_string(),
            time_budget_sec: 120.0,
        })
        .collect()
}

/// One authored gate (beyond the default per-atom mastery gates the
/// pipeline synthesizes on its own) so `gate_status` has something to
/// demonstrate `evaluate_gate`/`gate_summary` against.
fn seed_gates() -> Vec<Gate> {
    vec![Gate {
        id: "algebra-foundations".to_string(),
        name: "Algebra Foundations".to_string(),
        description: "Broad competence across the algebra atoms".to_string(),
        requirements: vec![
            Requirement::Accuracy {
                threshold: 0.70,
                min_attempts: 3,
                window_size: None,
                atom_ids: Some(vec![
                    "algebra-linear-eq".to_string(),
                    "algebra-quadratics".to_string(),
                ]),
                description: "Accuracy at least 70% across algebra atoms".to_string(),
            },
            Requirement::Volume {
                threshold: 5,
                correct_only: false,
                description: "At least 5 attempts".to_string(),
            },
        ],
        atom_ids: Some(vec![
            "algebra-linear-eq".to_string(),
            "algebra-quadratics".to_string(),
        ]),
        passing_mode: PassingMode::All,
        weighted_threshold: None,
        xp_reward: 250,
    }]
}
