//! Plain-text rendering for the terminal quiz.

use quiz_core::QuizState;
use quiz_core::model::{AnswerFeedback, Mastery, Question, QuizResults};
use quiz_core::time::format_duration;

const RECOMMENDATION_LIMIT: usize = 3;

pub fn question(state: &QuizState, question: &Question) {
    let progress = state.progress();
    println!();
    print!(
        "Question {} of {} ({}%)",
        state.current_question_index() + 1,
        progress.total,
        progress.percent()
    );
    if let Some(category) = question.category_name() {
        print!(" [{category}]");
    }
    println!();
    println!("{}", question.text);
    if let Some(code) = question.code.as_deref().filter(|c| !c.trim().is_empty()) {
        println!();
        for line in code.lines() {
            println!("    {line}");
        }
    }
    println!();
    for (n, option) in question.ordered_options().iter().enumerate() {
        println!("  {}) {}", n + 1, option.text);
    }
}

pub fn feedback(feedback: &AnswerFeedback) {
    if feedback.is_correct {
        println!("Correct! +{} points", feedback.points_earned);
    } else {
        match &feedback.correct_option {
            Some(option) => println!("Wrong. The right answer was: {}", option.text),
            None => println!("Wrong."),
        }
    }
    if !feedback.explanation.trim().is_empty() {
        println!("{}", feedback.explanation.trim());
    }
}

pub fn results(results: &QuizResults) {
    let session = &results.session;
    println!();
    println!("Score: {}%  ({})", results.rounded_score(), results.performance_level.label());
    println!(
        "Correct: {} / {}  Points: {}",
        session.correct_answers, session.total_questions, session.total_points
    );
    println!(
        "Time: {}  Average per question: {:.1}s",
        format_duration(session.time_spent),
        results.average_time
    );

    if results.category_breakdown.is_empty() {
        return;
    }
    println!();
    println!("By category:");
    for (category, stats) in &results.category_breakdown {
        println!(
            "  {category}: {}/{} ({:.0}%)",
            stats.correct, stats.total, stats.percentage
        );
    }

    let weak: Vec<_> = results
        .study_recommendations(RECOMMENDATION_LIMIT)
        .into_iter()
        .filter(|r| r.mastery != Mastery::Strong)
        .collect();
    if !weak.is_empty() {
        println!();
        println!("Worth reviewing:");
        for item in weak {
            println!("  {} ({:.0}%)", item.category, item.percentage);
        }
    }
}
