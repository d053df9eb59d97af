//! Interactive question loop on stdin/stdout.

use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};

use log::warn;
use quiz_core::SessionPhase;
use quiz_core::model::OptionId;
use quiz_core::time::{Clock, QuestionTimer};
use services::{QuizError, QuizSessionService};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::render;

type StdinLines = Lines<BufReader<Stdin>>;

/// One line typed at the question prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Quit,
    Skip,
    /// Zero-based index into the displayed options.
    Pick(usize),
    Invalid,
}

fn parse_input(line: &str, option_count: usize) -> Input {
    let line = line.trim();
    if line.eq_ignore_ascii_case("q") {
        return Input::Quit;
    }
    if line.eq_ignore_ascii_case("s") {
        return Input::Skip;
    }
    match line.parse::<usize>() {
        Ok(n) if (1..=option_count).contains(&n) => Input::Pick(n - 1),
        _ => Input::Invalid,
    }
}

/// Play the active session until it completes or the user quits with `q`.
pub async fn run(
    quiz: &mut QuizSessionService,
    logged_out: &AtomicBool,
) -> Result<(), Box<dyn Error>> {
    let clock = Clock::default();
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut timer = QuestionTimer::start(&clock);

    loop {
        match quiz.phase() {
            SessionPhase::Idle => return Ok(()),
            SessionPhase::AwaitingFeedback => {
                if let Some(feedback) = quiz.state().feedback_data() {
                    render::feedback(feedback);
                }
                if !quiz.state().is_last_question() {
                    println!("Press Enter for the next question.");
                    if prompt(&mut input).await?.is_none() {
                        return saved();
                    }
                }
                quiz.next_question().await;
                timer.restart(&clock);
            }
            SessionPhase::Complete => return finish(quiz, logged_out).await,
            SessionPhase::InProgress => {
                // A restored session may sit on a question that was already answered.
                if quiz.state().current_answered() {
                    quiz.next_question().await;
                    continue;
                }
                let Some(question) = quiz.state().current_question().cloned() else {
                    return Ok(());
                };
                render::question(quiz.state(), &question);
                let options = question.ordered_options();
                if options.is_empty() {
                    println!("This question has no options. Press s to skip, or q to save and quit.");
                } else {
                    println!("Answer with a number, s to skip, or q to save and quit.");
                }

                let Some(line) = prompt(&mut input).await? else {
                    return saved();
                };
                let option_id: OptionId = match parse_input(&line, options.len()) {
                    Input::Quit => return saved(),
                    Input::Skip => {
                        quiz.next_question().await;
                        timer.restart(&clock);
                        continue;
                    }
                    Input::Pick(index) => options[index].id.clone(),
                    Input::Invalid if options.is_empty() => continue,
                    Input::Invalid => {
                        println!("Pick a number between 1 and {}.", options.len());
                        continue;
                    }
                };

                let elapsed = timer.elapsed_secs(&clock);
                if let Err(err) = quiz.submit_answer(option_id, elapsed).await {
                    if err.is_unauthorized() || logged_out.load(Ordering::SeqCst) {
                        return Err(on_failure(quiz, logged_out, err).await);
                    }
                    println!("{err}. Try again.");
                    quiz.dismiss_error().await;
                }
            }
        }
    }
}

async fn finish(
    quiz: &mut QuizSessionService,
    logged_out: &AtomicBool,
) -> Result<(), Box<dyn Error>> {
    let Some(token) = quiz.state().session_token().cloned() else {
        return Ok(());
    };
    let total_time = quiz.state().total_time_spent();

    if let Err(err) = quiz.complete_quiz(total_time).await {
        return Err(on_failure(quiz, logged_out, err).await);
    }
    match quiz.results(&token).await {
        Ok(results) => render::results(&results),
        Err(err) => return Err(on_failure(quiz, logged_out, err).await),
    }
    println!();
    println!("Session: {token}");
    quiz.reset().await;
    Ok(())
}

/// Turn a failed request into the process error.
///
/// A rejected token drops the local session, since the backend will not
/// accept further answers for it.
pub async fn on_failure(
    quiz: &mut QuizSessionService,
    logged_out: &AtomicBool,
    err: QuizError,
) -> Box<dyn Error> {
    if err.is_unauthorized() || logged_out.load(Ordering::SeqCst) {
        warn!("session expired; clearing local quiz");
        quiz.reset().await;
    }
    err.into()
}

async fn prompt(input: &mut StdinLines) -> std::io::Result<Option<String>> {
    input.next_line().await
}

fn saved() -> Result<(), Box<dyn Error>> {
    println!("Progress saved. Continue later with `quiz resume`.");
    Ok(())
}
