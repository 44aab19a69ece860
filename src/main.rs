use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::Duration;

use medquiz::app_state::AppState;
use medquiz::config::Config;
use medquiz::errors::{AppError, AppResult};
use medquiz::models::Question;
use medquiz::repositories::{
    export_questions, load_pool, FileQuestionSource, FileStore, InMemoryStore, KeyValueStore,
    QuestionSource,
};
use medquiz::services::time_helpers::{format_duration, format_time};
use medquiz::services::{grading, selection, QuizEvent, QuizRunner, RunnerStatus};

/// Stdin lines and countdown ticks arrive through one channel, so session
/// state only ever sees one event at a time.
enum InputEvent {
    Line(String),
    Tick,
}

#[tokio::main]
async fn main() -> AppResult<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    log::info!("Starting medquiz with data dir {}", config.data_dir.display());

    let store: Arc<dyn KeyValueStore> = match FileStore::new(&config.data_dir) {
        Ok(store) => Arc::new(store),
        Err(err) => {
            log::warn!("Data dir unavailable ({}), progress will not persist", err);
            Arc::new(InMemoryStore::new())
        }
    };
    let source = FileQuestionSource::new(&config.questions_file);
    let app = AppState::new(config, store);

    let mut pool = load_pool(&source);
    if pool.is_empty() {
        println!("Could not load the default question bank; upload one with `load <path>`.");
    }

    let (tx, mut rx) = mpsc::channel::<InputEvent>(32);
    let stdin_tx = tx.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if stdin_tx.send(InputEvent::Line(line)).await.is_err() {
                break;
            }
        }
    });

    println!("medquiz - type `help` for commands");
    loop {
        let Some(line) = next_line(&mut rx).await else {
            break;
        };
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("help") => print_menu_help(),
            Some("start") => {
                let start = parts.next().and_then(|s| s.parse().ok()).unwrap_or(1);
                let count = parts
                    .next()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10usize);
                let settings = medquiz::models::QuizSettings {
                    start_question_number: start,
                    number_of_questions: count,
                    available_questions: pool.len(),
                };
                match QuizRunner::start(&app, &pool, settings) {
                    Ok(runner) => run_quiz(&app, runner, &tx, &mut rx).await?,
                    Err(AppError::ValidationError(message)) => println!("{}", message),
                    Err(err) => return Err(err),
                }
            }
            Some("continue") => match app.saved_quizzes.get()? {
                Some(saved) => {
                    let runner = QuizRunner::resume(&app, saved);
                    run_quiz(&app, runner, &tx, &mut rx).await?;
                }
                // Nothing to resume is not an error.
                None => println!("No saved quiz found."),
            },
            Some("discard") => {
                app.saved_quizzes.clear()?;
                println!("Saved quiz discarded.");
            }
            Some("load") => match parts.next() {
                Some(path) => match load_uploaded(&source, path) {
                    Ok(uploaded) => {
                        println!("Loaded {} questions from {}.", uploaded.len(), path);
                        pool = uploaded;
                    }
                    // Prior pool stays untouched on a bad file.
                    Err(err) => println!("{}", err),
                },
                None => println!("Usage: load <path>"),
            },
            Some("reset") => {
                pool = load_pool(&source);
                println!("Reloaded {} default questions.", pool.len());
            }
            Some("export") => match parts.next() {
                Some(path) => {
                    let bytes = export_questions(&pool)?;
                    std::fs::write(path, bytes)?;
                    println!("Exported {} questions to {}.", pool.len(), path);
                }
                None => println!("Usage: export <path>"),
            },
            Some("stats") => print_statistics(&app)?,
            Some("bookmarks") => print_bookmarks(&app, &pool)?,
            Some("clearmarks") => {
                app.bookmarks.clear()?;
                println!("All bookmarks removed.");
            }
            Some("quit") => break,
            Some(other) => println!("Unknown command `{}`, try `help`.", other),
            None => {}
        }
        if !pool.is_empty() {
            println!(
                "Pool: {} questions (numbers {}..{}).",
                pool.len(),
                selection::min_question_number(&pool),
                selection::max_question_number(&pool)
            );
        }
    }

    Ok(())
}

async fn next_line(rx: &mut mpsc::Receiver<InputEvent>) -> Option<String> {
    loop {
        match rx.recv().await? {
            InputEvent::Line(line) => return Some(line),
            // Stray ticks from an aborted countdown are dropped here.
            InputEvent::Tick => continue,
        }
    }
}

/// Plays a session to its end, then loops through the results menu; a
/// retest starts the next session in place.
async fn run_quiz(
    app: &AppState,
    runner: QuizRunner,
    tx: &mpsc::Sender<InputEvent>,
    rx: &mut mpsc::Receiver<InputEvent>,
) -> AppResult<()> {
    let mut current = runner;
    loop {
        let finished = drive(&mut current, tx, rx).await?;
        if !finished {
            return Ok(());
        }

        print_results(&current);
        match results_loop(app, &current, rx).await? {
            Some(retest) => current = retest,
            None => return Ok(()),
        }
    }
}

/// Drives one session until it finishes or the user bails to the menu.
/// Returns `true` when the session finished.
async fn drive(
    runner: &mut QuizRunner,
    tx: &mpsc::Sender<InputEvent>,
    rx: &mut mpsc::Receiver<InputEvent>,
) -> AppResult<bool> {
    let tick_tx = tx.clone();
    let ticker = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.tick().await;
        loop {
            interval.tick().await;
            if tick_tx.send(InputEvent::Tick).await.is_err() {
                break;
            }
        }
    });

    print_question(runner);
    while runner.status() == RunnerStatus::InProgress {
        let Some(event) = rx.recv().await else { break };
        match event {
            InputEvent::Tick => {
                runner.handle_event(QuizEvent::Tick)?;
            }
            InputEvent::Line(line) => {
                let line = line.trim().to_string();
                match line.as_str() {
                    "help" => print_quiz_help(),
                    "check" | "c" => {
                        runner.handle_event(QuizEvent::CheckAnswer)?;
                        print_verdict(runner);
                    }
                    "next" | "n" => {
                        runner.handle_event(QuizEvent::NextQuestion)?;
                        if runner.status() == RunnerStatus::InProgress {
                            print_question(runner);
                        }
                    }
                    "prev" | "p" => {
                        runner.handle_event(QuizEvent::PreviousQuestion)?;
                        print_question(runner);
                    }
                    "mark" | "m" => {
                        runner.handle_event(QuizEvent::ToggleBookmark)?;
                        let index = runner.state().current_question_index;
                        if runner.state().bookmarked_questions.contains(&index) {
                            println!("Bookmarked.");
                        } else {
                            println!("Bookmark removed.");
                        }
                    }
                    "save" => {
                        runner.handle_event(QuizEvent::SaveProgress)?;
                        println!("Progress saved; `continue` picks it up later.");
                    }
                    "time" => println!("Time left: {}", format_time(runner.time_remaining())),
                    "menu" => {
                        ticker.abort();
                        return Ok(false);
                    }
                    _ => {
                        let mut chars = line.chars();
                        match (chars.next(), chars.next()) {
                            (Some(letter), None) => match runner.option_for_letter(letter) {
                                Some(answer) => {
                                    runner.handle_event(QuizEvent::SelectAnswer(answer))?;
                                    println!("Selected {}.", letter);
                                }
                                None => println!("No option `{}` here.", letter),
                            },
                            _ if !line.is_empty() => {
                                println!("Unknown command `{}`, try `help`.", line)
                            }
                            _ => {}
                        }
                    }
                }
            }
        }
    }
    // The countdown stops for good once the session finished, whichever
    // path ended it.
    ticker.abort();
    Ok(true)
}

/// Results menu for a finished session. Returns the retest runner when the
/// user asks for one.
async fn results_loop(
    app: &AppState,
    runner: &QuizRunner,
    rx: &mut mpsc::Receiver<InputEvent>,
) -> AppResult<Option<QuizRunner>> {
    loop {
        println!("Results: `retest` | `export-incorrect <path>` | `menu`");
        let Some(line) = next_line(rx).await else {
            return Ok(None);
        };
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("retest") => match runner.retest_incorrect(app.config.quiz_duration_secs) {
                Some(retest) => return Ok(Some(retest)),
                None => println!("Nothing to retest."),
            },
            Some("export-incorrect") => match parts.next() {
                Some(path) => {
                    let incorrect: Vec<Question> = runner
                        .state()
                        .incorrect_questions()
                        .iter()
                        .map(|q| q.to_question())
                        .collect();
                    if incorrect.is_empty() {
                        println!("No incorrect questions to export.");
                    } else {
                        let bytes = export_questions(&incorrect)?;
                        std::fs::write(path, bytes)?;
                        println!("Exported {} incorrect questions to {}.", incorrect.len(), path);
                    }
                }
                None => println!("Usage: export-incorrect <path>"),
            },
            Some("menu") | None => return Ok(None),
            Some(other) => println!("Unknown command `{}`.", other),
        }
    }
}

fn load_uploaded(source: &FileQuestionSource, path: &str) -> AppResult<Vec<Question>> {
    let bytes = std::fs::read(path)
        .map_err(|err| AppError::StorageError(format!("failed to read {}: {}", path, err)))?;
    source.parse_uploaded(&bytes)
}

fn print_menu_help() {
    println!("Commands:");
    println!("  start <first> <count>   begin a quiz at question <first>");
    println!("  continue                resume the saved quiz");
    println!("  discard                 drop the saved quiz");
    println!("  load <path>             replace the pool from a JSON file");
    println!("  reset                   reload the default question bank");
    println!("  export <path>           write the pool as JSON");
    println!("  stats                   score history");
    println!("  bookmarks / clearmarks  saved bookmarks");
    println!("  quit");
}

fn print_quiz_help() {
    println!("Quiz: <letter> select | check | next | prev | mark | save | time | menu");
}

fn print_question(runner: &QuizRunner) {
    let state = runner.state();
    let Some(question) = state.current_question() else {
        return;
    };
    println!();
    println!(
        "Question {} of {} (#{})  [{}]",
        state.current_question_index + 1,
        state.questions.len(),
        question.question_number,
        format_time(runner.time_remaining()),
    );
    println!("{}", question.question);
    for option in &question.options {
        println!("  {}", option.display());
    }
    if let Some(selected) = state.selected_answers.get(&state.current_question_index) {
        println!("Selected: {}", selected);
    }
}

fn print_verdict(runner: &QuizRunner) {
    let state = runner.state();
    let index = state.current_question_index;
    match state.checked_answers.get(&index) {
        Some(true) => println!("Correct!"),
        Some(false) => {
            if let Some(question) = state.current_question() {
                match grading::correct_answer_option(question) {
                    Some(option) => println!("Incorrect. Correct answer: {}", option.display()),
                    None => println!("Incorrect. (No option matches the answer key.)"),
                }
            }
        }
        None => println!("Select an answer first."),
    }
}

fn print_results(runner: &QuizRunner) {
    let state = runner.state();
    println!();
    println!("Quiz finished in {}.", format_duration(state.elapsed_seconds()));
    println!(
        "Answered {} of {}: {} correct, {} incorrect ({:.0}%).",
        state.answered_count(),
        state.questions.len(),
        state.correct_count(),
        state.incorrect_count(),
        state.score_percentage(),
    );
}

fn print_statistics(app: &AppState) -> AppResult<()> {
    let stats = app.statistics.get()?;
    println!(
        "{} quizzes taken, average score {:.1}%.",
        stats.total_quizzes, stats.average_score
    );
    for entry in &stats.history {
        println!(
            "  {}  {}/{} correct ({:.0}%) in {}",
            entry.date.format("%Y-%m-%d %H:%M"),
            entry.correct_answers,
            entry.total_questions,
            entry.score,
            format_duration(entry.time_taken),
        );
    }
    Ok(())
}

fn print_bookmarks(app: &AppState, pool: &[Question]) -> AppResult<()> {
    let bookmarks = app.bookmarks.get()?;
    if bookmarks.is_empty() {
        println!("No bookmarks yet; use `mark` during a quiz.");
        return Ok(());
    }
    for number in bookmarks {
        match pool.iter().find(|q| q.question_number == number) {
            Some(question) => println!("  #{} {}", number, question.question),
            None => println!("  #{} (not in the current pool)", number),
        }
    }
    Ok(())
}
