use chrono::Local;
use exam_organizer::{
    ConflictCheck, DEFAULT_UPCOMING_DAYS, Exam, ExamForm, ExamStore, SqliteExamStore, check_slot,
    export_exams, import_exams,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::process;
use tracing_subscriber::EnvFilter;

fn render_exam_table(exams: &[Exam]) -> String {
    let headers = ["id", "course_code", "course_name", "exam_date", "exam_time", "location"];
    let rows: Vec<[String; 6]> = exams
        .iter()
        .map(|exam| {
            [
                exam.id.to_string(),
                exam.course_code.clone(),
                exam.course_name.clone(),
                exam.exam_date.format("%Y-%m-%d").to_string(),
                exam.exam_time.format("%H:%M").to_string(),
                exam.location.clone(),
            ]
        })
        .collect();

    // Widths are measured in characters so multibyte text stays aligned.
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            let cell_width = cell.chars().count();
            if cell_width > widths[idx] {
                widths[idx] = cell_width;
            }
        }
    }

    let mut sep = String::new();
    sep.push('+');
    for width in &widths {
        sep.push_str(&"-".repeat(width + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push('|');
    for (idx, header) in headers.iter().enumerate() {
        out.push(' ');
        out.push_str(header);
        out.push_str(&" ".repeat(widths[idx] - header.len()));
        out.push(' ');
        out.push('|');
    }
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        out.push('|');
        for (idx, cell) in row.iter().enumerate() {
            out.push(' ');
            out.push_str(cell);
            out.push_str(&" ".repeat(widths[idx] - cell.chars().count()));
            out.push(' ');
            out.push('|');
        }
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  list                               Show all exams ordered by date and time\n  upcoming [days]                    Show exams within the next days (default 7)\n  add <code> <name> <date> <time> <location...>\n                                     Add an exam (date YYYY-MM-DD, time HH:MM)\n  update <id> <code> <name> <date> <time> <location...>\n                                     Replace the exam with that id\n  delete <id>                        Delete an exam (no-op if the id is unknown)\n  export <path>                      Export all exams to a CSV file\n  import <path>                      Import exams from a CSV file\n  quit|exit                          Exit"
    );
}

fn print_violations(violations: &[exam_organizer::FieldViolation]) {
    println!("Invalid exam:");
    for violation in violations {
        println!("  - {violation}");
    }
}

fn show_exams<S: ExamStore>(store: &S) {
    match store.list() {
        Ok(exams) => println!("{}", render_exam_table(&exams)),
        Err(err) => println!("Error listing exams: {err}"),
    }
}

fn confirm(prompt: &str, input: &mut impl BufRead) -> bool {
    print!("{prompt} (y/n) ");
    let _ = io::stdout().flush();
    let mut answer = String::new();
    if input.read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn build_form<'a>(mut parts: impl Iterator<Item = &'a str>) -> Option<ExamForm> {
    let course_code = parts.next()?;
    let course_name = parts.next()?;
    let exam_date = parts.next()?;
    let exam_time = parts.next()?;
    let location: Vec<&str> = parts.collect();
    if location.is_empty() {
        return None;
    }
    Some(ExamForm {
        course_code: course_code.to_string(),
        course_name: course_name.to_string(),
        exam_date: exam_date.to_string(),
        exam_time: exam_time.to_string(),
        location: location.join(" "),
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let db_path = env::args()
        .nth(1)
        .or_else(|| env::var("EXAM_DB").ok())
        .unwrap_or_else(|| "exams.db".to_string());
    let store = match SqliteExamStore::open(&db_path) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("Error opening exam store at {db_path}: {err}");
            process::exit(1);
        }
    };

    println!("Exam Organizer (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match input.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let trimmed = line.trim().to_string();
        if trimmed.is_empty() {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "list" | "show" => show_exams(&store),
            "upcoming" => {
                let days = match parts.next() {
                    Some(days_s) => match days_s.parse::<i64>() {
                        Ok(days) if days >= 0 => days,
                        _ => {
                            println!("Invalid day count");
                            continue;
                        }
                    },
                    None => DEFAULT_UPCOMING_DAYS,
                };
                let today = Local::now().date_naive();
                match store.upcoming(today, days) {
                    Ok(exams) => println!("{}", render_exam_table(&exams)),
                    Err(err) => println!("Error listing upcoming exams: {err}"),
                }
            }
            "add" => {
                let Some(form) = build_form(parts) else {
                    println!("Usage: add <code> <name> <date> <time> <location...>");
                    continue;
                };
                let today = Local::now().date_naive();
                let exam = match form.build(today) {
                    Ok(exam) => exam,
                    Err(violations) => {
                        print_violations(&violations);
                        continue;
                    }
                };
                match check_slot(&store, &exam) {
                    Ok(ConflictCheck::Collision(existing)) => {
                        println!(
                            "Time slot conflict with {} ({}) at {} on {} {} (id {}).",
                            existing.course_code,
                            existing.course_name,
                            existing.location,
                            existing.exam_date,
                            existing.exam_time.format("%H:%M"),
                            existing.id
                        );
                        if !confirm("Add anyway?", &mut input) {
                            println!("Exam not added.");
                            continue;
                        }
                    }
                    Ok(ConflictCheck::Clear) => {}
                    Err(err) => {
                        println!("Error checking for conflicts: {err}");
                        continue;
                    }
                }
                match store.add(&exam) {
                    Ok(id) => {
                        println!("Exam added with id {id}.");
                        show_exams(&store);
                    }
                    Err(err) => println!("Error adding exam: {err}"),
                }
            }
            "update" => {
                let id = match parts.next().map(str::parse::<i64>) {
                    Some(Ok(id)) => id,
                    _ => {
                        println!("Usage: update <id> <code> <name> <date> <time> <location...>");
                        continue;
                    }
                };
                let Some(form) = build_form(parts) else {
                    println!("Usage: update <id> <code> <name> <date> <time> <location...>");
                    continue;
                };
                let today = Local::now().date_naive();
                // Updates bypass conflict checking; documented limitation.
                match form.build(today) {
                    Ok(exam) => match store.update(&exam.with_id(id)) {
                        Ok(()) => {
                            println!("Exam {id} updated.");
                            show_exams(&store);
                        }
                        Err(err) => println!("Error updating exam: {err}"),
                    },
                    Err(violations) => print_violations(&violations),
                }
            }
            "delete" => match parts.next().map(str::parse::<i64>) {
                Some(Ok(id)) => match store.delete(id) {
                    Ok(()) => {
                        println!("Exam {id} deleted.");
                        show_exams(&store);
                    }
                    Err(err) => println!("Error deleting exam: {err}"),
                },
                _ => println!("Usage: delete <id>"),
            },
            "export" => match parts.next() {
                Some(path) => match export_exams(&store, path) {
                    Ok(()) => println!("Exams exported to {path}."),
                    Err(err) => println!("Error exporting exams: {err}"),
                },
                None => println!("Usage: export <path>"),
            },
            "import" => match parts.next() {
                Some(path) => {
                    let today = Local::now().date_naive();
                    match import_exams(&store, path, today) {
                        Ok(count) => {
                            println!("Imported {count} exam(s) from {path}.");
                            show_exams(&store);
                        }
                        Err(err) => println!("Error importing exams: {err}"),
                    }
                }
                None => println!("Usage: import <path>"),
            },
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
