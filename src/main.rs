use clap::{Parser, ValueEnum};
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use room_vacancy::error::Error;
use room_vacancy::occupancy::index::OccupancyIndex;
use room_vacancy::occupancy::ingest::{Ingestor, LenientDay, StrictDay};
use room_vacancy::occupancy::report::{
    Moment, NowReport, VacancyReport, room_grid, room_schedule, slot_table, write_export,
};
use room_vacancy::page::JsonPageSource;
use room_vacancy::time::{ClockTime, Day, parse_slot};
use rustyline::{Context, Editor, Helper, Highlighter, Hinter, Validator};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, ValueEnum)]
enum RowKeyKind {
    /// Day column must read exactly Mo, Tu, We, Th or Fr
    Strict,
    /// Day column may use any casing, short or full day names
    Lenient,
}

#[derive(Parser)]
struct Args {
    /// Path to the JSON dump of extracted timetable pages
    #[arg(short, long, value_name = "FILE", default_value = "data/timetable.json")]
    source: PathBuf,

    /// How table rows are matched to weekdays
    #[arg(long, value_enum, default_value_t = RowKeyKind::Strict)]
    row_key: RowKeyKind,

    /// Write the occupancy snapshot to FILE after parsing
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,

    /// Print the vacancy report for DAY and SLOT, then exit
    #[arg(short, long, num_args = 2, value_names = ["DAY", "SLOT"])]
    query: Option<Vec<String>>,

    /// Print the vacancy report for the current time, then exit
    #[arg(long, conflicts_with = "query")]
    now: bool,

    /// Log skipped pages and rows
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Helper, Hinter, Highlighter, Validator)]
pub struct CompleteHelper {
    pub commands: Vec<String>,
}

impl Completer for CompleteHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, _pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let mut candidates = Vec::new();

        for cmd in &self.commands {
            if cmd.starts_with(line) {
                candidates.push(Pair {
                    display: cmd.clone(),
                    replacement: format!("{} ", cmd),
                });
            }
        }

        Ok((0, candidates))
    }
}

fn enable_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn ingestor(row_key: RowKeyKind) -> Ingestor {
    match row_key {
        RowKeyKind::Strict => Ingestor::new().with_row_key(StrictDay),
        RowKeyKind::Lenient => Ingestor::new().with_row_key(LenientDay),
    }
}

fn load(ingestor: &Ingestor, source: &Path) -> Result<OccupancyIndex, Error> {
    let ingestion = ingestor.rebuild(&JsonPageSource::new(source))?;
    println!("Parsed {}", ingestion.stats);
    println!("Rooms found: {}", ingestion.index.all_rooms().len());
    Ok(ingestion.index)
}

fn paginate(content: String) {
    let pager = Command::new("less")
        .arg("-R")
        .stdin(Stdio::piped())
        .spawn()
        // Fallback to 'more' if 'less' isn't available
        .or_else(|_| Command::new("more").stdin(Stdio::piped()).spawn());

    let Ok(mut pager) = pager else {
        println!("{}", content);
        return;
    };

    if let Some(mut stdin) = pager.stdin.take() {
        if let Err(e) = stdin.write_all(content.as_bytes()) {
            // Broken pipe is common if the user quits the pager early
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                eprintln!("Error writing to pager: {}", e);
            }
        }
    }

    let _ = pager.wait();
}

fn show(content: String) {
    if content.lines().count() > 40 {
        paginate(content);
    } else {
        println!("{}", content);
    }
}

fn report_at(index: &OccupancyIndex, day: &str, when: &str) -> Result<String, Error> {
    let day = day.parse::<Day>()?;
    if when.contains(':') {
        let time = when
            .parse::<ClockTime>()
            .map_err(|_| Error::InvalidTime(when.to_string()))?;
        let moment = Moment::resolve(Some(day), time);
        return NowReport::build(index, &moment).map(|r| r.to_string());
    }
    let slot = parse_slot(when)?;
    VacancyReport::build(index, day, slot).map(|r| r.to_string())
}

fn print_error(e: &Error) {
    println!("{}", e.to_string().red());
    if e.is_invalid_argument() {
        println!("Days are Mo, Tu, We, Th, Fr; slots are 1-8 (see 'slots').");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    enable_tracing(args.verbose);

    let ingestor = ingestor(args.row_key);
    let mut index = load(&ingestor, &args.source)?;

    if let Some(path) = &args.export {
        write_export(&index, path)?;
        println!("Exported to {}", path.display());
    }

    if let Some(query) = &args.query {
        match report_at(&index, &query[0], &query[1]) {
            Ok(report) => println!("{}", report),
            Err(e) => print_error(&e),
        }
        return Ok(());
    }
    if args.now {
        println!("{}", NowReport::build(&index, &Moment::now())?);
        return Ok(());
    }

    let config = rustyline::Config::builder()
        .history_ignore_space(true)
        .completion_type(rustyline::CompletionType::List)
        .build();

    let helper = CompleteHelper {
        commands: vec![
            "now".to_string(),
            "at".to_string(),
            "room".to_string(),
            "rooms".to_string(),
            "slots".to_string(),
            "reload".to_string(),
            "export".to_string(),
            "help".to_string(),
            "exit".to_string(),
        ],
    };

    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(helper));

    loop {
        let readline = rl.readline(">> ");
        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() { continue; }

                rl.add_history_entry(trimmed)?;

                let parts: Vec<&str> = trimmed.split_whitespace().collect();
                match parts[0] {
                    "now" => match NowReport::build(&index, &Moment::now()) {
                        Ok(report) => show(report.to_string()),
                        Err(e) => print_error(&e),
                    },
                    "at" => {
                        if let (Some(day), Some(when)) = (parts.get(1), parts.get(2)) {
                            match report_at(&index, day, when) {
                                Ok(report) => show(report),
                                Err(e) => print_error(&e),
                            }
                        } else {
                            println!("Usage: at <day> <slot | HH:MM>");
                        }
                    },
                    "room" => {
                        if let Some(code) = parts.get(1) {
                            match room_schedule(&index, code) {
                                Some(view) => show(format!("Schedule for room {}\n{}", code, view)),
                                None => {
                                    println!("{}", format!("Room '{}' not found.", code).red());
                                    let sample: Vec<_> = index.all_rooms().iter().take(20).map(|r| r.to_string()).collect();
                                    println!("Known rooms include: {}", sample.join(", "));
                                }
                            }
                        } else {
                            println!("Usage: room <code>");
                        }
                    },
                    "rooms" => {
                        let rooms: Vec<_> = index.all_rooms().iter().cloned().collect();
                        show(format!("All rooms ({} total)\n{}", rooms.len(), room_grid(&rooms)));
                    },
                    "slots" => println!("{}", slot_table()),
                    "reload" => match load(&ingestor, &args.source) {
                        Ok(fresh) => {
                            index = fresh;
                            println!("Reload complete.");
                        },
                        Err(e) => println!("{} Keeping the previous data.", e.to_string().red()),
                    },
                    "export" => {
                        if let Some(path) = parts.get(1) {
                            match write_export(&index, Path::new(path)) {
                                Ok(()) => println!("Exported to {}", path),
                                Err(e) => println!("{}", e.to_string().red()),
                            }
                        } else {
                            println!("Usage: export <file>");
                        }
                    },
                    "help" | "?" => {
                        println!("\nAvailable Commands:");
                        println!("  now                    - Vacant rooms right now");
                        println!("  at <day> <slot|HH:MM>  - Vacant rooms on <day> (Mo..Fr) in a slot (1-8) or at a clock time");
                        println!("  room <code>            - Weekly schedule of one room, e.g. room S-606");
                        println!("  rooms                  - List every known room");
                        println!("  slots                  - Show the time slot table");
                        println!("  reload                 - Parse the timetable source again");
                        println!("  export <file>          - Write the occupancy data as JSON");
                        println!("  help / ?               - Show this help menu");
                        println!("  exit / quit            - Leave\n");
                    },
                    "exit" | "quit" => break,
                    _ => println!("Unknown command: {}", parts[0]),
                }
            },
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            },
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            },
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}
