use clap::Parser;
use cratepush::{
    Direction, InputError, LevelDirectory, Listener, MoveOutcome, PathRequest, Session,
    SessionConfig,
};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

/// Prints the win banner; everything else goes through the log.
struct Console;

impl Listener for Console {
    fn win_game(&mut self) {
        println!("*** level solved ***");
    }

    fn resume_game(&mut self) {
        println!("--- level restarted ---");
    }
}

#[derive(Parser)]
#[command(name = "cratepush")]
#[command(about = "Play a crate-pushing level from the terminal", long_about = None)]
struct Args {
    /// Directory holding Level<N>.txt files
    #[arg(value_name = "DIR")]
    levels_dir: PathBuf,

    /// Level number to load (1-indexed)
    #[arg(value_name = "LEVEL")]
    level: usize,

    /// Inputs to play: U/D/L/R move, z undo, y redo, r reset, n next level
    #[arg(short, long, default_value = "")]
    moves: String,

    /// Walk to cell (X, Y) after the moves, as a mouse click would
    #[arg(long, num_args = 2, value_names = ["X", "Y"])]
    goto: Option<Vec<i32>>,

    /// Milliseconds between two steps of a click-path
    #[arg(long, default_value = "100")]
    step_interval_ms: u64,

    /// Simulated frame time in milliseconds while walking a click-path
    #[arg(long, default_value = "16")]
    tick_ms: u64,

    /// Load the next level as soon as the current one is solved
    #[arg(short, long)]
    advance: bool,

    /// Print the grid after every input
    #[arg(short, long)]
    print_steps: bool,
}

fn describe(outcome: &MoveOutcome) -> String {
    match outcome {
        MoveOutcome::Blocked => "blocked".to_string(),
        MoveOutcome::Moved(_) => "moved".to_string(),
        MoveOutcome::Pushed {
            deadlock: Some(rule),
            ..
        } => format!("pushed, {}", rule),
        MoveOutcome::Pushed { deadlock: None, .. } => "pushed".to_string(),
        MoveOutcome::Solved(_) => "pushed, solved".to_string(),
    }
}

/// One character of the `--moves` string.
#[derive(Debug, Clone, Copy)]
enum Input {
    Move(Direction),
    Undo,
    Redo,
    Reset,
    Next,
}

impl Input {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'U' => Some(Input::Move(Direction::Up)),
            'D' => Some(Input::Move(Direction::Down)),
            'L' => Some(Input::Move(Direction::Left)),
            'R' => Some(Input::Move(Direction::Right)),
            'z' => Some(Input::Undo),
            'y' => Some(Input::Redo),
            'r' => Some(Input::Reset),
            'n' => Some(Input::Next),
            _ => None,
        }
    }
}

fn play(session: &mut Session<LevelDirectory, Console>, input: Input) -> Result<String, InputError> {
    match input {
        Input::Move(direction) => {
            let outcome = session.attempt_move(direction)?;
            Ok(format!("{}: {}", direction, describe(&outcome)))
        }
        Input::Undo => session.undo().map(|_| "undo".to_string()),
        Input::Redo => session.redo().map(|_| "redo".to_string()),
        Input::Reset => session.reset().map(|_| "reset".to_string()),
        Input::Next => session.next_level().map(|_| "next level".to_string()),
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if args.level == 0 {
        eprintln!("Error: level numbers must be at least 1");
        process::exit(1);
    }
    let mut inputs = Vec::new();
    for c in args.moves.chars().filter(|c| !c.is_whitespace()) {
        match Input::from_char(c) {
            Some(input) => inputs.push((c, input)),
            None => {
                eprintln!("Error: unknown input '{}' in moves", c);
                process::exit(1);
            }
        }
    }

    let config = SessionConfig {
        step_interval: Duration::from_millis(args.step_interval_ms),
    };
    let mut session = Session::new(config, LevelDirectory::new(&args.levels_dir), Console);
    if let Err(e) = session.load_level(args.level) {
        eprintln!("Error loading level: {}", e);
        if let Some(source) = std::error::Error::source(&e) {
            eprintln!("  caused by: {}", source);
        }
        process::exit(1);
    }

    for (c, input) in inputs {
        match play(&mut session, input) {
            Ok(report) => println!("{}", report),
            Err(e) => println!("{}: rejected, {}", c, e),
        }
        if args.advance && session.is_solved() {
            match session.next_level() {
                Ok(()) => println!("advanced to level {}", session.level_number().unwrap_or(0)),
                Err(e) => println!("cannot advance, {}", e),
            }
        }
        if args.print_steps {
            if let Some(grid) = session.grid() {
                print!("{}", grid);
            }
        }
    }

    if let Some(ref cell) = args.goto {
        let (x, y) = (cell[0] as f32, cell[1] as f32);
        match session.attempt_move_to(x, y) {
            Ok(PathRequest::Walking { steps }) => {
                println!("walking {} steps to ({}, {})", steps, cell[0], cell[1]);
                let frame = Duration::from_millis(args.tick_ms.max(1));
                while session.is_walking() {
                    if session.tick(frame).is_some() && args.print_steps {
                        if let Some(grid) = session.grid() {
                            print!("{}", grid);
                        }
                    }
                }
            }
            Ok(request) => println!("goto ({}, {}): {:?}", cell[0], cell[1], request),
            Err(e) => println!("goto ({}, {}): rejected, {}", cell[0], cell[1], e),
        }
    }

    if let Some(grid) = session.grid() {
        print!("{}", grid);
    }
    let moves = session.history().map_or(0, |history| history.undo_len());
    println!(
        "level: {:<3}  solved: {}  moves: {}",
        session.level_number().unwrap_or(args.level),
        if session.is_solved() { 'Y' } else { 'N' },
        moves
    );
}
