mod display;

use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    style::{self, Color, Print},
    terminal,
    ExecutableCommand, QueueableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use anti_aircraft::audio::{self, AudioSettings, AudioSink, BellSink, LogSink, MusicPlaylist};
use anti_aircraft::compute::{self, Command};
use anti_aircraft::config::GameConfig;
use anti_aircraft::entities::{GameEvent, GameState};
use anti_aircraft::ranking::{JsonFileStore, Ranking};

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

#[derive(Parser, Debug)]
#[command(name = "anti_aircraft", about = "Terminal anti-aircraft gunnery")]
struct Args {
    /// JSON file overriding the default tunables.
    #[arg(long)]
    config: Option<PathBuf>,

    /// High-score table location. Defaults to ~/.anti_aircraft_rankings.json.
    #[arg(long)]
    rankings: Option<PathBuf>,

    /// Write logs here. The terminal is the game screen, so nothing is
    /// logged without it.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Fixed RNG seed for reproducible flight paths.
    #[arg(long)]
    seed: Option<u64>,

    /// Ring the terminal bell for explosions and an empty magazine.
    #[arg(long)]
    bell: bool,
}

fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Everything the host keeps besides the simulation itself.
struct Session {
    rng: StdRng,
    clock: Instant,
    config: GameConfig,
    store: JsonFileStore,
    ranking: Ranking,
    audio: AudioSettings,
    sink: Box<dyn AudioSink>,
    music: MusicPlaylist,
    /// `Some` while the player is typing a name for the high-score table.
    name_input: Option<String>,
    placed: Option<usize>,
    /// The final score has been checked against the table this round.
    entry_decided: bool,
}

impl Session {
    fn now_ms(&self) -> u64 {
        self.clock.elapsed().as_millis() as u64
    }

    fn handle_events(&mut self, events: Vec<GameEvent>, state: &GameState) {
        for ev in events {
            match ev {
                GameEvent::Sound(cue) => audio::dispatch(self.sink.as_mut(), &self.audio, cue),
                GameEvent::RoundOver { planes_destroyed } => {
                    tracing::debug!(planes_destroyed, "waiting for bullets in flight");
                }
                GameEvent::PlaneDestroyed { planes_destroyed } => {
                    tracing::debug!(planes_destroyed, frame = state.frame, "kill");
                }
                other => tracing::trace!(?other, "game event"),
            }
        }
    }

    /// Open the name prompt once the last bullet and wreck are gone, so
    /// late kills count towards the score being ranked.
    fn offer_name_entry(&mut self, state: &GameState) {
        if self.entry_decided || !compute::round_settled(state) {
            return;
        }
        self.entry_decided = true;
        if self.ranking.qualifies(state.score.planes_destroyed) {
            self.name_input = Some(String::new());
        }
    }

    fn new_round(&mut self) {
        self.name_input = None;
        self.placed = None;
        self.entry_decided = false;
    }

    fn submit_name(&mut self, score: u32) {
        let Some(name) = self.name_input.take() else {
            return;
        };
        self.placed = self.ranking.insert(&name, score, unix_now());
        if self.placed.is_some() {
            self.ranking.persist(&self.store);
        }
    }
}

// ── Title screen ──────────────────────────────────────────────────────────────

enum TitleResult {
    Start,
    Quit,
}

fn show_title<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    session: &Session,
) -> std::io::Result<TitleResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let mut lines: Vec<(String, Color)> = vec![
        ("✈  ANTI-AIRCRAFT  ✈".into(), Color::Cyan),
        (String::new(), Color::White),
        (
            format!(
                "{} rounds. Every plane you bring down scores one.",
                session.config.ammo.initial
            ),
            Color::White,
        ),
        (
            format!("It takes {} hits to down a plane.", session.config.plane.max_hits),
            Color::White,
        ),
        (String::new(), Color::White),
    ];
    if let Some(best) = session.ranking.best() {
        lines.push((format!("Best Score: {}", best), Color::Yellow));
        lines.push((String::new(), Color::White));
    }
    lines.push(("MOUSE : Aim   CLICK / SPACE : Fire   M : Sound   N : Music".into(), Color::DarkGrey));
    lines.push(("ENTER or click to start   Q : Quit".into(), Color::DarkGrey));

    let top = cy.saturating_sub(lines.len() as u16 / 2);
    for (i, (msg, color)) in lines.iter().enumerate() {
        out.queue(cursor::MoveTo(
            cx.saturating_sub(msg.chars().count() as u16 / 2),
            top + i as u16,
        ))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(msg))?;
    }
    out.queue(style::ResetColor)?;
    out.flush()?;

    // Wait for start or quit
    loop {
        match rx.recv() {
            Ok(Event::Key(KeyEvent { code, modifiers, kind: KeyEventKind::Press, .. })) => match code {
                KeyCode::Enter | KeyCode::Char(' ') => return Ok(TitleResult::Start),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(TitleResult::Quit);
                }
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(TitleResult::Quit);
                }
                _ => {}
            },
            Ok(Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                ..
            })) => return Ok(TitleResult::Start),
            Ok(_) => {}
            Err(_) => return Ok(TitleResult::Quit),
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// What a key press means while the name prompt is open.
fn name_entry_key(session: &mut Session, code: KeyCode, score: u32) {
    let max = session.config.ranking.max_name_len;
    let Some(name) = session.name_input.as_mut() else {
        return;
    };
    match code {
        KeyCode::Char(c) if !c.is_control() && name.chars().count() < max => name.push(c),
        KeyCode::Backspace => {
            name.pop();
        }
        KeyCode::Enter => session.submit_name(score),
        KeyCode::Esc => session.name_input = None,
        _ => {}
    }
}

/// Input is drained once per frame into `Command`s, applied in arrival
/// order, then the simulation is ticked and the frame drawn.
fn game_loop<W: Write>(
    out: &mut W,
    session: &mut Session,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<()> {
    let (cols, rows) = terminal::size()?;
    let now = session.now_ms();
    let mut state = compute::init_state(
        session.config.clone(),
        display::playfield_for(cols, rows),
        now,
        &mut session.rng,
    );
    session.new_round();
    session.music.start(session.sink.as_mut(), &session.audio, now);

    loop {
        let frame_start = Instant::now();
        let mut commands = Vec::new();

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent { code, modifiers, kind: KeyEventKind::Press, .. }) => {
                    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
                        return Ok(());
                    }
                    if session.name_input.is_some() {
                        name_entry_key(session, code, state.score.planes_destroyed);
                        continue;
                    }
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char('m') | KeyCode::Char('M') => session.audio.toggle_effects(),
                        KeyCode::Char('n') | KeyCode::Char('N') => {
                            session.audio.toggle_music();
                            if session.audio.music_muted {
                                session.music.stop(session.sink.as_mut());
                            } else {
                                let now = session.now_ms();
                                session.music.start(session.sink.as_mut(), &session.audio, now);
                            }
                        }
                        KeyCode::Char('+') | KeyCode::Char('=') => {
                            let v = session.audio.volume();
                            session.audio.set_volume(v + 0.1);
                        }
                        KeyCode::Char('-') => {
                            let v = session.audio.volume();
                            session.audio.set_volume(v - 0.1);
                        }
                        KeyCode::Char('r') | KeyCode::Char('R') if state.round.is_over() => {
                            session.new_round();
                            commands.push(Command::Reset);
                        }
                        KeyCode::Char(' ') => {
                            commands.push(Command::FireAt(state.crosshair.target));
                        }
                        _ => {}
                    }
                }
                Event::Mouse(MouseEvent { kind, column, row, .. }) => {
                    let at = display::to_logical(column, row);
                    match kind {
                        MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                            commands.push(Command::AimAt(at));
                        }
                        MouseEventKind::Down(MouseButton::Left) if session.name_input.is_none() => {
                            commands.push(Command::FireAt(at));
                        }
                        _ => {}
                    }
                }
                Event::Resize(cols, rows) => state.playfield = display::playfield_for(cols, rows),
                _ => {}
            }
        }

        let now = session.now_ms();
        for command in commands {
            let events = compute::apply(&mut state, command, now, &mut session.rng);
            session.handle_events(events, &state);
        }
        let events = compute::tick(&mut state, now, &mut session.rng);
        session.handle_events(events, &state);
        session.offer_name_entry(&state);
        session.music.update(session.sink.as_mut(), &session.audio, now);

        let game_over = state.round.is_over().then(|| display::GameOverView {
            ranking: &session.ranking,
            name_input: session.name_input.as_deref(),
            placed: session.placed,
        });
        let hud = display::Hud {
            best: session.ranking.best(),
            effects_muted: session.audio.effects_muted,
            music_muted: session.audio.music_muted,
            game_over,
        };
        display::render(out, &state, now, &hud)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let store = JsonFileStore::new(args.rankings.clone().unwrap_or_else(JsonFileStore::default_path));
    let ranking = Ranking::load_or_empty(&store, &config.ranking);
    tracing::info!(
        rankings = %store.path().display(),
        entries = ranking.entries().len(),
        seed = ?args.seed,
        "starting"
    );

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let sink: Box<dyn AudioSink> = if args.bell {
        Box::new(BellSink::new(stdout()))
    } else {
        Box::new(LogSink)
    };
    let mut session = Session {
        rng,
        clock: Instant::now(),
        config,
        store,
        ranking,
        audio: AudioSettings::default(),
        sink,
        music: MusicPlaylist::default(),
        name_input: None,
        placed: None,
        entry_decided: false,
    };

    let mut out = BufWriter::new(stdout());
    terminal::enable_raw_mode().context("enabling raw mode")?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(EnableMouseCapture)?;

    // Blocking reads live on their own thread; the frame loop only polls.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // game loop gone
            }
        }
    });

    let result = run(&mut out, &mut session, &rx);

    // Restore the terminal even when the loop failed
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    tracing::info!("exiting");
    result.context("terminal I/O failed")
}

fn run<W: Write>(
    out: &mut W,
    session: &mut Session,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<()> {
    if let TitleResult::Start = show_title(out, rx, session)? {
        let result = game_loop(out, session, rx);
        session.music.stop(session.sink.as_mut());
        result?;
    }
    Ok(())
}
