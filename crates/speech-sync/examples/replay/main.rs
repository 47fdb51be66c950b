mod device;
mod renderer;
mod script;

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use device::SimulatedDevice;
use ratatui::DefaultTerminal;
use script::Script;
use speech_sync::{FRAME_INTERVAL, SyncConfig, SyncEngine, SyncEvent};
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

const LOG_CAPACITY: usize = 12;

#[derive(clap::Parser)]
#[command(name = "replay", about = "Replay a streamed response with synced speech")]
struct Args {
    #[arg(short, long, default_value_t = Script::Weather)]
    script: Script,

    /// Reveal pace; overrides SPEECH_SYNC_WORDS_PER_SECOND.
    #[arg(short, long)]
    words_per_second: Option<f64>,

    /// Words per utterance; overrides SPEECH_SYNC_SPEECH_CHUNK_SIZE.
    #[arg(short, long)]
    chunk_size: Option<usize>,

    /// How fast the simulated device speaks, in words per second.
    #[arg(long, default_value_t = 3.0)]
    speech_rate: f64,

    #[arg(long, default_value_t = 350)]
    first_fragment_ms: u64,

    #[arg(long, default_value_t = 60)]
    fragment_ms: u64,

    /// Run without the terminal UI and log events instead.
    #[arg(long)]
    headless: bool,
}

struct App {
    engine: SyncEngine<SimulatedDevice>,
    events: UnboundedReceiver<SyncEvent>,
    log: VecDeque<String>,
    fragments: Vec<String>,
    next_fragment: usize,
    next_fragment_at: Instant,
    first_fragment_delay: Duration,
    fragment_interval: Duration,
    streaming: bool,
    paused: bool,
    script_name: String,
}

impl App {
    fn new(args: &Args) -> speech_sync::Result<Self> {
        let mut config = SyncConfig::from_env()?;
        if let Some(wps) = args.words_per_second {
            config = config.with_words_per_second(wps);
        }
        if let Some(size) = args.chunk_size {
            config = config.with_speech_chunk_size(size);
        }

        let (tx, events) = unbounded_channel();
        let engine =
            SyncEngine::new(config, SimulatedDevice::new(args.speech_rate))?.with_observer(tx);

        let mut app = Self {
            engine,
            events,
            log: VecDeque::with_capacity(LOG_CAPACITY),
            fragments: args.script.fragments(),
            next_fragment: 0,
            next_fragment_at: Instant::now(),
            first_fragment_delay: Duration::from_millis(args.first_fragment_ms),
            fragment_interval: Duration::from_millis(args.fragment_ms),
            streaming: false,
            paused: false,
            script_name: args.script.to_string(),
        };
        app.begin();
        Ok(app)
    }

    /// Start (or restart) the response from its first fragment.
    fn begin(&mut self) {
        self.engine.reset();
        self.engine.initialize("");
        self.engine.start_latency_timer();
        self.next_fragment = 0;
        self.next_fragment_at = Instant::now() + self.first_fragment_delay;
        self.streaming = true;
        self.paused = false;
        self.log.clear();
    }

    fn step(&mut self, now: Instant) {
        if self.streaming && !self.paused && now >= self.next_fragment_at {
            match self.fragments.get(self.next_fragment) {
                Some(fragment) => {
                    self.engine.push_fragment(fragment);
                    self.next_fragment += 1;
                    self.next_fragment_at = now + self.fragment_interval;
                }
                None => {
                    self.engine.finish_stream();
                    self.engine.start();
                    self.streaming = false;
                }
            }
        }

        let events = self.engine.device_mut().poll(now);
        for event in events {
            self.engine.handle_device_event(event);
        }
        self.engine.tick_at(now);

        while let Ok(event) = self.events.try_recv() {
            self.record(event);
        }
    }

    fn record(&mut self, event: SyncEvent) {
        let line = match &event {
            SyncEvent::WordAdvanced { index, word } => format!("word {index} {word}"),
            SyncEvent::Complete => "complete".to_string(),
            SyncEvent::LatencyCaptured { ttft_ms } => format!("ttft {ttft_ms:.0}ms"),
            SyncEvent::BargeIn => "barge-in".to_string(),
        };
        tracing::info!(event = %line, "sync_event");

        if self.log.len() == LOG_CAPACITY {
            self.log.pop_front();
        }
        self.log.push_back(line);
    }

    fn toggle_pause(&mut self) {
        if self.paused {
            self.engine.resume();
            self.engine.start();
            self.paused = false;
        } else {
            self.engine.pause();
            self.paused = true;
        }
    }

    fn barge_in(&mut self) {
        self.engine.barge_in();
        self.streaming = false;
    }

    fn is_done(&self) -> bool {
        !self.streaming
            && !self.engine.is_playing()
            && self
                .engine
                .queue_state()
                .chunks
                .iter()
                .all(|c| c.status.is_terminal())
    }
}

fn main() {
    use clap::Parser;
    let args = Args::parse();

    let app = match App::new(&args) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if args.headless {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info,speech_sync=debug".into()),
            )
            .init();
        let app = run_headless(app);
        print_summary(&app);
        return;
    }

    let mut terminal = ratatui::init();
    let result = run(&mut terminal, app);
    ratatui::restore();

    match result {
        Ok(app) => print_summary(&app),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn print_summary(app: &App) {
    let frame = app.engine.frame();
    let ttft = frame
        .latency
        .ttft_ms
        .map(|ms| format!("{ms:.0}ms"))
        .unwrap_or_else(|| "n/a".to_string());
    println!(
        "Done. {} words, {} chunks, ttft {} ({} script).",
        frame.sync.words.len(),
        frame.queue.chunks.len(),
        ttft,
        app.script_name,
    );
}

fn run_headless(mut app: App) -> App {
    loop {
        app.step(Instant::now());
        if app.is_done() {
            break;
        }
        std::thread::sleep(FRAME_INTERVAL);
    }
    app
}

fn run(terminal: &mut DefaultTerminal, mut app: App) -> std::io::Result<App> {
    loop {
        terminal.draw(|frame| renderer::render(frame, &app))?;

        if event::poll(FRAME_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char(' ') => app.toggle_pause(),
                    KeyCode::Char('b') => app.barge_in(),
                    KeyCode::Char('r') => app.begin(),
                    _ => {}
                }
            }
        }

        app.step(Instant::now());
    }

    Ok(app)
}
