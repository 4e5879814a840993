//! Storyteller: an AI story writing TUI.
//!
//! Pick a genre, setting, tone and character emotion, type an opening line,
//! and let the model write the rest. Stories can be continued, narrated to
//! MP3 and exported as PDF or DOCX.
//!
//! # Headless Mode
//!
//! Run with `--headless` for a text-based interface suitable for scripting:
//!
//! ```bash
//! printf '#genre fantasy\n#setting cafe\n#mood dark\n#emotion sad\n#generate It rained.\n' \
//!     | cargo run -p storyteller -- --headless
//! ```

mod app;
mod events;
mod headless;
mod logging;
mod ui;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use std::time::Duration;
use story_core::{AppConfig, ConfigError, StorySession};
use tracing::info;

use app::App;
use events::{handle_event, EventResult};
use ui::render::render;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(ConfigError::MissingApiKey) => {
            eprintln!("Error: API_KEY environment variable not set.");
            eprintln!("Please set it in .env file or with: export API_KEY=your_key_here");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let headless = args.iter().any(|a| a == "--headless");
    let _log_guard = logging::init(&config, headless);
    info!(model = %config.model, export_dir = %config.export_dir.display(), headless, "starting storyteller");

    let session = StorySession::from_config(&config);

    if headless {
        return headless::run_headless(session).await.map_err(|e| e.into());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, App::new(session)).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| render(f, &app))?;

        if event::poll(Duration::from_millis(100))? {
            let ev = event::read()?;

            match handle_event(&mut app, ev) {
                EventResult::Quit => return Ok(()),
                EventResult::RunTask(task) => {
                    // Show the busy status before blocking on the task
                    app.begin_task(task);
                    terminal.draw(|f| render(f, &app))?;
                    app.run_task(task).await;
                }
                EventResult::NeedsRedraw | EventResult::Continue => {}
            }
        }
    }
}

fn print_help() {
    println!("Storyteller - AI story writing");
    println!();
    println!("USAGE:");
    println!("  storyteller [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help       Show this help message");
    println!("  --headless       Run in headless mode (line commands on stdin)");
    println!();
    println!("ENVIRONMENT:");
    println!("  API_KEY              OpenRouter API key (required)");
    println!("  OPENROUTER_MODEL     Model name (default: mistralai/mixtral-8x7b-instruct)");
    println!("  OPENROUTER_API_URL   Chat completions endpoint");
    println!("  OPENROUTER_REFERER   HTTP-Referer header (default: localhost)");
    println!("  STORY_EXPORT_DIR     Where PDF/DOCX/MP3 files go (default: exports)");
    println!("  STORY_TTS_LANG       Narration language (default: en)");
    println!("  RUST_LOG             Log filter");
    println!();
    println!("EXAMPLES:");
    println!("  storyteller                  # Interactive TUI mode");
    println!("  storyteller --headless       # Headless mode");
}
