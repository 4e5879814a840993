//! Headless mode for the story writer.
//!
//! A simple line-oriented interface for scripting and automated testing.
//! Lines starting with `#` are commands; any other line is used as the
//! opening line and generates a story. Output lines are tagged so scripts
//! can pick out what they need.

use std::io::{self, BufRead, Write};

use story_core::{
    Artifact, Emotion, ExportFormat, Genre, LengthTier, Mood, Notice, SessionError, Setting,
    StorySession,
};

/// One parsed headless command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Genre(Genre),
    Setting(Setting),
    Mood(Mood),
    Emotion(Emotion),
    Character(String),
    Length(LengthTier),
    Generate(String),
    Continue,
    Reset,
    History,
    Select(usize),
    Export(ExportFormat),
    Show,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let Some(rest) = line.strip_prefix('#') else {
        return Ok(Some(Command::Generate(line.to_string())));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let require = |what: &str| required(name, arg, what);

    let command = match name.to_lowercase().as_str() {
        "genre" => Command::Genre(require("genre")?.parse().map_err(|e| format!("{e}"))?),
        "setting" => Command::Setting(require("setting")?.parse().map_err(|e| format!("{e}"))?),
        "mood" | "tone" => Command::Mood(require("tone")?.parse().map_err(|e| format!("{e}"))?),
        "emotion" => Command::Emotion(require("emotion")?.parse().map_err(|e| format!("{e}"))?),
        "character" => Command::Character(arg.to_string()),
        "length" => Command::Length(
            require("short|medium|long")?
                .parse()
                .map_err(|e| format!("{e}"))?,
        ),
        "generate" => Command::Generate(require("opening line")?.to_string()),
        "continue" => Command::Continue,
        "reset" => Command::Reset,
        "history" => Command::History,
        "select" => {
            let label = require("n")?;
            Command::Select(
                label
                    .parse()
                    .map_err(|_| format!("'{label}' is not a history number"))?,
            )
        }
        "pdf" => Command::Export(ExportFormat::Pdf),
        "docx" => Command::Export(ExportFormat::Docx),
        "speak" => Command::Export(ExportFormat::Mp3),
        "show" | "status" => Command::Show,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => return Err("Unknown command. Type #help for help.".to_string()),
    };
    Ok(Some(command))
}

fn required<'a>(name: &str, arg: &'a str, what: &str) -> Result<&'a str, String> {
    if arg.is_empty() {
        Err(format!("Usage: #{name} <{what}>"))
    } else {
        Ok(arg)
    }
}

/// Run the story writer in headless mode on stdin/stdout.
pub async fn run_headless(mut session: StorySession) -> io::Result<()> {
    let mut stdout = io::stdout();

    writeln!(stdout, "=== Storyteller Headless Mode ===")?;
    writeln!(stdout, "Exports go to {}", session.export_dir().display())?;
    writeln!(stdout)?;
    print_help(&mut stdout)?;
    writeln!(stdout)?;

    let stdin = io::stdin();
    run_script(&mut session, stdin.lock(), &mut stdout).await
}

/// Execute commands from `input` until EOF or `#quit`.
pub async fn run_script<R: BufRead, W: Write>(
    session: &mut StorySession,
    input: R,
    out: &mut W,
) -> io::Result<()> {
    for line in input.lines() {
        let line = line?;

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                writeln!(out, "[ERROR] {message}")?;
                continue;
            }
        };

        if command == Command::Quit {
            writeln!(out, "Goodbye!")?;
            break;
        }

        execute(session, command, out).await?;
        out.flush()?;
    }

    Ok(())
}

async fn execute<W: Write>(
    session: &mut StorySession,
    command: Command,
    out: &mut W,
) -> io::Result<()> {
    match command {
        Command::Genre(genre) => {
            session.form_mut().genre = Some(genre);
            writeln!(out, "[STATUS] genre = {genre}")?;
        }
        Command::Setting(setting) => {
            session.form_mut().setting = Some(setting);
            writeln!(out, "[STATUS] setting = {setting}")?;
        }
        Command::Mood(mood) => {
            session.form_mut().mood = Some(mood);
            writeln!(out, "[STATUS] tone = {mood}")?;
        }
        Command::Emotion(emotion) => {
            session.form_mut().emotion = Some(emotion);
            writeln!(out, "[STATUS] emotion = {emotion}")?;
        }
        Command::Character(name) => {
            writeln!(out, "[STATUS] character = {}", display_or(&name, "(any)"))?;
            session.form_mut().character = name;
        }
        Command::Length(length) => {
            session.form_mut().length = length;
            writeln!(out, "[STATUS] length = {length}")?;
        }
        Command::Generate(opening_line) => {
            session.form_mut().opening_line = opening_line;
            let result = session.generate().await;
            report(session, result, out)?;
        }
        Command::Continue => {
            let result = session.continue_story().await;
            report(session, result, out)?;
        }
        Command::Reset => {
            if session.start_over() {
                let label = session.history().len();
                writeln!(out, "[STATUS] Story saved to history as #{label}")?;
            } else {
                writeln!(out, "[STATUS] Started over")?;
            }
        }
        Command::History => {
            writeln!(out, "[HISTORY]")?;
            let items = session.history().display_items();
            if items.is_empty() {
                writeln!(out, "  No stories yet.")?;
            }
            for item in items {
                writeln!(out, "  {}", item.caption())?;
            }
        }
        Command::Select(label) => {
            let result = session.select_history(label);
            report(session, result, out)?;
        }
        Command::Export(format) => match session.export(format).await {
            Ok(artifact) => print_saved(&artifact, out)?,
            Err(e) => writeln!(out, "[ERROR] {e}")?,
        },
        Command::Show => {
            let form = session.form();
            writeln!(out, "[STATUS]")?;
            writeln!(out, "  Phase: {:?}", session.phase())?;
            writeln!(out, "  Genre: {}", display_choice(form.genre))?;
            writeln!(out, "  Setting: {}", display_choice(form.setting))?;
            writeln!(out, "  Tone: {}", display_choice(form.mood))?;
            writeln!(out, "  Emotion: {}", display_choice(form.emotion))?;
            writeln!(out, "  Character: {}", display_or(&form.character, "(any)"))?;
            writeln!(out, "  Length: {}", form.length)?;
            writeln!(out, "  History: {} stories", session.history().len())?;
            print_story(session, out)?;
        }
        Command::Help => {
            writeln!(out, "[HELP]")?;
            print_help(out)?;
        }
        Command::Quit => {}
    }
    Ok(())
}

/// Print queued notices, then the story or the error.
fn report<W: Write>(
    session: &mut StorySession,
    result: Result<(), SessionError>,
    out: &mut W,
) -> io::Result<()> {
    for notice in session.drain_notices() {
        print_notice(&notice, out)?;
    }
    match result {
        Ok(()) => print_story(session, out),
        Err(e) => writeln!(out, "[ERROR] {e}"),
    }
}

fn print_notice<W: Write>(notice: &Notice, out: &mut W) -> io::Result<()> {
    if notice.is_error() {
        writeln!(out, "[ERROR] {}", notice.message)
    } else {
        writeln!(out, "[STATUS] {}", notice.message)
    }
}

fn print_story<W: Write>(session: &StorySession, out: &mut W) -> io::Result<()> {
    let story = session.story();
    if story.is_empty() {
        return Ok(());
    }
    writeln!(out, "[TITLE] {}", story.title)?;
    writeln!(out, "[STORY]")?;
    for paragraph in story.paragraphs() {
        writeln!(out, "{paragraph}")?;
        writeln!(out)?;
    }
    Ok(())
}

fn print_saved<W: Write>(artifact: &Artifact, out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "[SAVED] {} ({}, {} bytes)",
        artifact.path.display(),
        artifact.mime_type(),
        artifact.size
    )
}

fn display_choice<C: story_core::Choice>(current: Option<C>) -> &'static str {
    C::display(current)
}

fn display_or<'a>(text: &'a str, fallback: &'a str) -> &'a str {
    if text.trim().is_empty() {
        fallback
    } else {
        text
    }
}

fn print_help<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Commands:")?;
    writeln!(out, "  #genre <genre>        - Fantasy, Sci-Fi, Romance, Mystery, Comedy, Horror")?;
    writeln!(out, "  #setting <setting>    - Bookstore, Town, Village, Party, Forest, Cafe,")?;
    writeln!(out, "                          Castle, Space Station, Island, Unknown")?;
    writeln!(out, "  #mood <tone>          - Light, Whimsical, Mysterious, Dramatic, Dark")?;
    writeln!(out, "  #emotion <emotion>    - Neutral, Happy, Nervous, Confident, Sad, Angry,")?;
    writeln!(out, "                          Excited, Scared")?;
    writeln!(out, "  #character <name>     - Main character (optional)")?;
    writeln!(out, "  #length <length>      - short, medium, long")?;
    writeln!(out, "  #generate <line>      - Generate a story from an opening line")?;
    writeln!(out, "  #continue             - Add a paragraph")?;
    writeln!(out, "  #reset                - Save to history and start over")?;
    writeln!(out, "  #history              - List saved stories")?;
    writeln!(out, "  #select <n>           - Load story n from history")?;
    writeln!(out, "  #pdf / #docx / #speak - Export the story")?;
    writeln!(out, "  #show                 - Show the form and story")?;
    writeln!(out, "  #quit                 - Exit")?;
    writeln!(out, "  (any other line is used as the opening line)")?;
    Ok(())
}
