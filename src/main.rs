// Copyright (c) 2026 rezky_nightky

mod charset;
mod column;
mod config;
mod controls;
mod error;
mod gradient;
mod grid;
mod logging;
mod palette;
mod runtime;
mod sequence;
mod settings;
mod terminal;

use std::env;
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyEventKind};
use tracing::{info, warn};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::config::{
    build_settings, color_enabled_stdout, color_mode_label, default_params_usage_for_help,
    detect_color_mode_auto, duration_secs, print_list_charsets, print_list_colors, Args,
};
use crate::controls::Outcome;
use crate::error::Result;
use crate::grid::Grid;
use crate::settings::Settings;
use crate::terminal::{restore_terminal_best_effort, Terminal};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

fn build_info() -> &'static str {
    env!("GLYPHFALL_BUILD")
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn parse_args() -> Args {
    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }
    cmd.build();

    let matches = cmd.get_matches_from(env::args_os());
    Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

fn install_signal_handlers() {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }
}

fn main() {
    install_signal_handlers();
    let args = parse_args();

    if let Err(e) = run(&args) {
        restore_terminal_best_effort();
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

/// Prints informational output for the `--list-*`/`--info` style flags.
/// Returns true when one was handled and the program should exit.
fn handle_info_flags(args: &Args) -> bool {
    if args.list_charsets {
        print_list_charsets();
        return true;
    }

    if args.list_colors {
        print_list_colors();
        return true;
    }

    if args.check_bitcolor {
        let colorterm = env::var("COLORTERM").unwrap_or_default();
        let term = env::var("TERM").unwrap_or_default();
        let auto = detect_color_mode_auto();

        println!("BITCOLOR CHECK:");
        println!(
            "  COLORTERM: {}",
            if colorterm.is_empty() {
                "(unset)"
            } else {
                &colorterm
            }
        );
        println!(
            "  TERM: {}",
            if term.is_empty() { "(unset)" } else { &term }
        );
        println!("  auto_detected: {}", color_mode_label(auto));
        if let Some(forced) = args.colormode {
            println!("  forced: {}", color_mode_label(forced));
        }
        println!(
            "  effective: {}",
            color_mode_label(args.colormode.unwrap_or(auto))
        );
        return true;
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return true;
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        return true;
    }

    false
}

fn run(args: &Args) -> Result<()> {
    if handle_info_flags(args) {
        return Ok(());
    }

    logging::init(args.log_file.as_deref())?;
    let duration_s = duration_secs(args)?;
    let mut settings = build_settings(args)?;

    if let Some(path) = &args.save_config {
        settings.save(path)?;
        println!("saved settings to {}", path.display());
        return Ok(());
    }

    let grid = match args.seed {
        Some(seed) => Grid::with_seed(seed),
        None => Grid::new(),
    };
    animate(&mut settings, grid, args.config.clone(), duration_s)
}

fn animate(
    settings: &mut Settings,
    mut grid: Grid,
    save_path: Option<PathBuf>,
    duration_s: Option<f64>,
) -> Result<()> {
    let bindings = settings.controls.resolve()?;
    let mut term = Terminal::new()?;

    if settings.rain.auto_size {
        let (w, h) = term.size()?;
        settings.rain.columns = w.max(1);
        settings.rain.rows = h.max(1);
    }
    info!(
        rows = settings.rain.rows,
        columns = settings.rain.columns,
        "rain started"
    );

    let start_time = Instant::now();
    let end_time = duration_s.map(|s| start_time + Duration::from_secs_f64(s));

    let mut raining = true;
    let mut paused = false;
    let mut next_frame = Instant::now();
    let mut last_layout: Option<(u16, u16)> = None;

    while raining {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            break;
        }

        loop {
            while Terminal::poll_event(Duration::from_millis(0))? {
                match Terminal::read_event()? {
                    Event::Resize(nw, nh) => {
                        if settings.rain.auto_size {
                            settings.rain.columns = nw.max(1);
                            settings.rain.rows = nh.max(1);
                        }
                    }
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        let Some(action) = bindings.action_for(&k) else {
                            continue;
                        };
                        info!(?action, "key action");
                        match action.apply(&mut settings.rain) {
                            Outcome::Updated => {}
                            Outcome::TogglePause => paused = !paused,
                            Outcome::Reset => grid.clear(),
                            Outcome::Quit => raining = false,
                            Outcome::Save => match &save_path {
                                Some(path) => {
                                    if let Err(e) = settings.save(path) {
                                        warn!(error = %e, "saving settings failed");
                                    }
                                }
                                None => warn!("no --config path to save settings to"),
                            },
                        }
                    }
                    _ => {}
                }
            }

            if !raining {
                break;
            }

            let now = Instant::now();
            if now >= next_frame {
                break;
            }

            let mut timeout = next_frame - now;
            if let Some(end) = end_time {
                if now >= end {
                    break;
                }
                timeout = timeout.min(end - now);
            }
            let _ = Terminal::poll_event(timeout)?;
        }

        if !raining {
            break;
        }

        let config = &settings.rain;
        if !paused {
            grid.advance(config);
        }
        let layout = (config.rows, config.columns);
        let relayout = last_layout != Some(layout);
        last_layout = Some(layout);
        let rows = grid.render(config);
        term.draw_rows(&rows, relayout)?;

        next_frame += Duration::from_secs_f64(config.frame_interval);
        let now = Instant::now();
        if now > next_frame {
            next_frame = now;
        }
    }

    let stats = grid.stats();
    let cache = grid.gradient_stats();
    info!(
        frames = stats.frame,
        live = stats.live,
        gradient_hits = cache.hits,
        gradient_misses = cache.misses,
        gradient_evictions = cache.evictions,
        elapsed_s = start_time.elapsed().as_secs_f64(),
        "rain stopped"
    );
    Ok(())
}
