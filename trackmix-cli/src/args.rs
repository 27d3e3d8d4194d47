//! CLI argument definitions for `trackmix-cli`.

use clap::{Arg, ArgAction, Command};

/// Build the CLI argument parser and command definitions.
pub fn build_cli() -> Command {
    // Build the CLI definition in one place to keep main.rs slim.
    Command::new("Trackmix")
        .version("1.0")
        .about("Play audio files on a mixed track")
        .arg_required_else_help(true)
        .arg(
            Arg::new("mode")
                .long("mode")
                .short('m')
                .value_name("MODE")
                .default_value("single")
                .help("Play mode for each scheduled file: single or additive"),
        )
        .arg(
            Arg::new("mix")
                .long("mix")
                .short('x')
                .value_name("MIX")
                .help("Crossfade between files: transition, fade-in or fade-out"),
        )
        .arg(
            Arg::new("volume")
                .long("volume")
                .short('v')
                .value_name("VOLUME")
                .default_value("1.0")
                .help("Track output volume (0.0-1.0)"),
        )
        .arg(
            Arg::new("gap")
                .long("gap")
                .short('g')
                .value_name("SECONDS")
                .default_value("2.0")
                .help("Seconds between scheduled play requests"),
        )
        .arg(
            Arg::new("curves")
                .long("curves")
                .short('c')
                .value_name("PATH")
                .help("Path to a JSON file with the fade curves and transition delay"),
        )
        .arg(
            Arg::new("tick-ms")
                .long("tick-ms")
                .value_name("MS")
                .default_value("16")
                .help("Interval between engine ticks in milliseconds"),
        )
        .arg(
            Arg::new("track")
                .long("track")
                .short('t')
                .value_name("ID")
                .default_value("0")
                .help("Track id the files are scheduled on"),
        )
        .arg(
            Arg::new("loop-last")
                .long("loop-last")
                .action(ArgAction::SetTrue)
                .help("Loop the last scheduled file until interrupted"),
        )
        .arg(
            Arg::new("INPUT")
                .help("The audio files to schedule, in order")
                .required(true)
                .action(ArgAction::Append)
                .index(1),
        )
}
