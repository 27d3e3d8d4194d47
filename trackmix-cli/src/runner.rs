use std::{
    thread::sleep,
    time::{Duration, Instant},
};

use clap::ArgMatches;
use log::{error, info};
use rodio::OutputStream;
use trackmix_lib::{
    sink_pool, AudioError, AudioService, AudioSetting, MixMode, MixerFactory, PlayMode, Sample,
};

pub fn run(args: &ArgMatches) -> Result<i32, AudioError> {
    info!("Starting Trackmix CLI");

    let inputs: Vec<String> = args
        .get_many::<String>("INPUT")
        .unwrap()
        .cloned()
        .collect();
    let mode = match args.get_one::<String>("mode").unwrap().as_str() {
        "additive" => PlayMode::Additive,
        "single" => PlayMode::Single,
        other => {
            error!("unknown play mode: {}", other);
            return Ok(-1);
        }
    };
    let mix = match args.get_one::<String>("mix").map(|value| value.as_str()) {
        None => None,
        Some("transition") => Some(MixMode::Transition),
        Some("fade-in") => Some(MixMode::FadeIn),
        Some("fade-out") => Some(MixMode::FadeOut),
        Some(other) => {
            error!("unknown mix mode: {}", other);
            return Ok(-1);
        }
    };
    let volume = args
        .get_one::<String>("volume")
        .unwrap()
        .parse::<f32>()
        .unwrap();
    let gap = args
        .get_one::<String>("gap")
        .unwrap()
        .parse::<f32>()
        .unwrap();
    let tick_ms = args
        .get_one::<String>("tick-ms")
        .unwrap()
        .parse::<u64>()
        .unwrap();
    let track = args
        .get_one::<String>("track")
        .unwrap()
        .parse::<u32>()
        .unwrap();
    let loop_last = args.get_flag("loop-last");

    let factory = match args.get_one::<String>("curves") {
        Some(path) => MixerFactory::from_json_file(path)?,
        None => MixerFactory::default(),
    };

    // Decode everything up front so scheduling never stalls on IO.
    let mut samples = Vec::new();
    for input in &inputs {
        samples.push(Sample::load(input)?);
    }

    let (_stream, handle) =
        OutputStream::try_default().map_err(|e| AudioError::Acquire(e.to_string()))?;
    let mut service = AudioService::new(sink_pool(handle), factory);

    let interval = Duration::from_millis(tick_ms);
    let mut last = Instant::now();
    let mut clock = 0.0_f32;
    let mut next_at = 0.0_f32;
    let mut next_index = 0;

    loop {
        sleep(interval);
        let now = Instant::now();
        let delta = now.duration_since(last).as_secs_f32();
        last = now;
        clock += delta;

        while next_index < samples.len() && clock >= next_at {
            let looping = loop_last && next_index == samples.len() - 1;
            let setting = AudioSetting::new(samples[next_index].clone(), looping);
            match mix {
                Some(mix_mode) => service.play_mixed(track, &setting, mode, mix_mode)?,
                None => service.play(track, &setting, mode)?,
            }
            service.set_volume(volume, Some(track));
            info!("scheduled {}", inputs[next_index]);
            next_index += 1;
            next_at += gap;
        }

        service.tick(delta);

        if next_index >= samples.len() && service.is_idle() {
            break;
        }
    }

    info!(
        "playback finished ({} instances created)",
        service.total_instances()
    );
    Ok(0)
}
